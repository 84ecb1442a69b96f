#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Convert typed Rust values to and from JSON through an open chain of
//! adapter factories.
//!
//! The [`Engine`] resolves a [`TypeDescriptor`] to an adapter by asking
//! each registered [`AdapterFactory`] in turn; the first one that accepts
//! the type wins and the result is cached in the [`AdapterRegistry`].
//! Factories build composite adapters by resolving the adapters of related
//! types (elements, map values, fields) through the [`Resolver`] they are
//! handed, either once when the adapter is created or per call through a
//! [`RegistryHandle`] when only the runtime type of a value says what to
//! do.
//!
//! ```
//! use typebind::{Engine, reflect_struct};
//!
//! #[derive(Debug, PartialEq)]
//! pub struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! reflect_struct!(Point { x: i32, y: i32 });
//!
//! let engine = Engine::new();
//! let json = engine.to_json(&vec![Point { x: 1, y: 2 }]).unwrap();
//! assert_eq!(json, r#"[{"x":1,"y":2}]"#);
//! let back: Vec<Point> = engine.from_json(&json).unwrap();
//! assert_eq!(back, [Point { x: 1, y: 2 }]);
//! ```

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __typebind_trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {__typebind_trace as trace, __typebind_trace as debug};

mod error;
pub use error::{Error, Result, UnsupportedType};

mod adapter;
pub use adapter::{Erased, ErasedAdapter, TypeAdapter, TypedAdapter, erase};

mod factory;
pub use factory::{AdapterFactory, ExactFactory, HierarchyFactory};

mod registry;
pub use registry::{AdapterRegistry, RegistryHandle, Resolver};

mod policy;
pub use policy::{NumberPolicy, ToNumberStrategy, next_number_text};

mod codec;
pub use codec::{ValueAdapter, ValueCodec, ValueCodecFactory};

mod tree;
pub use tree::{TreeReader, TreeWriter};

pub mod builtins;

mod engine;
pub use engine::{Engine, EngineBuilder};

pub use typebind_core::{
    CaptureError, Def, DeferredNumber, ExactDecimal, InstantiationError,
    InstantiationErrorKind, Instantiator, Number, Object, RawType, Reflect, Reflected,
    TypeCategory, TypeDescriptor, TypeMismatch, TypeShape, Value, raw, reflect_struct,
};
pub use typebind_format::{StreamError, SyntaxError, TokenKind, TokenReader, TokenWriter};
pub use typebind_json::{DEFAULT_MAX_DEPTH, JsonReader, JsonWriter};
