#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Runtime type information for typebind.
//!
//! A [`TypeDescriptor`] is a fully reified, possibly generic type that can be
//! used as a lookup key and compared for assignability. Types opt in through
//! [`Reflect`], which also supplies the construction and access operations
//! ([`TypeOps`]) that generic adapters drive. [`DeferredNumber`] keeps
//! numeric text unparsed until a caller asks for a concrete representation,
//! and [`Instantiator`] produces blank instances for decoding.

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __core_trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {__core_trace as trace, __core_trace as debug};

mod typeid;
pub use typeid::ConstTypeId;

pub mod raw;
pub use raw::{RawType, TypeCategory};

mod shape;
pub use shape::TypeShape;

mod descriptor;
pub use descriptor::TypeDescriptor;

mod error;
pub use error::{CaptureError, EntryError, TypeMismatch};

mod reflect;
pub use reflect::{Object, Reflect, Reflected};

mod ops;
pub use ops::{
    Def, FieldDef, ListOps, MapKey, MapOps, OptionOps, PointerOps, StructOps, TypeOps,
};

mod impls;

mod number;
pub use number::{DeferredNumber, ExactDecimal, Number, NumberFormatError};

mod value;
pub use value::Value;

mod instantiate;
pub use instantiate::{InstantiationError, InstantiationErrorKind, Instantiator};

mod macros;

#[doc(hidden)]
pub mod __private {
    pub use core::any::type_name;
    pub use core::default::Default;
    pub use std::vec;
}
