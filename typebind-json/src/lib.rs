#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! JSON wire format for typebind.
//!
//! [`JsonReader`] turns a UTF-8 document into a [`typebind_format::TokenReader`]
//! and [`JsonWriter`] renders a [`typebind_format::TokenWriter`] call sequence
//! as JSON text, compact or pretty-printed.

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::trace;

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __json_trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use __json_trace as trace;

mod scanner;
pub use scanner::{ScanError, ScanErrorKind, Scanner, Span, SpannedToken, Token};

mod reader;
pub use reader::{DEFAULT_MAX_DEPTH, JsonReader};

mod writer;
pub use writer::JsonWriter;
