use core::fmt;

use typebind_core::{CaptureError, EntryError, InstantiationError, TypeDescriptor, TypeMismatch};
use typebind_format::{StreamError, SyntaxError};

/// Shorthand for results with [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// No factory in the chain accepted a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedType {
    /// The type that was requested.
    pub descriptor: TypeDescriptor,
}

impl fmt::Display for UnsupportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no adapter factory supports type `{}`", self.descriptor)?;
        if let Some(rust_name) = self.descriptor.rust_name() {
            write!(f, " ({rust_name})")?;
        }
        Ok(())
    }
}

impl core::error::Error for UnsupportedType {}

/// Everything that can go wrong while converting.
///
/// None of these are retried: malformed input and misconfiguration are
/// both permanent.
#[derive(Debug)]
pub enum Error {
    /// A token of the wrong kind for the current position.
    Syntax(SyntaxError),
    /// No registered factory handles a type.
    Unsupported(UnsupportedType),
    /// A type descriptor could not be captured.
    InvalidCapture(CaptureError),
    /// A type could not be instantiated.
    Instantiation(InstantiationError),
    /// The token stream failed for a reason other than a misplaced token.
    Stream(StreamError),
    /// A scalar's text did not convert to the requested type.
    Conversion {
        /// The text that was read.
        text: String,
        /// The requested type.
        target: &'static str,
        /// Where in the document.
        path: String,
    },
    /// An adapter was handed a value of the wrong type.
    TypeMismatch(TypeMismatch),
    /// A map entry was rejected.
    Entry(EntryError),
    /// An adapter for a recursive type was used before the resolution
    /// that created it completed.
    Unbound {
        /// The recursive type.
        descriptor: TypeDescriptor,
    },
    /// A per-call lookup outlived the registry it was bound to.
    RegistryDropped,
}

impl Error {
    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Syntax(_) => "typebind::syntax",
            Error::Unsupported(_) => "typebind::unsupported",
            Error::InvalidCapture(_) => "typebind::invalid_capture",
            Error::Instantiation(_) => "typebind::instantiation",
            Error::Stream(_) => "typebind::stream",
            Error::Conversion { .. } => "typebind::conversion",
            Error::TypeMismatch(_) => "typebind::type_mismatch",
            Error::Entry(_) => "typebind::entry",
            Error::Unbound { .. } => "typebind::unbound",
            Error::RegistryDropped => "typebind::registry_dropped",
        }
    }

    pub(crate) fn conversion(text: impl Into<String>, target: &'static str, path: String) -> Self {
        Error::Conversion {
            text: text.into(),
            target,
            path,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(e) => fmt::Display::fmt(e, f),
            Error::Unsupported(e) => fmt::Display::fmt(e, f),
            Error::InvalidCapture(e) => fmt::Display::fmt(e, f),
            Error::Instantiation(e) => fmt::Display::fmt(e, f),
            Error::Stream(e) => fmt::Display::fmt(e, f),
            Error::Conversion { text, target, path } => {
                write!(f, "cannot convert {text:?} to {target} at path {path}")
            }
            Error::TypeMismatch(e) => fmt::Display::fmt(e, f),
            Error::Entry(e) => fmt::Display::fmt(e, f),
            Error::Unbound { descriptor } => write!(
                f,
                "adapter for `{descriptor}` was used before its cyclic dependency was resolved"
            ),
            Error::RegistryDropped => f.write_str("the adapter registry has been dropped"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Syntax(e) => Some(e),
            Error::Unsupported(e) => Some(e),
            Error::InvalidCapture(e) => Some(e),
            Error::Instantiation(e) => Some(e),
            Error::Stream(e) => Some(e),
            Error::TypeMismatch(e) => Some(e),
            Error::Entry(e) => Some(e),
            Error::Conversion { .. } | Error::Unbound { .. } | Error::RegistryDropped => None,
        }
    }
}

impl From<StreamError> for Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Syntax(e) => Error::Syntax(e),
            other => Error::Stream(other),
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Error::Syntax(e)
    }
}

impl From<UnsupportedType> for Error {
    fn from(e: UnsupportedType) -> Self {
        Error::Unsupported(e)
    }
}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Error::InvalidCapture(e)
    }
}

impl From<InstantiationError> for Error {
    fn from(e: InstantiationError) -> Self {
        Error::Instantiation(e)
    }
}

impl From<TypeMismatch> for Error {
    fn from(e: TypeMismatch) -> Self {
        Error::TypeMismatch(e)
    }
}

impl From<EntryError> for Error {
    fn from(e: EntryError) -> Self {
        Error::Entry(e)
    }
}
