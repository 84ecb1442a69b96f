//! Errors raised while capturing and manipulating reflected types.

use core::fmt;

/// A type could not be captured as a [`crate::TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// A generic type used without its type arguments.
    MissingTypeArgument {
        /// The generic type.
        raw: &'static str,
    },
    /// A type variable that was never bound, typically because the
    /// descriptor was built inside generic code.
    UnresolvedVariable {
        /// Name of the variable.
        name: &'static str,
    },
    /// Wrong number of type arguments.
    ArityMismatch {
        /// The generic type.
        raw: &'static str,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },
    /// A wildcard used anywhere but as a type argument.
    WildcardOutsideArgument,
}

impl CaptureError {
    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::MissingTypeArgument { .. } => "capture::missing_type_argument",
            CaptureError::UnresolvedVariable { .. } => "capture::unresolved_variable",
            CaptureError::ArityMismatch { .. } => "capture::arity_mismatch",
            CaptureError::WildcardOutsideArgument => "capture::wildcard_outside_argument",
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::MissingTypeArgument { raw } => {
                write!(f, "type `{raw}` is generic but no type arguments were given")
            }
            CaptureError::UnresolvedVariable { name } => write!(
                f,
                "type variable `{name}` is unresolved; capture the type where it is fully known"
            ),
            CaptureError::ArityMismatch {
                raw,
                expected,
                found,
            } => write!(
                f,
                "type `{raw}` takes {expected} type argument(s) but {found} were given"
            ),
            CaptureError::WildcardOutsideArgument => {
                f.write_str("wildcards are only allowed as type arguments")
            }
        }
    }
}

impl core::error::Error for CaptureError {}

/// A reflected value was not of the type an operation required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The required type.
    pub expected: &'static str,
    /// The type that was supplied.
    pub found: &'static str,
}

impl TypeMismatch {
    /// Create a new mismatch.
    pub const fn new(expected: &'static str, found: &'static str) -> Self {
        Self { expected, found }
    }

    /// A mismatch where `T` was required.
    pub fn expected<T: ?Sized>(found: &'static str) -> Self {
        Self::new(core::any::type_name::<T>(), found)
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a value of type `{}`, found `{}`", self.expected, self.found)
    }
}

impl core::error::Error for TypeMismatch {}

/// A map entry could not be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The member name does not parse as the map's key type.
    Key {
        /// The member name.
        key: String,
        /// The key type.
        expected: &'static str,
    },
    /// The value has the wrong type.
    Value(TypeMismatch),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryError::Key { key, expected } => {
                write!(f, "map key {key:?} is not a valid `{expected}`")
            }
            EntryError::Value(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl core::error::Error for EntryError {}

impl From<TypeMismatch> for EntryError {
    fn from(e: TypeMismatch) -> Self {
        EntryError::Value(e)
    }
}
