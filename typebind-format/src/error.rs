//! Errors raised while reading or writing token streams.

use core::fmt;

use crate::TokenKind;

/// The stream held a well-formed token of the wrong kind.
///
/// Produced when an adapter asks for one kind of token (say, the start of
/// an array) and the stream holds another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// What the caller was prepared to accept.
    pub expected: String,
    /// What the stream held.
    pub found: TokenKind,
    /// Where in the document.
    pub path: String,
}

impl SyntaxError {
    /// Create a new syntax error.
    pub fn new(expected: impl Into<String>, found: TokenKind, path: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            found,
            path: path.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {} but was {} at path {}",
            self.expected, self.found, self.path
        )
    }
}

impl core::error::Error for SyntaxError {}

/// Anything that can go wrong at the token level.
#[derive(Debug)]
pub enum StreamError {
    /// A token of the wrong kind.
    Syntax(SyntaxError),
    /// Input that is not valid for the wire format at all.
    Malformed {
        /// What was wrong.
        message: String,
        /// Byte offset into the input.
        offset: usize,
        /// Where in the document.
        path: String,
    },
    /// A writer call that does not fit the current nesting state.
    Nesting {
        /// What was wrong.
        message: String,
    },
    /// A number that the wire format cannot represent, such as NaN.
    InvalidNumber {
        /// The rejected literal.
        literal: String,
    },
    /// The underlying sink failed.
    Io(std::io::Error),
}

impl StreamError {
    /// Build a [`StreamError::Syntax`].
    pub fn syntax(expected: impl Into<String>, found: TokenKind, path: impl Into<String>) -> Self {
        StreamError::Syntax(SyntaxError::new(expected, found, path))
    }

    /// Build a [`StreamError::Nesting`].
    pub fn nesting(message: impl Into<String>) -> Self {
        StreamError::Nesting {
            message: message.into(),
        }
    }

    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            StreamError::Syntax(_) => "stream::syntax",
            StreamError::Malformed { .. } => "stream::malformed",
            StreamError::Nesting { .. } => "stream::nesting",
            StreamError::InvalidNumber { .. } => "stream::invalid_number",
            StreamError::Io(_) => "stream::io",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Syntax(e) => fmt::Display::fmt(e, f),
            StreamError::Malformed {
                message,
                offset,
                path,
            } => write!(f, "{message} at offset {offset} path {path}"),
            StreamError::Nesting { message } => f.write_str(message),
            StreamError::InvalidNumber { literal } => {
                write!(f, "numeric values must be finite JSON numbers, but was {literal}")
            }
            StreamError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl core::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            StreamError::Syntax(e) => Some(e),
            StreamError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyntaxError> for StreamError {
    fn from(e: SyntaxError) -> Self {
        StreamError::Syntax(e)
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        StreamError::Io(e)
    }
}
