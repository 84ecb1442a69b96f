use crate::{StreamError, TokenKind};

/// Pull-based access to a stream of tokens.
///
/// Consuming methods check the kind of the next token and fail with
/// [`StreamError::Syntax`] when it does not match. Object members are
/// read as a [`TokenKind::Name`] followed by the member's value.
pub trait TokenReader {
    /// Kind of the next token, without consuming it.
    fn peek(&mut self) -> Result<TokenKind, StreamError>;

    /// Consume `[`.
    fn begin_array(&mut self) -> Result<(), StreamError>;

    /// Consume `]`.
    fn end_array(&mut self) -> Result<(), StreamError>;

    /// Consume `{`.
    fn begin_object(&mut self) -> Result<(), StreamError>;

    /// Consume `}`.
    fn end_object(&mut self) -> Result<(), StreamError>;

    /// Consume a member name.
    fn next_name(&mut self) -> Result<String, StreamError>;

    /// Consume a string, or the literal text of a number.
    fn next_string(&mut self) -> Result<String, StreamError>;

    /// Consume `true` or `false`.
    fn next_bool(&mut self) -> Result<bool, StreamError>;

    /// Consume `null`.
    fn next_null(&mut self) -> Result<(), StreamError>;

    /// Skip the next value, including everything nested in it.
    fn skip_value(&mut self) -> Result<(), StreamError>;

    /// Current location, e.g. `$.a[2]`.
    fn path(&self) -> String;

    /// Whether the current array or object has more elements.
    fn has_next(&mut self) -> Result<bool, StreamError> {
        let kind = self.peek()?;
        Ok(!matches!(
            kind,
            TokenKind::EndArray | TokenKind::EndObject | TokenKind::EndDocument
        ))
    }

    /// Consume `null` if it is next. Returns whether it did.
    fn consume_null(&mut self) -> Result<bool, StreamError> {
        if self.peek()? == TokenKind::Null {
            self.next_null()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// A syntax error at the current position.
    fn unexpected(&mut self, expected: &str) -> StreamError {
        match self.peek() {
            Ok(found) => StreamError::syntax(expected, found, self.path()),
            Err(e) => e,
        }
    }
}
