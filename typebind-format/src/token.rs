use core::fmt;

/// The kind of the next token in a stream.
///
/// Mirrors the structural vocabulary of JSON: scalars, container
/// delimiters, member names, and the end of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `null`
    Null,
    /// `true` or `false`
    Boolean,
    /// A numeric literal.
    Number,
    /// A string value.
    String,
    /// An object member name.
    Name,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// No more tokens.
    EndDocument,
}

impl TokenKind {
    /// The upper-case wire name used in error messages, e.g. `BEGIN_ARRAY`.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Null => "NULL",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Name => "NAME",
            TokenKind::BeginArray => "BEGIN_ARRAY",
            TokenKind::EndArray => "END_ARRAY",
            TokenKind::BeginObject => "BEGIN_OBJECT",
            TokenKind::EndObject => "END_OBJECT",
            TokenKind::EndDocument => "END_DOCUMENT",
        }
    }

    /// Whether a value can start with this token.
    pub const fn starts_value(self) -> bool {
        matches!(
            self,
            TokenKind::Null
                | TokenKind::Boolean
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::BeginArray
                | TokenKind::BeginObject
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
