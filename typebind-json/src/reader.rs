use typebind_format::{JsonPath, StreamError, TokenKind, TokenReader};

use crate::scanner::{Scanner, SpannedToken, Token, decode_string};
use crate::trace;

#[derive(Debug, Clone, Copy)]
enum Frame {
    Array(ArrayState),
    Object(ObjectState),
}

#[derive(Debug, Clone, Copy)]
enum ArrayState {
    /// Just after `[`: a value or `]`.
    First,
    /// After `,`: a value.
    Value,
    /// After a value: `,` or `]`.
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy)]
enum ObjectState {
    /// Just after `{`: a name or `}`.
    First,
    /// After `,`: a name.
    Key,
    /// After a name: `:` then a value.
    Colon,
    /// After a value: `,` or `}`.
    CommaOrEnd,
}

/// Nesting depth accepted by [`JsonReader::new`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy)]
struct Peeked {
    kind: TokenKind,
    token: SpannedToken,
}

/// Pull reader over a complete JSON document.
///
/// The reader validates structure as it goes: commas, colons, nesting and
/// the single top-level value are all checked, so adapters only deal with
/// token kinds. Arrays and objects nested deeper than the reader's maximum
/// depth are rejected as malformed input.
pub struct JsonReader<'de> {
    input: &'de [u8],
    scanner: Scanner,
    stack: Vec<Frame>,
    max_depth: usize,
    peeked: Option<Peeked>,
    root_done: bool,
    path: JsonPath,
}

impl<'de> JsonReader<'de> {
    /// Create a reader over `input`.
    pub fn new(input: &'de str) -> Self {
        Self {
            input: input.as_bytes(),
            scanner: Scanner::new(),
            stack: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            peeked: None,
            root_done: false,
            path: JsonPath::new(),
        }
    }

    /// Create a reader over raw bytes, which must be UTF-8.
    pub fn from_slice(input: &'de [u8]) -> Result<Self, StreamError> {
        let text = core::str::from_utf8(input).map_err(|e| StreamError::Malformed {
            message: "invalid UTF-8".into(),
            offset: e.valid_up_to(),
            path: "$".into(),
        })?;
        Ok(Self::new(text))
    }

    /// Accept at most `max_depth` nested arrays and objects.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Byte offset of the scanner.
    pub fn offset(&self) -> usize {
        self.scanner.pos()
    }

    /// Check that nothing but whitespace follows the top-level value.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        let peeked = self.fill()?;
        if peeked.kind == TokenKind::EndDocument {
            Ok(())
        } else {
            Err(self.malformed(
                "JSON document was not fully consumed",
                peeked.token.span.offset,
            ))
        }
    }

    fn malformed(&self, message: impl Into<String>, offset: usize) -> StreamError {
        StreamError::Malformed {
            message: message.into(),
            offset,
            path: self.path.format(),
        }
    }

    fn scan(&mut self) -> Result<SpannedToken, StreamError> {
        self.scanner
            .next_token(self.input)
            .map_err(|e| self.malformed(e.kind.to_string(), e.span.offset))
    }

    fn set_top(&mut self, frame: Frame) {
        if let Some(top) = self.stack.last_mut() {
            *top = frame;
        }
    }

    fn value(&self, token: SpannedToken) -> Result<Peeked, StreamError> {
        let kind = match token.token {
            Token::ObjectStart => TokenKind::BeginObject,
            Token::ArrayStart => TokenKind::BeginArray,
            Token::String { .. } => TokenKind::String,
            Token::Number { .. } => TokenKind::Number,
            Token::True | Token::False => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
            Token::Eof => {
                return Err(self.malformed("unexpected end of input", token.span.offset));
            }
            _ => return Err(self.malformed("expected a value", token.span.offset)),
        };
        Ok(Peeked { kind, token })
    }

    fn name(&self, token: SpannedToken) -> Result<Peeked, StreamError> {
        match token.token {
            Token::String { .. } => Ok(Peeked {
                kind: TokenKind::Name,
                token,
            }),
            _ => Err(self.malformed("expected a member name", token.span.offset)),
        }
    }

    fn fill(&mut self) -> Result<Peeked, StreamError> {
        if let Some(peeked) = self.peeked {
            return Ok(peeked);
        }

        let token = self.scan()?;
        let peeked = match self.stack.last().copied() {
            None if self.root_done => match token.token {
                Token::Eof => Peeked {
                    kind: TokenKind::EndDocument,
                    token,
                },
                _ => {
                    return Err(self.malformed(
                        "JSON document was not fully consumed",
                        token.span.offset,
                    ));
                }
            },
            None => self.value(token)?,
            Some(Frame::Array(state)) => match (state, token.token) {
                (ArrayState::First | ArrayState::CommaOrEnd, Token::ArrayEnd) => Peeked {
                    kind: TokenKind::EndArray,
                    token,
                },
                (ArrayState::CommaOrEnd, Token::Comma) => {
                    self.set_top(Frame::Array(ArrayState::Value));
                    let token = self.scan()?;
                    self.value(token)?
                }
                (ArrayState::CommaOrEnd, _) => {
                    return Err(self.malformed("expected ',' or ']'", token.span.offset));
                }
                (ArrayState::First | ArrayState::Value, _) => self.value(token)?,
            },
            Some(Frame::Object(state)) => match (state, token.token) {
                (ObjectState::First | ObjectState::CommaOrEnd, Token::ObjectEnd) => Peeked {
                    kind: TokenKind::EndObject,
                    token,
                },
                (ObjectState::CommaOrEnd, Token::Comma) => {
                    self.set_top(Frame::Object(ObjectState::Key));
                    let token = self.scan()?;
                    self.name(token)?
                }
                (ObjectState::CommaOrEnd, _) => {
                    return Err(self.malformed("expected ',' or '}'", token.span.offset));
                }
                (ObjectState::First | ObjectState::Key, _) => self.name(token)?,
                (ObjectState::Colon, Token::Colon) => {
                    let token = self.scan()?;
                    self.value(token)?
                }
                (ObjectState::Colon, _) => {
                    return Err(self.malformed("expected ':'", token.span.offset));
                }
            },
        };

        trace!(kind = %peeked.kind, offset = peeked.token.span.offset, "peeked");
        self.peeked = Some(peeked);
        Ok(peeked)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<SpannedToken, StreamError> {
        let peeked = self.fill()?;
        if peeked.kind != kind {
            return Err(StreamError::syntax(
                kind.name(),
                peeked.kind,
                self.path.format(),
            ));
        }
        self.peeked = None;
        Ok(peeked.token)
    }

    fn enter(&mut self, kind: TokenKind, frame: Frame) -> Result<(), StreamError> {
        let token = self.expect(kind)?;
        if self.stack.len() >= self.max_depth {
            return Err(self.malformed(
                format!("nesting exceeds the maximum depth of {}", self.max_depth),
                token.span.offset,
            ));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn text(&self, token: SpannedToken) -> Result<String, StreamError> {
        match token.token {
            Token::String {
                start,
                end,
                has_escapes: true,
            } => decode_string(self.input, start, end)
                .map_err(|e| self.malformed(e.kind.to_string(), e.span.offset)),
            Token::String { start, end, .. } | Token::Number { start, end } => {
                core::str::from_utf8(&self.input[start..end])
                    .map(str::to_owned)
                    .map_err(|e| self.malformed("invalid UTF-8", start + e.valid_up_to()))
            }
            _ => Err(self.malformed("expected a string", token.span.offset)),
        }
    }

    fn finish_value(&mut self) {
        match self.stack.last_mut() {
            Some(Frame::Array(state)) => {
                *state = ArrayState::CommaOrEnd;
                self.path.advance();
            }
            Some(Frame::Object(state)) => *state = ObjectState::CommaOrEnd,
            None => self.root_done = true,
        }
    }
}

impl TokenReader for JsonReader<'_> {
    fn peek(&mut self) -> Result<TokenKind, StreamError> {
        Ok(self.fill()?.kind)
    }

    fn begin_array(&mut self) -> Result<(), StreamError> {
        self.enter(TokenKind::BeginArray, Frame::Array(ArrayState::First))?;
        self.path.push_array();
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), StreamError> {
        self.expect(TokenKind::EndArray)?;
        self.stack.pop();
        self.path.pop();
        self.finish_value();
        Ok(())
    }

    fn begin_object(&mut self) -> Result<(), StreamError> {
        self.enter(TokenKind::BeginObject, Frame::Object(ObjectState::First))?;
        self.path.push_object();
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), StreamError> {
        self.expect(TokenKind::EndObject)?;
        self.stack.pop();
        self.path.pop();
        self.finish_value();
        Ok(())
    }

    fn next_name(&mut self) -> Result<String, StreamError> {
        let token = self.expect(TokenKind::Name)?;
        let name = self.text(token)?;
        self.path.set_name(&name);
        self.set_top(Frame::Object(ObjectState::Colon));
        Ok(name)
    }

    fn next_string(&mut self) -> Result<String, StreamError> {
        let peeked = self.fill()?;
        if !matches!(peeked.kind, TokenKind::String | TokenKind::Number) {
            return Err(StreamError::syntax(
                "a string",
                peeked.kind,
                self.path.format(),
            ));
        }
        self.peeked = None;
        let text = self.text(peeked.token)?;
        self.finish_value();
        Ok(text)
    }

    fn next_bool(&mut self) -> Result<bool, StreamError> {
        let token = self.expect(TokenKind::Boolean)?;
        self.finish_value();
        Ok(token.token == Token::True)
    }

    fn next_null(&mut self) -> Result<(), StreamError> {
        self.expect(TokenKind::Null)?;
        self.finish_value();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<(), StreamError> {
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                TokenKind::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                TokenKind::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                TokenKind::EndArray if depth > 0 => {
                    self.end_array()?;
                    depth -= 1;
                }
                TokenKind::EndObject if depth > 0 => {
                    self.end_object()?;
                    depth -= 1;
                }
                TokenKind::Name => {
                    // the member's value follows
                    self.next_name()?;
                    continue;
                }
                TokenKind::String | TokenKind::Number => {
                    self.next_string()?;
                }
                TokenKind::Boolean => {
                    self.next_bool()?;
                }
                TokenKind::Null => self.next_null()?,
                found @ (TokenKind::EndArray | TokenKind::EndObject | TokenKind::EndDocument) => {
                    return Err(StreamError::syntax("a value", found, self.path.format()));
                }
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    fn path(&self) -> String {
        self.path.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebind_testhelpers::test;

    #[test]
    fn reads_nested_document() {
        let mut reader = JsonReader::new(r#"{"a": [1, "two", true, null], "b": {}}"#);
        reader.begin_object().unwrap();
        assert_eq!(reader.next_name().unwrap(), "a");
        reader.begin_array().unwrap();
        assert_eq!(reader.peek().unwrap(), TokenKind::Number);
        assert_eq!(reader.next_string().unwrap(), "1");
        assert_eq!(reader.next_string().unwrap(), "two");
        assert!(reader.next_bool().unwrap());
        assert_eq!(reader.path(), "$.a[3]");
        reader.next_null().unwrap();
        assert!(!reader.has_next().unwrap());
        reader.end_array().unwrap();
        assert_eq!(reader.next_name().unwrap(), "b");
        reader.skip_value().unwrap();
        reader.end_object().unwrap();
        assert_eq!(reader.peek().unwrap(), TokenKind::EndDocument);
        reader.finish().unwrap();
    }

    #[test]
    fn wrong_kind_is_a_syntax_error() {
        let mut reader = JsonReader::new("[1]");
        let err = reader.begin_object().unwrap_err();
        match err {
            StreamError::Syntax(e) => {
                assert_eq!(e.found, TokenKind::BeginArray);
                assert_eq!(e.path, "$");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn trailing_comma_is_malformed() {
        let mut reader = JsonReader::new("[1,]");
        reader.begin_array().unwrap();
        reader.next_string().unwrap();
        assert!(matches!(reader.peek(), Err(StreamError::Malformed { .. })));
    }

    #[test]
    fn trailing_data_is_rejected() {
        let mut reader = JsonReader::new("1 2");
        reader.next_string().unwrap();
        assert!(reader.finish().is_err());
    }

    #[test]
    fn skips_nested_values_in_place() {
        let nested = format!("{}1{}", "[".repeat(100), "]".repeat(100));
        let json = format!(r#"{{"skip": {{"deep": {nested}, "n": null}}, "keep": true}}"#);
        let mut reader = JsonReader::new(&json);
        reader.begin_object().unwrap();
        assert_eq!(reader.next_name().unwrap(), "skip");
        reader.skip_value().unwrap();
        assert_eq!(reader.next_name().unwrap(), "keep");
        assert!(reader.next_bool().unwrap());
        reader.end_object().unwrap();
        reader.finish().unwrap();
    }

    #[test]
    fn nesting_beyond_the_limit_is_malformed() {
        let mut reader = JsonReader::new("[[[1]]]").with_max_depth(2);
        reader.begin_array().unwrap();
        reader.begin_array().unwrap();
        let err = reader.begin_array().unwrap_err();
        insta::assert_snapshot!(err, @"nesting exceeds the maximum depth of 2 at offset 2 path $[0][0]");

        let deep = "[".repeat(50_000);
        let mut reader = JsonReader::new(&deep);
        assert!(matches!(reader.skip_value(), Err(StreamError::Malformed { .. })));
    }

    #[test]
    fn missing_colon() {
        let mut reader = JsonReader::new(r#"{"a" 1}"#);
        reader.begin_object().unwrap();
        reader.next_name().unwrap();
        assert!(matches!(reader.peek(), Err(StreamError::Malformed { .. })));
    }
}
