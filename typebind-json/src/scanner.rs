//! Low-level JSON scanner that finds token boundaries in a complete buffer.
//!
//! String content comes back as indices plus a `has_escapes` flag so that
//! member names and string values without escapes can be copied straight
//! out of the input. Number tokens are validated against the JSON grammar
//! but left as text.

use core::fmt;

use typebind_format::is_json_number;

/// A byte range in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a new span.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

/// Token kinds with minimal data. Strings and numbers are indices into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `{`
    ObjectStart,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `null`
    Null,
    /// `true`
    True,
    /// `false`
    False,
    /// A string literal; indices exclude the quotes.
    String {
        /// Start of the content.
        start: usize,
        /// End of the content.
        end: usize,
        /// Whether the content needs unescaping.
        has_escapes: bool,
    },
    /// A number literal.
    Number {
        /// Start of the literal.
        start: usize,
        /// End of the literal.
        end: usize,
    },
    /// End of input.
    Eof,
}

/// A token and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Source span.
    pub span: Span,
}

/// Scanner error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// What went wrong.
    pub kind: ScanErrorKind,
    /// Where.
    pub span: Span,
}

/// Kinds of scanner errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// A byte that cannot start or continue a token.
    UnexpectedChar(char),
    /// Input ended inside a token.
    UnexpectedEof(&'static str),
    /// A number literal that breaks the JSON grammar.
    InvalidNumber,
    /// A bad `\` escape.
    InvalidEscape,
    /// A control character inside a string.
    ControlCharacter,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            ScanErrorKind::UnexpectedEof(context) => write!(f, "unexpected end of input {context}"),
            ScanErrorKind::InvalidNumber => f.write_str("invalid number literal"),
            ScanErrorKind::InvalidEscape => f.write_str("invalid escape sequence"),
            ScanErrorKind::ControlCharacter => f.write_str("unescaped control character in string"),
        }
    }
}

/// Result type for scanner operations.
pub type ScanResult = Result<SpannedToken, ScanError>;

/// JSON scanner over a complete buffer.
#[derive(Debug, Default)]
pub struct Scanner {
    pos: usize,
}

impl Scanner {
    /// Create a new scanner starting at position 0.
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    /// Current position in the buffer.
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Scan the next token.
    pub fn next_token(&mut self, buf: &[u8]) -> ScanResult {
        self.skip_whitespace(buf);

        let start = self.pos;
        let Some(&byte) = buf.get(start) else {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: Span::new(start, 0),
            });
        };

        let single = |token| {
            Ok(SpannedToken {
                token,
                span: Span::new(start, 1),
            })
        };

        match byte {
            b'{' => {
                self.pos += 1;
                single(Token::ObjectStart)
            }
            b'}' => {
                self.pos += 1;
                single(Token::ObjectEnd)
            }
            b'[' => {
                self.pos += 1;
                single(Token::ArrayStart)
            }
            b']' => {
                self.pos += 1;
                single(Token::ArrayEnd)
            }
            b':' => {
                self.pos += 1;
                single(Token::Colon)
            }
            b',' => {
                self.pos += 1;
                single(Token::Comma)
            }
            b'"' => self.scan_string(buf, start),
            b'-' | b'0'..=b'9' => self.scan_number(buf, start),
            b't' => self.scan_literal(buf, start, b"true", Token::True),
            b'f' => self.scan_literal(buf, start, b"false", Token::False),
            b'n' => self.scan_literal(buf, start, b"null", Token::Null),
            _ => Err(ScanError {
                kind: ScanErrorKind::UnexpectedChar(char_at(buf, start)),
                span: Span::new(start, 1),
            }),
        }
    }

    fn skip_whitespace(&mut self, buf: &[u8]) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = buf.get(self.pos) {
            self.pos += 1;
        }
    }

    fn scan_string(&mut self, buf: &[u8], start: usize) -> ScanResult {
        self.pos += 1;
        let content_start = self.pos;
        let mut has_escapes = false;

        while let Some(&byte) = buf.get(self.pos) {
            match byte {
                b'"' => {
                    let content_end = self.pos;
                    self.pos += 1;
                    return Ok(SpannedToken {
                        token: Token::String {
                            start: content_start,
                            end: content_end,
                            has_escapes,
                        },
                        span: Span::new(start, self.pos - start),
                    });
                }
                b'\\' => {
                    has_escapes = true;
                    // the escaped byte is validated when decoding
                    self.pos += 2;
                }
                0x00..=0x1f => {
                    return Err(ScanError {
                        kind: ScanErrorKind::ControlCharacter,
                        span: Span::new(self.pos, 1),
                    });
                }
                _ => self.pos += 1,
            }
        }

        Err(ScanError {
            kind: ScanErrorKind::UnexpectedEof("in string"),
            span: Span::new(start, buf.len() - start),
        })
    }

    fn scan_number(&mut self, buf: &[u8], start: usize) -> ScanResult {
        let mut pos = start;
        while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = buf.get(pos) {
            pos += 1;
        }
        self.pos = pos;

        let valid = core::str::from_utf8(&buf[start..pos]).is_ok_and(is_json_number);
        if !valid {
            return Err(ScanError {
                kind: ScanErrorKind::InvalidNumber,
                span: Span::new(start, pos - start),
            });
        }

        Ok(SpannedToken {
            token: Token::Number { start, end: pos },
            span: Span::new(start, pos - start),
        })
    }

    fn scan_literal(
        &mut self,
        buf: &[u8],
        start: usize,
        expected: &'static [u8],
        token: Token,
    ) -> ScanResult {
        for &want in expected {
            match buf.get(self.pos) {
                Some(&b) if b == want => self.pos += 1,
                Some(_) => {
                    return Err(ScanError {
                        kind: ScanErrorKind::UnexpectedChar(char_at(buf, self.pos)),
                        span: Span::new(self.pos, 1),
                    });
                }
                None => {
                    return Err(ScanError {
                        kind: ScanErrorKind::UnexpectedEof("in literal"),
                        span: Span::new(start, self.pos - start),
                    });
                }
            }
        }

        Ok(SpannedToken {
            token,
            span: Span::new(start, expected.len()),
        })
    }
}

fn char_at(buf: &[u8], pos: usize) -> char {
    buf.get(pos..)
        .and_then(|rest| core::str::from_utf8(rest).ok())
        .and_then(|rest| rest.chars().next())
        .or_else(|| buf.get(pos).map(|&b| b as char))
        .unwrap_or('?')
}

/// Decode string content between `start` and `end`, resolving escapes.
///
/// The buffer must hold valid UTF-8.
pub fn decode_string(buf: &[u8], start: usize, end: usize) -> Result<String, ScanError> {
    let slice = &buf[start..end];
    let invalid = |at: usize, len: usize| ScanError {
        kind: ScanErrorKind::InvalidEscape,
        span: Span::new(start + at, len),
    };

    let mut result = String::with_capacity(slice.len());
    let mut i = 0;
    while i < slice.len() {
        let run_end = slice[i..]
            .iter()
            .position(|&b| b == b'\\')
            .map_or(slice.len(), |offset| i + offset);
        if run_end > i {
            let run = core::str::from_utf8(&slice[i..run_end]).map_err(|_| invalid(i, 1))?;
            result.push_str(run);
            i = run_end;
            continue;
        }

        // at a backslash
        let Some(&escaped) = slice.get(i + 1) else {
            return Err(invalid(i, 1));
        };
        match escaped {
            b'"' => result.push('"'),
            b'\\' => result.push('\\'),
            b'/' => result.push('/'),
            b'b' => result.push('\x08'),
            b'f' => result.push('\x0c'),
            b'n' => result.push('\n'),
            b'r' => result.push('\r'),
            b't' => result.push('\t'),
            b'u' => {
                let high = hex4(slice, i + 2).ok_or_else(|| invalid(i, 6))?;
                let code_point = if (0xD800..=0xDBFF).contains(&high) {
                    let low = (slice.get(i + 6) == Some(&b'\\') && slice.get(i + 7) == Some(&b'u'))
                        .then(|| hex4(slice, i + 8))
                        .flatten()
                        .filter(|low| (0xDC00..=0xDFFF).contains(low))
                        .ok_or_else(|| invalid(i, 12))?;
                    i += 6;
                    0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF)
                } else {
                    high
                };
                let c = char::from_u32(code_point).ok_or_else(|| invalid(i, 6))?;
                result.push(c);
                i += 6;
                continue;
            }
            _ => return Err(invalid(i, 2)),
        }
        i += 2;
    }

    Ok(result)
}

fn hex4(slice: &[u8], at: usize) -> Option<u32> {
    let digits = slice.get(at..at + 4)?;
    digits.iter().try_fold(0u32, |acc, &b| {
        let digit = (b as char).to_digit(16)?;
        Some(acc * 16 + digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebind_testhelpers::test;

    fn tokens(input: &str) -> Vec<Token> {
        let mut scanner = Scanner::new();
        let mut out = Vec::new();
        loop {
            let spanned = scanner.next_token(input.as_bytes()).unwrap();
            if spanned.token == Token::Eof {
                return out;
            }
            out.push(spanned.token);
        }
    }

    #[test]
    fn scans_structure() {
        assert_eq!(
            tokens(r#"{"a": [1, true, null]}"#),
            vec![
                Token::ObjectStart,
                Token::String {
                    start: 2,
                    end: 3,
                    has_escapes: false
                },
                Token::Colon,
                Token::ArrayStart,
                Token::Number { start: 7, end: 8 },
                Token::Comma,
                Token::True,
                Token::Comma,
                Token::Null,
                Token::ArrayEnd,
                Token::ObjectEnd,
            ]
        );
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut scanner = Scanner::new();
        let err = scanner.next_token(b"01").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::InvalidNumber);
    }

    #[test]
    fn decodes_escapes_and_surrogates() {
        let input = r#"a\n\"\u00e9\ud83d\ude00"#.as_bytes();
        let decoded = decode_string(input, 0, input.len()).unwrap();
        assert_eq!(decoded, "a\n\"\u{e9}\u{1f600}");
    }

    #[test]
    fn rejects_lone_high_surrogate() {
        let input = br#"\ud83d"#.as_slice();
        assert!(decode_string(input, 0, input.len()).is_err());
    }

    #[test]
    fn unterminated_string() {
        let mut scanner = Scanner::new();
        let err = scanner.next_token(b"\"abc").unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::UnexpectedEof("in string"));
    }
}
