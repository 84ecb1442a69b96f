use std::io::Write;

use typebind_format::{StreamError, TokenWriter, is_json_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    DanglingName,
    NonEmptyObject,
}

/// Writes JSON text to an [`std::io::Write`] sink.
///
/// Object members whose value is `null` are dropped unless
/// [`JsonWriter::serialize_nulls`] is enabled. Array elements are always
/// written.
pub struct JsonWriter<W> {
    out: W,
    stack: Vec<Scope>,
    indent: Option<String>,
    serialize_nulls: bool,
    deferred_name: Option<String>,
}

impl<W: Write> JsonWriter<W> {
    /// A compact writer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: vec![Scope::EmptyDocument],
            indent: None,
            serialize_nulls: false,
            deferred_name: None,
        }
    }

    /// Pretty-print with the given indentation per level.
    pub fn pretty(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Keep object members whose value is `null`.
    pub fn serialize_nulls(mut self, yes: bool) -> Self {
        self.serialize_nulls = yes;
        self
    }

    /// Check that exactly one complete value was written and return the sink.
    pub fn finish(mut self) -> Result<W, StreamError> {
        if self.stack.as_slice() != [Scope::NonEmptyDocument] || self.deferred_name.is_some() {
            return Err(StreamError::nesting("Incomplete document"));
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.out.write_all(bytes)?;
        Ok(())
    }

    fn top(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::NonEmptyDocument)
    }

    fn replace_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn newline(&mut self) -> Result<(), StreamError> {
        let Some(indent) = &self.indent else {
            return Ok(());
        };
        let mut line = String::from("\n");
        for _ in 1..self.stack.len() {
            line.push_str(indent);
        }
        self.raw(line.as_bytes())
    }

    fn before_value(&mut self) -> Result<(), StreamError> {
        match self.top() {
            Scope::NonEmptyDocument => Err(StreamError::nesting(
                "JSON must have only one top-level value",
            )),
            Scope::EmptyDocument => {
                self.replace_top(Scope::NonEmptyDocument);
                Ok(())
            }
            Scope::EmptyArray => {
                self.replace_top(Scope::NonEmptyArray);
                self.newline()
            }
            Scope::NonEmptyArray => {
                self.raw(b",")?;
                self.newline()
            }
            Scope::DanglingName => {
                if self.indent.is_some() {
                    self.raw(b": ")?;
                } else {
                    self.raw(b":")?;
                }
                self.replace_top(Scope::NonEmptyObject);
                Ok(())
            }
            Scope::EmptyObject | Scope::NonEmptyObject => {
                Err(StreamError::nesting("expected a name before the value"))
            }
        }
    }

    fn write_deferred_name(&mut self) -> Result<(), StreamError> {
        let Some(name) = self.deferred_name.take() else {
            return Ok(());
        };
        match self.top() {
            Scope::NonEmptyObject => self.raw(b",")?,
            Scope::EmptyObject => {}
            _ => return Err(StreamError::nesting("names are only valid inside objects")),
        }
        self.newline()?;
        self.replace_top(Scope::DanglingName);
        self.write_string(&name)
    }

    fn open(&mut self, scope: Scope, bracket: &[u8]) -> Result<(), StreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.stack.push(scope);
        self.raw(bracket)
    }

    fn close(&mut self, empty: Scope, non_empty: Scope, bracket: &[u8]) -> Result<(), StreamError> {
        if self.deferred_name.is_some() {
            return Err(StreamError::nesting("dangling name"));
        }
        let top = self.top();
        if top != empty && top != non_empty {
            return Err(StreamError::nesting("nesting problem"));
        }
        self.stack.pop();
        if top == non_empty {
            self.newline()?;
        }
        self.raw(bracket)
    }

    fn write_string(&mut self, value: &str) -> Result<(), StreamError> {
        let mut buf = Vec::with_capacity(value.len() + 2);
        write_json_string(&mut buf, value);
        self.raw(&buf)
    }
}

impl<W: Write> TokenWriter for JsonWriter<W> {
    fn begin_array(&mut self) -> Result<(), StreamError> {
        self.open(Scope::EmptyArray, b"[")
    }

    fn end_array(&mut self) -> Result<(), StreamError> {
        self.close(Scope::EmptyArray, Scope::NonEmptyArray, b"]")
    }

    fn begin_object(&mut self) -> Result<(), StreamError> {
        self.open(Scope::EmptyObject, b"{")
    }

    fn end_object(&mut self) -> Result<(), StreamError> {
        self.close(Scope::EmptyObject, Scope::NonEmptyObject, b"}")
    }

    fn name(&mut self, name: &str) -> Result<(), StreamError> {
        if self.deferred_name.is_some() {
            return Err(StreamError::nesting("already wrote a name, expecting a value"));
        }
        if !matches!(self.top(), Scope::EmptyObject | Scope::NonEmptyObject) {
            return Err(StreamError::nesting("names are only valid inside objects"));
        }
        self.deferred_name = Some(name.to_owned());
        Ok(())
    }

    fn null_value(&mut self) -> Result<(), StreamError> {
        if self.deferred_name.is_some() {
            if self.serialize_nulls {
                self.write_deferred_name()?;
            } else {
                // drop the whole member
                self.deferred_name = None;
                return Ok(());
            }
        }
        self.before_value()?;
        self.raw(b"null")
    }

    fn bool_value(&mut self, value: bool) -> Result<(), StreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        if value {
            self.raw(b"true")
        } else {
            self.raw(b"false")
        }
    }

    fn string_value(&mut self, value: &str) -> Result<(), StreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.write_string(value)
    }

    fn number_value(&mut self, literal: &str) -> Result<(), StreamError> {
        if !is_json_number(literal) {
            return Err(StreamError::InvalidNumber {
                literal: literal.to_owned(),
            });
        }
        self.write_deferred_name()?;
        self.before_value()?;
        self.raw(literal.as_bytes())
    }
}

/// Append `s` to `out` as a quoted JSON string.
fn write_json_string(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    let mut run_start = 0;
    for (i, c) in s.char_indices() {
        let escape: Option<&[u8]> = match c {
            '"' => Some(b"\\\""),
            '\\' => Some(b"\\\\"),
            '\n' => Some(b"\\n"),
            '\r' => Some(b"\\r"),
            '\t' => Some(b"\\t"),
            '\u{08}' => Some(b"\\b"),
            '\u{0C}' => Some(b"\\f"),
            '\u{2028}' => Some(b"\\u2028"),
            '\u{2029}' => Some(b"\\u2029"),
            c if c.is_ascii_control() => None,
            _ => continue,
        };
        out.extend_from_slice(&s.as_bytes()[run_start..i]);
        run_start = i + c.len_utf8();
        match escape {
            Some(bytes) => out.extend_from_slice(bytes),
            None => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                let code = c as usize;
                out.extend_from_slice(&[
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[(code >> 4) & 0xF],
                    HEX[code & 0xF],
                ]);
            }
        }
    }
    out.extend_from_slice(&s.as_bytes()[run_start..]);
    out.push(b'"');
}
