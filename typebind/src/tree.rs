//! Token streams over an in-memory [`Value`] tree.

use core::iter::Peekable;

use indexmap::IndexMap;
use typebind_core::{DeferredNumber, Number, Value};
use typebind_format::{JsonPath, StreamError, TokenKind, TokenReader, TokenWriter, is_json_number};

/// Builds a [`Value`] from writer calls.
///
/// Like [`typebind_json::JsonWriter`], object members whose value is
/// `null` are dropped unless [`TreeWriter::serialize_nulls`] is enabled.
#[derive(Debug, Default)]
pub struct TreeWriter {
    stack: Vec<(Option<String>, Container)>,
    pending_name: Option<String>,
    root: Option<Value>,
    serialize_nulls: bool,
}

#[derive(Debug)]
enum Container {
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl TreeWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep object members whose value is `null`.
    pub fn serialize_nulls(mut self, yes: bool) -> Self {
        self.serialize_nulls = yes;
        self
    }

    /// The finished tree.
    pub fn finish(self) -> Result<Value, StreamError> {
        match self.root {
            Some(root) if self.stack.is_empty() => Ok(root),
            _ => Err(StreamError::nesting("Incomplete document")),
        }
    }

    fn put(&mut self, value: Value) -> Result<(), StreamError> {
        match self.stack.last_mut() {
            None => {
                if self.root.is_some() {
                    return Err(StreamError::nesting("Document already has a root value"));
                }
                self.root = Some(value);
            }
            Some((_, Container::Array(items))) => items.push(value),
            Some((_, Container::Object(members))) => {
                let name = self
                    .pending_name
                    .take()
                    .ok_or_else(|| StreamError::nesting("Object member without a name"))?;
                if !value.is_null() || self.serialize_nulls {
                    members.insert(name, value);
                }
            }
        }
        Ok(())
    }

    fn open(&mut self, container: Container) -> Result<(), StreamError> {
        let name = match self.stack.last() {
            Some((_, Container::Object(_))) => Some(
                self.pending_name
                    .take()
                    .ok_or_else(|| StreamError::nesting("Object member without a name"))?,
            ),
            None if self.root.is_some() => {
                return Err(StreamError::nesting("Document already has a root value"));
            }
            _ => None,
        };
        self.stack.push((name, container));
        Ok(())
    }

    fn close(&mut self, array: bool) -> Result<(), StreamError> {
        let matches = match self.stack.last() {
            Some((_, Container::Array(_))) => array,
            Some((_, Container::Object(_))) => !array && self.pending_name.is_none(),
            None => false,
        };
        let popped = if matches { self.stack.pop() } else { None };
        let Some((name, container)) = popped else {
            return Err(StreamError::nesting("Nesting problem"));
        };
        self.pending_name = name;
        self.put(match container {
            Container::Array(items) => Value::Array(items),
            Container::Object(members) => Value::Object(members),
        })
    }
}

impl TokenWriter for TreeWriter {
    fn begin_array(&mut self) -> Result<(), StreamError> {
        self.open(Container::Array(Vec::new()))
    }

    fn end_array(&mut self) -> Result<(), StreamError> {
        self.close(true)
    }

    fn begin_object(&mut self) -> Result<(), StreamError> {
        self.open(Container::Object(IndexMap::new()))
    }

    fn end_object(&mut self) -> Result<(), StreamError> {
        self.close(false)
    }

    fn name(&mut self, name: &str) -> Result<(), StreamError> {
        let in_object = matches!(self.stack.last(), Some((_, Container::Object(_))));
        if !in_object || self.pending_name.is_some() {
            return Err(StreamError::nesting("Nesting problem"));
        }
        self.pending_name = Some(name.to_owned());
        Ok(())
    }

    fn null_value(&mut self) -> Result<(), StreamError> {
        self.put(Value::Null)
    }

    fn bool_value(&mut self, value: bool) -> Result<(), StreamError> {
        self.put(Value::Bool(value))
    }

    fn string_value(&mut self, value: &str) -> Result<(), StreamError> {
        self.put(Value::String(value.to_owned()))
    }

    fn number_value(&mut self, literal: &str) -> Result<(), StreamError> {
        if !is_json_number(literal) {
            return Err(StreamError::InvalidNumber {
                literal: literal.to_owned(),
            });
        }
        self.put(Value::Number(Number::Deferred(DeferredNumber::new(literal))))
    }

    fn i64_value(&mut self, value: i64) -> Result<(), StreamError> {
        self.put(Value::Number(Number::Int(value)))
    }

    fn f64_value(&mut self, value: f64) -> Result<(), StreamError> {
        if !value.is_finite() {
            return Err(StreamError::InvalidNumber {
                literal: value.to_string(),
            });
        }
        self.put(Value::Number(Number::Float(value)))
    }
}

enum Node {
    /// A value not yet consumed: the root, or an object member's value
    /// after its name was read.
    Pending(Value),
    Array(Peekable<std::vec::IntoIter<Value>>),
    Object(Peekable<indexmap::map::IntoIter<String, Value>>),
}

/// Reads a [`Value`] tree as a token stream.
pub struct TreeReader {
    stack: Vec<Node>,
    path: JsonPath,
}

fn kind_of(value: &Value) -> TokenKind {
    match value {
        Value::Null => TokenKind::Null,
        Value::Bool(_) => TokenKind::Boolean,
        Value::Number(_) => TokenKind::Number,
        Value::String(_) => TokenKind::String,
        Value::Array(_) => TokenKind::BeginArray,
        Value::Object(_) => TokenKind::BeginObject,
    }
}

impl TreeReader {
    /// A reader positioned before `root`.
    pub fn new(root: Value) -> Self {
        Self {
            stack: vec![Node::Pending(root)],
            path: JsonPath::new(),
        }
    }

    fn kind(&mut self) -> TokenKind {
        match self.stack.last_mut() {
            None => TokenKind::EndDocument,
            Some(Node::Pending(value)) => kind_of(value),
            Some(Node::Array(items)) => items.peek().map_or(TokenKind::EndArray, kind_of),
            Some(Node::Object(members)) => match members.peek() {
                Some(_) => TokenKind::Name,
                None => TokenKind::EndObject,
            },
        }
    }

    /// Take the next value, which must be of kind `expected`.
    fn take(&mut self, expected: TokenKind, description: &str) -> Result<Value, StreamError> {
        let found = self.kind();
        if found != expected {
            return Err(StreamError::syntax(description, found, self.path.format()));
        }
        let value = if matches!(self.stack.last(), Some(Node::Pending(_))) {
            match self.stack.pop() {
                Some(Node::Pending(value)) => Some(value),
                _ => None,
            }
        } else if let Some(Node::Array(items)) = self.stack.last_mut() {
            items.next()
        } else {
            None
        };
        value.ok_or_else(|| StreamError::syntax(description, found, self.path.format()))
    }

    /// A scalar was consumed or a container closed.
    fn finish_value(&mut self) {
        self.path.advance();
    }
}

impl TokenReader for TreeReader {
    fn peek(&mut self) -> Result<TokenKind, StreamError> {
        Ok(self.kind())
    }

    fn begin_array(&mut self) -> Result<(), StreamError> {
        let Value::Array(items) = self.take(TokenKind::BeginArray, "BEGIN_ARRAY")? else {
            return Err(self.unexpected("BEGIN_ARRAY"));
        };
        self.stack.push(Node::Array(items.into_iter().peekable()));
        self.path.push_array();
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), StreamError> {
        let found = self.kind();
        if found != TokenKind::EndArray {
            return Err(StreamError::syntax("END_ARRAY", found, self.path.format()));
        }
        self.stack.pop();
        self.path.pop();
        self.finish_value();
        Ok(())
    }

    fn begin_object(&mut self) -> Result<(), StreamError> {
        let Value::Object(members) = self.take(TokenKind::BeginObject, "BEGIN_OBJECT")? else {
            return Err(self.unexpected("BEGIN_OBJECT"));
        };
        self.stack.push(Node::Object(members.into_iter().peekable()));
        self.path.push_object();
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), StreamError> {
        let found = self.kind();
        if found != TokenKind::EndObject {
            return Err(StreamError::syntax("END_OBJECT", found, self.path.format()));
        }
        self.stack.pop();
        self.path.pop();
        self.finish_value();
        Ok(())
    }

    fn next_name(&mut self) -> Result<String, StreamError> {
        let member = match self.stack.last_mut() {
            Some(Node::Object(members)) => members.next(),
            _ => None,
        };
        let Some((name, value)) = member else {
            let found = self.kind();
            return Err(StreamError::syntax("a name", found, self.path.format()));
        };
        self.path.set_name(&name);
        self.stack.push(Node::Pending(value));
        Ok(name)
    }

    fn next_string(&mut self) -> Result<String, StreamError> {
        let text = match self.kind() {
            TokenKind::Number => match self.take(TokenKind::Number, "a string")? {
                Value::Number(number) => number.to_string(),
                _ => String::new(),
            },
            _ => match self.take(TokenKind::String, "a string")? {
                Value::String(text) => text,
                _ => String::new(),
            },
        };
        self.finish_value();
        Ok(text)
    }

    fn next_bool(&mut self) -> Result<bool, StreamError> {
        let value = self.take(TokenKind::Boolean, "a boolean")?.as_bool();
        self.finish_value();
        Ok(value.unwrap_or_default())
    }

    fn next_null(&mut self) -> Result<(), StreamError> {
        self.take(TokenKind::Null, "null")?;
        self.finish_value();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<(), StreamError> {
        if self.kind() == TokenKind::Name {
            self.next_name()?;
        }
        let found = self.kind();
        if !found.starts_value() {
            return Err(StreamError::syntax("a value", found, self.path.format()));
        }
        self.take(found, "a value")?;
        self.finish_value();
        Ok(())
    }

    fn path(&self) -> String {
        self.path.format()
    }
}
