//! The top-type codec and the generic [`Value`] tree.

use core::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use typebind_core::{Number, Reflected, TypeDescriptor, TypeMismatch, Value};
use typebind_format::{StreamError, SyntaxError, TokenKind, TokenReader, TokenWriter};

use crate::{
    AdapterFactory, ErasedAdapter, RegistryHandle, Resolver, Result, ToNumberStrategy, trace,
};

/// Produces the [`ValueCodec`] for the top type and declines every other
/// type, so more specific factories always take precedence.
pub struct ValueCodecFactory {
    numbers: Arc<dyn ToNumberStrategy>,
}

impl ValueCodecFactory {
    /// A factory whose codecs read numbers with `numbers`.
    pub fn new(numbers: Arc<dyn ToNumberStrategy>) -> Self {
        Self { numbers }
    }
}

impl AdapterFactory for ValueCodecFactory {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        if !descriptor.is_top() {
            return Ok(None);
        }
        Ok(Some(Arc::new(ValueCodec {
            numbers: Arc::clone(&self.numbers),
            registry: resolver.registry(),
        })))
    }
}

/// Adapter for values declared with the top type.
///
/// Reading yields a [`Value`] tree, since nothing more specific is known.
/// Writing looks at the runtime type of the value and delegates to the
/// adapter the registry has for that type. A value whose runtime type is
/// the top type itself is written as `{}`.
pub struct ValueCodec {
    numbers: Arc<dyn ToNumberStrategy>,
    registry: RegistryHandle,
}

impl ErasedAdapter for ValueCodec {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        Ok(Some(Box::new(read_value(&*self.numbers, reader)?)))
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        let Some(value) = value else {
            writer.null_value()?;
            return Ok(());
        };
        let runtime = value.runtime_type()?;
        let adapter = self.registry.resolve(&runtime)?;
        if adapter.as_any().is::<ValueCodec>() {
            trace!(%runtime, "runtime type is the top type, writing an empty object");
            writer.begin_object()?;
            writer.end_object()?;
            return Ok(());
        }
        adapter.write_erased(writer, Some(value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Adapter for [`Value`] itself. `null` reads as [`Value::Null`].
pub struct ValueAdapter {
    numbers: Arc<dyn ToNumberStrategy>,
}

impl ValueAdapter {
    /// An adapter reading numbers with `numbers`.
    pub fn new(numbers: Arc<dyn ToNumberStrategy>) -> Self {
        Self { numbers }
    }
}

impl ErasedAdapter for ValueAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        Ok(Some(Box::new(read_value(&*self.numbers, reader)?)))
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        match value {
            None => writer.null_value()?,
            Some(value) => {
                let tree = value
                    .downcast_ref::<Value>()
                    .ok_or_else(|| TypeMismatch::expected::<Value>(value.type_name()))?;
                write_value(writer, tree)?;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn read_value(
    numbers: &dyn ToNumberStrategy,
    reader: &mut dyn TokenReader,
) -> Result<Value> {
    match reader.peek()? {
        TokenKind::Null => {
            reader.next_null()?;
            Ok(Value::Null)
        }
        TokenKind::Boolean => Ok(Value::Bool(reader.next_bool()?)),
        TokenKind::Number => Ok(numbers
            .read_number(reader)?
            .map_or(Value::Null, Value::Number)),
        TokenKind::String => Ok(Value::String(reader.next_string()?)),
        TokenKind::BeginArray => {
            reader.begin_array()?;
            let mut items = Vec::new();
            while reader.has_next()? {
                items.push(read_value(numbers, reader)?);
            }
            reader.end_array()?;
            Ok(Value::Array(items))
        }
        TokenKind::BeginObject => {
            reader.begin_object()?;
            let mut members = IndexMap::new();
            while reader.has_next()? {
                let name = reader.next_name()?;
                let value = read_value(numbers, reader)?;
                // a repeated name keeps its first position and its last value
                members.insert(name, value);
            }
            reader.end_object()?;
            Ok(Value::Object(members))
        }
        found => Err(SyntaxError::new("a value", found, reader.path()).into()),
    }
}

pub(crate) fn write_value(writer: &mut dyn TokenWriter, value: &Value) -> Result<(), StreamError> {
    match value {
        Value::Null => writer.null_value(),
        Value::Bool(value) => writer.bool_value(*value),
        Value::Number(number) => write_number(writer, number),
        Value::String(value) => writer.string_value(value),
        Value::Array(items) => {
            writer.begin_array()?;
            for item in items {
                write_value(writer, item)?;
            }
            writer.end_array()
        }
        Value::Object(members) => {
            writer.begin_object()?;
            for (name, member) in members {
                writer.name(name)?;
                write_value(writer, member)?;
            }
            writer.end_object()
        }
    }
}

pub(crate) fn write_number(
    writer: &mut dyn TokenWriter,
    number: &Number,
) -> Result<(), StreamError> {
    match number {
        Number::Float(value) => writer.f64_value(*value),
        Number::Int(value) => writer.i64_value(*value),
        Number::Decimal(value) => writer.number_value(&value.to_string()),
        Number::Deferred(value) => writer.number_value(value.as_str()),
    }
}
