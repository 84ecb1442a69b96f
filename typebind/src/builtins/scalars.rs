use core::any::type_name;
use core::marker::PhantomData;
use std::sync::Arc;

use lexical_parse_float::FromLexical as _;
use typebind_core::{
    DeferredNumber, ExactDecimal, Number, Reflect, TypeDescriptor, TypeShape, raw,
};
use typebind_format::{StreamError, TokenKind, TokenReader, TokenWriter};

use crate::codec::write_number;
use crate::{
    AdapterFactory, ErasedAdapter, Error, Resolver, Result, ToNumberStrategy, TypeAdapter,
    ValueAdapter, erase, next_number_text,
};

/// Adapters for `bool`, `char`, `String`, the primitive numbers,
/// [`Number`], [`DeferredNumber`] and [`typebind_core::Value`].
pub struct ScalarFactory {
    numbers: Arc<dyn ToNumberStrategy>,
}

impl ScalarFactory {
    /// A factory whose [`Number`] adapters read with `numbers`.
    pub fn new(numbers: Arc<dyn ToNumberStrategy>) -> Self {
        Self { numbers }
    }
}

impl AdapterFactory for ScalarFactory {
    fn create(
        &self,
        _resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        let TypeShape::Raw(found) = descriptor.shape() else {
            return Ok(None);
        };
        let found = *found;

        macro_rules! scalar {
            ($($raw:ident => $adapter:expr),* $(,)?) => {
                $(
                    if found == &raw::$raw {
                        return Ok(Some($adapter));
                    }
                )*
            };
        }

        scalar! {
            BOOL => erase(BoolAdapter),
            CHAR => erase(CharAdapter),
            STRING => erase(StringAdapter),
            I8 => erase(IntAdapter::<i8>::new()),
            I16 => erase(IntAdapter::<i16>::new()),
            I32 => erase(IntAdapter::<i32>::new()),
            I64 => erase(IntAdapter::<i64>::new()),
            I128 => erase(IntAdapter::<i128>::new()),
            ISIZE => erase(IntAdapter::<isize>::new()),
            U8 => erase(IntAdapter::<u8>::new()),
            U16 => erase(IntAdapter::<u16>::new()),
            U32 => erase(IntAdapter::<u32>::new()),
            U64 => erase(IntAdapter::<u64>::new()),
            U128 => erase(IntAdapter::<u128>::new()),
            USIZE => erase(IntAdapter::<usize>::new()),
            F32 => erase(F32Adapter),
            F64 => erase(F64Adapter),
            NUMBER => erase(NumberAdapter { numbers: Arc::clone(&self.numbers) }),
            DEFERRED_NUMBER => erase(DeferredNumberAdapter),
            VALUE => Arc::new(ValueAdapter::new(Arc::clone(&self.numbers))),
        }
        Ok(None)
    }
}

struct BoolAdapter;

impl TypeAdapter for BoolAdapter {
    type Value = bool;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<bool>> {
        match reader.peek()? {
            TokenKind::Null => {
                reader.next_null()?;
                Ok(None)
            }
            TokenKind::String => Ok(Some(reader.next_string()?.eq_ignore_ascii_case("true"))),
            _ => Ok(Some(reader.next_bool()?)),
        }
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&bool>) -> Result<()> {
        match value {
            Some(value) => writer.bool_value(*value)?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

struct StringAdapter;

impl TypeAdapter for StringAdapter {
    type Value = String;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<String>> {
        match reader.peek()? {
            TokenKind::Null => {
                reader.next_null()?;
                Ok(None)
            }
            TokenKind::Boolean => Ok(Some(reader.next_bool()?.to_string())),
            _ => Ok(Some(reader.next_string()?)),
        }
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&String>) -> Result<()> {
        match value {
            Some(value) => writer.string_value(value)?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

struct CharAdapter;

impl TypeAdapter for CharAdapter {
    type Value = char;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<char>> {
        if reader.consume_null()? {
            return Ok(None);
        }
        let text = reader.next_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Some(c)),
            _ => Err(Error::conversion(text, "char", reader.path())),
        }
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&char>) -> Result<()> {
        match value {
            Some(value) => writer.string_value(value.encode_utf8(&mut [0; 4]))?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

/// Integer types the integer adapter handles.
trait Integer:
    Reflect
    + Send
    + Sync
    + Copy
    + lexical_parse_integer::FromLexical
    + itoa::Integer
    + TryFrom<i128>
    + TryFrom<u128>
{
}

impl<T> Integer for T where
    T: Reflect
        + Send
        + Sync
        + Copy
        + lexical_parse_integer::FromLexical
        + itoa::Integer
        + TryFrom<i128>
        + TryFrom<u128>
{
}

/// Plain integer text first; anything else that denotes a whole number in
/// range, such as `1.0` or `2e3`, through its exact value.
fn parse_integer<T: Integer>(text: &str) -> Option<T> {
    if let Ok(value) = T::from_lexical(text.as_bytes()) {
        return Some(value);
    }
    let exact = ExactDecimal::parse(text).ok()?;
    match exact.to_i128() {
        Some(value) => <T as TryFrom<i128>>::try_from(value).ok(),
        None => <T as TryFrom<u128>>::try_from(exact.to_u128()?).ok(),
    }
}

struct IntAdapter<T>(PhantomData<fn() -> T>);

impl<T> IntAdapter<T> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Integer> TypeAdapter for IntAdapter<T> {
    type Value = T;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<T>> {
        let Some(text) = next_number_text(reader)? else {
            return Ok(None);
        };
        match parse_integer::<T>(&text) {
            Some(value) => Ok(Some(value)),
            None => Err(Error::conversion(text, type_name::<T>(), reader.path())),
        }
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&T>) -> Result<()> {
        match value {
            Some(value) => writer.number_value(itoa::Buffer::new().format(*value))?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

macro_rules! float_adapter {
    ($name:ident, $ty:ty) => {
        struct $name;

        impl TypeAdapter for $name {
            type Value = $ty;

            fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<$ty>> {
                let Some(text) = next_number_text(reader)? else {
                    return Ok(None);
                };
                match <$ty>::from_lexical(text.as_bytes()) {
                    Ok(value) if value.is_finite() => Ok(Some(value)),
                    _ => Err(Error::conversion(text, stringify!($ty), reader.path())),
                }
            }

            fn write(&self, writer: &mut dyn TokenWriter, value: Option<&$ty>) -> Result<()> {
                match value {
                    Some(value) if !value.is_finite() => {
                        return Err(StreamError::InvalidNumber {
                            literal: value.to_string(),
                        }
                        .into());
                    }
                    Some(value) => {
                        writer.number_value(ryu_js::Buffer::new().format_finite(*value))?
                    }
                    None => writer.null_value()?,
                }
                Ok(())
            }
        }
    };
}

float_adapter!(F32Adapter, f32);
float_adapter!(F64Adapter, f64);

struct NumberAdapter {
    numbers: Arc<dyn ToNumberStrategy>,
}

impl TypeAdapter for NumberAdapter {
    type Value = Number;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<Number>> {
        self.numbers.read_number(reader)
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&Number>) -> Result<()> {
        match value {
            Some(number) => write_number(writer, number)?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

struct DeferredNumberAdapter;

impl TypeAdapter for DeferredNumberAdapter {
    type Value = DeferredNumber;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<DeferredNumber>> {
        Ok(next_number_text(reader)?.map(DeferredNumber::new))
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&DeferredNumber>) -> Result<()> {
        match value {
            Some(number) => writer.number_value(number.as_str())?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}
