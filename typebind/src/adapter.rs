//! Adapters: converters between a token stream and values of one type.

use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use typebind_core::{Reflect, Reflected, TypeMismatch};
use typebind_format::{TokenReader, TokenWriter};
use typebind_json::{JsonReader, JsonWriter};

use crate::Result;

/// A converter for one type, working on type-erased values.
///
/// This is the form the registry caches and hands to factories. `None`
/// stands for a `null` in the document: reading `null` yields `Ok(None)`
/// and writing `None` emits `null`.
pub trait ErasedAdapter: Send + Sync + 'static {
    /// Read one value.
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>>;

    /// Write one value.
    fn write_erased(&self, writer: &mut dyn TokenWriter, value: Option<&dyn Reflected>)
    -> Result<()>;

    /// The concrete adapter, for identity checks and downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn ErasedAdapter {
    /// Borrow as `A` if that is the concrete adapter.
    pub fn downcast_ref<A: Any>(&self) -> Option<&A> {
        self.as_any().downcast_ref()
    }
}

impl fmt::Debug for dyn ErasedAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedAdapter")
    }
}

/// A converter written against a concrete type.
///
/// Register one with [`crate::EngineBuilder::register_adapter`], or wrap it
/// with [`erase`] to return it from a factory.
///
/// ```
/// use typebind::{Engine, Result, TokenKind, TokenReader, TokenWriter, TypeAdapter};
///
/// /// Booleans as `0` and `1`.
/// struct Bit;
///
/// impl TypeAdapter for Bit {
///     type Value = bool;
///
///     fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<bool>> {
///         if reader.consume_null()? {
///             return Ok(None);
///         }
///         Ok(Some(reader.next_string()? != "0"))
///     }
///
///     fn write(&self, writer: &mut dyn TokenWriter, value: Option<&bool>) -> Result<()> {
///         match value {
///             Some(bit) => writer.number_value(if *bit { "1" } else { "0" })?,
///             None => writer.null_value()?,
///         }
///         Ok(())
///     }
/// }
///
/// let engine = Engine::builder().register_adapter(Bit).unwrap().build();
/// assert_eq!(engine.to_json(&vec![true, false]).unwrap(), "[1,0]");
/// ```
pub trait TypeAdapter: Send + Sync + 'static {
    /// The type converted.
    type Value: Reflect + Send + Sync;

    /// Read one value, or `None` for `null`.
    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<Self::Value>>;

    /// Write one value, or `null` for `None`.
    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&Self::Value>) -> Result<()>;
}

/// Erased form of a [`TypeAdapter`].
pub struct Erased<A>(pub A);

impl<A: TypeAdapter> ErasedAdapter for Erased<A> {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        Ok(self
            .0
            .read(reader)?
            .map(|value| Box::new(value) as Box<dyn Reflected>))
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        let Some(value) = value else {
            return self.0.write(writer, None);
        };
        let typed = value
            .downcast_ref::<A::Value>()
            .ok_or_else(|| TypeMismatch::expected::<A::Value>(value.type_name()))?;
        self.0.write(writer, Some(typed))
    }

    fn as_any(&self) -> &dyn Any {
        &self.0
    }
}

/// Erase a typed adapter.
pub fn erase<A: TypeAdapter>(adapter: A) -> Arc<dyn ErasedAdapter> {
    Arc::new(Erased(adapter))
}

/// A resolved adapter viewed at its Rust type.
pub struct TypedAdapter<T> {
    inner: Arc<dyn ErasedAdapter>,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedAdapter<{}>", core::any::type_name::<T>())
    }
}

impl<T: Reflect + Send + Sync> TypedAdapter<T> {
    /// View `inner` as an adapter for `T`. Values of any other type are
    /// reported as [`crate::Error::TypeMismatch`].
    pub fn new(inner: Arc<dyn ErasedAdapter>) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }

    /// The underlying erased adapter; the same instance the registry caches.
    pub fn erased(&self) -> &Arc<dyn ErasedAdapter> {
        &self.inner
    }

    /// Read one value, or `None` for `null`.
    pub fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<T>> {
        match self.inner.read_erased(reader)? {
            Some(value) => Ok(Some(T::from_instance(value)?)),
            None => Ok(None),
        }
    }

    /// Write one value, or `null` for `None`.
    pub fn write(&self, writer: &mut dyn TokenWriter, value: Option<&T>) -> Result<()> {
        self.inner.write_erased(writer, value.map(T::as_instance))
    }

    /// Compact JSON for `value`.
    pub fn to_json(&self, value: &T) -> Result<String> {
        let mut writer = JsonWriter::new(Vec::new());
        self.write(&mut writer, Some(value))?;
        crate::engine::utf8(writer.finish()?)
    }

    /// Parse a complete document.
    pub fn from_json(&self, json: &str) -> Result<Option<T>> {
        let mut reader = JsonReader::new(json);
        let value = self.read(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}
