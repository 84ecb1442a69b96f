use core::any::Any;
use std::sync::Arc;

use typebind_core::{Def, OptionOps, Reflected, TypeDescriptor, TypeMismatch};
use typebind_format::{TokenReader, TokenWriter};

use crate::{AdapterFactory, ErasedAdapter, Resolver, Result};

/// Adapters for `Option<T>`: `null` is `None`, anything else goes to
/// `T`'s adapter.
pub struct OptionFactory;

impl AdapterFactory for OptionFactory {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        let Some(Def::Option(ops)) = descriptor.def() else {
            return Ok(None);
        };
        let inner = resolver.resolve(&(ops.inner)()?)?;
        Ok(Some(Arc::new(OptionAdapter { ops, inner })))
    }
}

struct OptionAdapter {
    ops: OptionOps,
    inner: Arc<dyn ErasedAdapter>,
}

impl ErasedAdapter for OptionAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        if reader.consume_null()? {
            return Ok(Some((self.ops.none)()));
        }
        let option = match self.inner.read_erased(reader)? {
            Some(value) => (self.ops.some)(value)?,
            None => (self.ops.none)(),
        };
        Ok(Some(option))
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        let Some(option) = value else {
            writer.null_value()?;
            return Ok(());
        };
        match (self.ops.get)(option) {
            Some(Some(inner)) => self.inner.write_erased(writer, Some(inner)),
            Some(None) => Ok(writer.null_value()?),
            None => Err(TypeMismatch::new("an option", option.type_name()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
