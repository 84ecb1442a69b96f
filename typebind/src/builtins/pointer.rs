use core::any::Any;
use std::sync::Arc;

use typebind_core::{Def, PointerOps, Reflected, TypeDescriptor, TypeMismatch};
use typebind_format::{TokenReader, TokenWriter};

use crate::{AdapterFactory, ErasedAdapter, Resolver, Result, trace};

/// Adapters for `Arc<T>`, which always delegate to `T`'s adapter. The
/// delegate is looked up once, when the pointer adapter is created.
pub struct ArcFactory;

impl AdapterFactory for ArcFactory {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        let Some(Def::Pointer(ops)) = descriptor.def() else {
            return Ok(None);
        };
        let pointee = (ops.inner)()?;
        trace!(%descriptor, %pointee, "binding pointee adapter");
        let inner = resolver.resolve(&pointee)?;
        Ok(Some(Arc::new(PointerAdapter { ops, inner })))
    }
}

struct PointerAdapter {
    ops: PointerOps,
    inner: Arc<dyn ErasedAdapter>,
}

impl ErasedAdapter for PointerAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        match self.inner.read_erased(reader)? {
            Some(value) => Ok(Some((self.ops.wrap)(value)?)),
            None => Ok(None),
        }
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        let Some(pointer) = value else {
            return self.inner.write_erased(writer, None);
        };
        let pointee = (self.ops.get)(pointer)
            .ok_or_else(|| TypeMismatch::new("a shared pointer", pointer.type_name()))?;
        self.inner.write_erased(writer, Some(pointee))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
