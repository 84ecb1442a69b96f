use core::any::Any;
use std::sync::Arc;

use typebind_core::{Def, ListOps, MapOps, Reflected, TypeDescriptor, TypeMismatch};
use typebind_format::{SyntaxError, TokenKind, TokenReader, TokenWriter};

use crate::{AdapterFactory, ErasedAdapter, Error, Resolver, Result, trace};

/// A `null` where the container's element type has no null.
fn null_entry(what: &str, path: String) -> Error {
    SyntaxError::new(format!("a non-null {what}"), TokenKind::Null, path).into()
}

/// Adapters for sequence types: `Vec<T>` and arrays (`Box<[T]>`).
pub struct ListFactory;

impl AdapterFactory for ListFactory {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        let Some(Def::List(ops)) = descriptor.def() else {
            return Ok(None);
        };
        let element_type = (ops.element)()?;
        trace!(%descriptor, element = %element_type, "binding list element adapter");
        let element = resolver.resolve(&element_type)?;
        Ok(Some(Arc::new(ListAdapter { ops, element })))
    }
}

struct ListAdapter {
    ops: ListOps,
    element: Arc<dyn ErasedAdapter>,
}

impl ErasedAdapter for ListAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        if reader.consume_null()? {
            return Ok(None);
        }
        reader.begin_array()?;
        let mut builder = (self.ops.new)();
        while reader.has_next()? {
            let null_path = (reader.peek()? == TokenKind::Null).then(|| reader.path());
            match self.element.read_erased(reader)? {
                Some(item) => (self.ops.push)(&mut *builder, item)?,
                None => {
                    return Err(null_entry(
                        "element",
                        null_path.unwrap_or_else(|| reader.path()),
                    ));
                }
            }
        }
        reader.end_array()?;
        Ok(Some((self.ops.finish)(builder)?))
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        let Some(list) = value else {
            writer.null_value()?;
            return Ok(());
        };
        let items =
            (self.ops.items)(list).ok_or_else(|| TypeMismatch::new("a list", list.type_name()))?;
        writer.begin_array()?;
        for item in items {
            self.element.write_erased(writer, Some(item))?;
        }
        writer.end_array()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Adapters for maps whose keys convert to and from member names.
pub struct MapFactory;

impl AdapterFactory for MapFactory {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        let Some(Def::Map(ops)) = descriptor.def() else {
            return Ok(None);
        };
        let value_type = (ops.value)()?;
        trace!(%descriptor, value = %value_type, "binding map value adapter");
        let value = resolver.resolve(&value_type)?;
        Ok(Some(Arc::new(MapAdapter { ops, value })))
    }
}

struct MapAdapter {
    ops: MapOps,
    value: Arc<dyn ErasedAdapter>,
}

impl ErasedAdapter for MapAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        if reader.consume_null()? {
            return Ok(None);
        }
        reader.begin_object()?;
        let mut map = (self.ops.new)();
        while reader.has_next()? {
            let key = reader.next_name()?;
            let null_path = (reader.peek()? == TokenKind::Null).then(|| reader.path());
            match self.value.read_erased(reader)? {
                // a repeated key replaces the earlier value
                Some(value) => (self.ops.insert)(&mut *map, &key, value)?,
                None => {
                    return Err(null_entry(
                        "map value",
                        null_path.unwrap_or_else(|| reader.path()),
                    ));
                }
            }
        }
        reader.end_object()?;
        Ok(Some(map))
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        let Some(map) = value else {
            writer.null_value()?;
            return Ok(());
        };
        let entries =
            (self.ops.entries)(map).ok_or_else(|| TypeMismatch::new("a map", map.type_name()))?;
        writer.begin_object()?;
        for (key, entry) in entries {
            writer.name(&key)?;
            self.value.write_erased(writer, Some(entry))?;
        }
        writer.end_object()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
