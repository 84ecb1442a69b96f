use core::any::Any;
use std::sync::Arc;

use typebind_core::{Def, FieldDef, Instantiator, Reflected, TypeDescriptor, TypeMismatch};
use typebind_format::{TokenReader, TokenWriter};

use crate::{AdapterFactory, ErasedAdapter, Resolver, Result, trace};

/// Field-by-field adapters for reflected structs.
///
/// Decoding starts from an instance produced by the [`Instantiator`], so
/// members missing from the document keep their constructed or zero
/// values, as do members that are `null`. Unknown members are skipped.
pub struct ReflectiveFactory {
    instantiator: Instantiator,
}

impl ReflectiveFactory {
    /// A factory instantiating structs with `instantiator`.
    pub fn new(instantiator: Instantiator) -> Self {
        Self { instantiator }
    }
}

impl AdapterFactory for ReflectiveFactory {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        let Some(Def::Struct(ops)) = descriptor.def() else {
            return Ok(None);
        };
        let fields = (ops.fields)()
            .into_iter()
            .map(|def| -> Result<BoundField> {
                let field_type = (def.descriptor)()?;
                Ok(BoundField {
                    def,
                    adapter: resolver.resolve(&field_type)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        trace!(%descriptor, fields = fields.len(), "bound struct fields");
        Ok(Some(Arc::new(ReflectiveAdapter {
            type_name: descriptor.rust_name().unwrap_or("a struct"),
            descriptor: descriptor.clone(),
            instantiator: self.instantiator.clone(),
            fields,
        })))
    }
}

struct BoundField {
    def: FieldDef,
    adapter: Arc<dyn ErasedAdapter>,
}

struct ReflectiveAdapter {
    type_name: &'static str,
    descriptor: TypeDescriptor,
    instantiator: Instantiator,
    fields: Vec<BoundField>,
}

impl ErasedAdapter for ReflectiveAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        if reader.consume_null()? {
            return Ok(None);
        }
        let mut instance = self.instantiator.new_instance(&self.descriptor)?;
        reader.begin_object()?;
        while reader.has_next()? {
            let name = reader.next_name()?;
            let Some(field) = self.fields.iter().find(|field| field.def.name == name) else {
                trace!(%name, descriptor = %self.descriptor, "skipping unknown member");
                reader.skip_value()?;
                continue;
            };
            if let Some(value) = field.adapter.read_erased(reader)? {
                (field.def.set)(&mut *instance, value)?;
            }
        }
        reader.end_object()?;
        Ok(Some(instance))
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
        writer.begin_object()?;
        for field in &self.fields {
            let member = (field.def.get)(value)
                .ok_or_else(|| TypeMismatch::new(self.type_name, value.type_name()))?;
            writer.name(field.def.name)?;
            field.adapter.write_erased(writer, Some(member))?;
        }
        writer.end_object()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
