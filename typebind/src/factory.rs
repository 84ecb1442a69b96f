//! The extension point: factories that may produce an adapter for a type.

use std::sync::Arc;

use typebind_core::{RawType, TypeDescriptor};

use crate::{ErasedAdapter, Resolver, Result, trace};

/// Produces adapters for the types it understands.
///
/// Returning `Ok(None)` declines the type and lets the next factory in the
/// chain try; it is not an error. Errors are reserved for types the factory
/// accepts but cannot build an adapter for, such as a struct whose field
/// type is unsupported.
pub trait AdapterFactory: Send + Sync + 'static {
    /// An adapter for `descriptor`, or `None` to decline.
    ///
    /// Adapters of related types come from `resolver`: resolve them here to
    /// bind them once, or keep [`Resolver::registry`] to look them up per
    /// call.
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>>;
}

/// Matches exactly one type.
pub struct ExactFactory {
    descriptor: TypeDescriptor,
    adapter: Arc<dyn ErasedAdapter>,
}

impl ExactFactory {
    /// Use `adapter` for `descriptor` and nothing else.
    pub fn new(descriptor: TypeDescriptor, adapter: Arc<dyn ErasedAdapter>) -> Self {
        Self {
            descriptor,
            adapter,
        }
    }
}

impl AdapterFactory for ExactFactory {
    fn create(
        &self,
        _resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        Ok((*descriptor == self.descriptor).then(|| Arc::clone(&self.adapter)))
    }
}

/// Matches a raw type and all of its declared subtypes, whatever their
/// type arguments.
pub struct HierarchyFactory {
    raw: &'static RawType,
    adapter: Arc<dyn ErasedAdapter>,
}

impl HierarchyFactory {
    /// Use `adapter` for every type whose raw type is a subtype of `raw`.
    pub fn new(raw: &'static RawType, adapter: Arc<dyn ErasedAdapter>) -> Self {
        Self { raw, adapter }
    }
}

impl AdapterFactory for HierarchyFactory {
    fn create(
        &self,
        _resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        if !descriptor.raw_type().is_subtype_of(self.raw) {
            return Ok(None);
        }
        trace!(%descriptor, hierarchy = self.raw.name, "hierarchy adapter applies");
        Ok(Some(Arc::clone(&self.adapter)))
    }
}
