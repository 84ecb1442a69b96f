//! Adapter resolution: the factory chain and its cache.

use core::cell::RefCell;
use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;
use typebind_core::{Reflected, TypeDescriptor};
use typebind_format::{TokenReader, TokenWriter};

use crate::{AdapterFactory, ErasedAdapter, Error, Result, UnsupportedType, debug, trace};

type AdapterMap = HashMap<TypeDescriptor, Arc<dyn ErasedAdapter>>;

struct Shared {
    factories: Vec<Arc<dyn AdapterFactory>>,
    cache: RwLock<AdapterMap>,
}

/// An ordered chain of [`AdapterFactory`]s plus a cache of the adapters
/// they produced.
///
/// The first factory that accepts a type wins. Every type is resolved at
/// most once per registry as far as callers can observe: concurrent
/// resolutions of the same type may both run, but the first to finish is
/// the one every caller gets from then on.
///
/// Cloning is cheap and shares the cache.
#[derive(Clone)]
pub struct AdapterRegistry {
    shared: Arc<Shared>,
}

impl AdapterRegistry {
    /// A registry querying `factories` in order.
    pub fn new(factories: Vec<Arc<dyn AdapterFactory>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                factories,
                cache: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The factory chain.
    pub fn factories(&self) -> &[Arc<dyn AdapterFactory>] {
        &self.shared.factories
    }

    /// The adapter for `descriptor`, created on first use.
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Result<Arc<dyn ErasedAdapter>> {
        resolve_shared(&self.shared, descriptor)
    }

    /// The adapter the factories after `skip_past` would produce for
    /// `descriptor`. If `skip_past` is not part of the chain the search
    /// starts at the beginning. The result is not cached.
    pub fn resolve_skipping(
        &self,
        skip_past: &dyn AdapterFactory,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<dyn ErasedAdapter>> {
        let resolver = Resolver::new(&self.shared);
        let adapter = resolver.delegate_adapter(skip_past, descriptor)?;
        resolver.publish(descriptor);
        Ok(adapter)
    }

    /// The cached adapter for `descriptor`, without resolving.
    pub fn cached(&self, descriptor: &TypeDescriptor) -> Option<Arc<dyn ErasedAdapter>> {
        self.shared.cache.read().get(descriptor).cloned()
    }

    /// A handle for looking adapters up later without keeping the registry
    /// alive.
    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle(Arc::downgrade(&self.shared))
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("factories", &self.shared.factories.len())
            .field("cached", &self.shared.cache.read().len())
            .finish()
    }
}

fn resolve_shared(
    shared: &Arc<Shared>,
    descriptor: &TypeDescriptor,
) -> Result<Arc<dyn ErasedAdapter>> {
    if let Some(hit) = shared.cache.read().get(descriptor) {
        return Ok(Arc::clone(hit));
    }
    debug!(%descriptor, "adapter cache miss");
    let resolver = Resolver::new(shared);
    let adapter = resolver.resolve(descriptor)?;
    Ok(resolver.publish(descriptor).unwrap_or(adapter))
}

/// Weak access to a registry, for adapters that pick their delegate per
/// call from a value's runtime type.
#[derive(Clone)]
pub struct RegistryHandle(Weak<Shared>);

impl RegistryHandle {
    /// Resolve through the registry.
    ///
    /// Fails with [`Error::RegistryDropped`] once the registry is gone.
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Result<Arc<dyn ErasedAdapter>> {
        let shared = self.0.upgrade().ok_or(Error::RegistryDropped)?;
        resolve_shared(&shared, descriptor)
    }

    /// The registry, if it is still alive.
    pub fn registry(&self) -> Option<AdapterRegistry> {
        self.0.upgrade().map(|shared| AdapterRegistry { shared })
    }
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RegistryHandle")
    }
}

/// The lookup capability handed to factories during one resolution.
///
/// Adapters resolved here stay private to the resolution until the
/// outermost request completes; only then are they published to the
/// registry's cache. A type that is requested again while its own adapter
/// is still being built (a recursive type) gets a placeholder that forwards
/// to the published adapter.
pub struct Resolver<'r> {
    shared: &'r Arc<Shared>,
    pending: RefCell<AdapterMap>,
    resolved: RefCell<AdapterMap>,
}

impl<'r> Resolver<'r> {
    fn new(shared: &'r Arc<Shared>) -> Self {
        Self {
            shared,
            pending: RefCell::new(HashMap::new()),
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// The adapter for `descriptor`, bound now.
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Result<Arc<dyn ErasedAdapter>> {
        if let Some(hit) = self.shared.cache.read().get(descriptor) {
            return Ok(Arc::clone(hit));
        }
        if let Some(hit) = self.resolved.borrow().get(descriptor) {
            return Ok(Arc::clone(hit));
        }
        if let Some(future) = self.pending.borrow().get(descriptor) {
            trace!(%descriptor, "recursive type, handing out a future adapter");
            return Ok(Arc::clone(future));
        }

        let future: Arc<dyn ErasedAdapter> = Arc::new(FutureAdapter {
            descriptor: descriptor.clone(),
            shared: Arc::downgrade(self.shared),
            target: OnceLock::new(),
        });
        self.pending.borrow_mut().insert(descriptor.clone(), future);
        let outcome = self.search(None, descriptor);
        self.pending.borrow_mut().remove(descriptor);

        let adapter = outcome?;
        self.resolved
            .borrow_mut()
            .insert(descriptor.clone(), Arc::clone(&adapter));
        Ok(adapter)
    }

    /// The adapter the factories after `skip_past` would produce, for
    /// factories that wrap whatever else handles a type. Not cached.
    pub fn delegate_adapter(
        &self,
        skip_past: &dyn AdapterFactory,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<dyn ErasedAdapter>> {
        trace!(%descriptor, "resolving delegate adapter");
        self.search(Some(skip_past), descriptor)
    }

    /// A handle for per-call lookups.
    pub fn registry(&self) -> RegistryHandle {
        RegistryHandle(Arc::downgrade(self.shared))
    }

    fn search(
        &self,
        skip_past: Option<&dyn AdapterFactory>,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<dyn ErasedAdapter>> {
        let factories = &self.shared.factories;
        let start = skip_past
            .and_then(|skip| {
                let skip = core::ptr::from_ref(skip).cast::<()>();
                factories
                    .iter()
                    .position(|factory| Arc::as_ptr(factory).cast::<()>() == skip)
            })
            .map_or(0, |index| index + 1);

        for factory in factories.iter().skip(start) {
            let Some(adapter) = factory.create(self, descriptor)? else {
                trace!(%descriptor, "factory declined");
                continue;
            };
            trace!(%descriptor, "factory matched");
            return Ok(adapter);
        }
        Err(UnsupportedType {
            descriptor: descriptor.clone(),
        }
        .into())
    }

    /// Move everything resolved into the registry's cache. Entries other
    /// threads published first are kept. Returns the cached adapter for
    /// `requested`.
    fn publish(self, requested: &TypeDescriptor) -> Option<Arc<dyn ErasedAdapter>> {
        let resolved = self.resolved.into_inner();
        if resolved.is_empty() {
            return None;
        }
        let mut cache = self.shared.cache.write();
        debug!(count = resolved.len(), "publishing resolved adapters");
        let mut winner = None;
        for (descriptor, adapter) in resolved {
            let is_requested = descriptor == *requested;
            let published = cache.entry(descriptor).or_insert(adapter);
            if is_requested {
                winner = Some(Arc::clone(published));
            }
        }
        winner
    }
}

/// Stands in for an adapter that is still being built. Forwards to the
/// cached adapter once the resolution that created it has published.
struct FutureAdapter {
    descriptor: TypeDescriptor,
    shared: Weak<Shared>,
    target: OnceLock<Weak<dyn ErasedAdapter>>,
}

impl FutureAdapter {
    fn target(&self) -> Result<Arc<dyn ErasedAdapter>> {
        if let Some(target) = self.target.get() {
            return target.upgrade().ok_or(Error::RegistryDropped);
        }
        let shared = self.shared.upgrade().ok_or(Error::RegistryDropped)?;
        let adapter = shared
            .cache
            .read()
            .get(&self.descriptor)
            .cloned()
            .ok_or_else(|| Error::Unbound {
                descriptor: self.descriptor.clone(),
            })?;
        // cache entries are never replaced, so any racing set stores the same target
        let _ = self.target.set(Arc::downgrade(&adapter));
        Ok(adapter)
    }
}

impl ErasedAdapter for FutureAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        self.target()?.read_erased(reader)
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        self.target()?.write_erased(writer, value)
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }
}
