//! The configured front door: an adapter registry plus output settings.

use core::fmt;
use std::io;
use std::sync::Arc;

use typebind_core::{Instantiator, RawType, Reflect, Reflected, TypeDescriptor, Value};
use typebind_format::{StreamError, SyntaxError, TokenKind, TokenReader, TokenWriter};
use typebind_json::{JsonReader, JsonWriter};

use crate::builtins::builtin_factories;
use crate::{
    AdapterFactory, AdapterRegistry, ErasedAdapter, ExactFactory, HierarchyFactory, NumberPolicy,
    Result, ToNumberStrategy, TreeReader, TreeWriter, TypeAdapter, TypedAdapter, debug, erase,
};

/// Converts values to and from JSON.
///
/// Built with [`Engine::builder`]; [`Engine::new`] gives the defaults:
/// [`NumberPolicy::Double`], compact output and `null` members omitted.
/// Engines are cheap to clone and safe to share between threads; clones
/// share one adapter cache.
#[derive(Clone)]
pub struct Engine {
    registry: AdapterRegistry,
    instantiator: Instantiator,
    numbers: Arc<dyn ToNumberStrategy>,
    indent: Option<String>,
    serialize_nulls: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The adapter registry.
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// The instantiator used for reflected structs.
    pub fn instantiator(&self) -> &Instantiator {
        &self.instantiator
    }

    /// The active number strategy.
    pub fn number_strategy(&self) -> &Arc<dyn ToNumberStrategy> {
        &self.numbers
    }

    /// The adapter for `T`.
    pub fn adapter<T: Reflect + Send + Sync>(&self) -> Result<TypedAdapter<T>> {
        let descriptor = TypeDescriptor::of::<T>()?;
        Ok(TypedAdapter::new(self.registry.resolve(&descriptor)?))
    }

    /// The adapter for `descriptor`.
    pub fn adapter_for(&self, descriptor: &TypeDescriptor) -> Result<Arc<dyn ErasedAdapter>> {
        self.registry.resolve(descriptor)
    }

    /// A JSON writer with this engine's output settings.
    pub fn json_writer<W: io::Write>(&self, out: W) -> JsonWriter<W> {
        let writer = JsonWriter::new(out).serialize_nulls(self.serialize_nulls);
        match &self.indent {
            Some(indent) => writer.pretty(indent.clone()),
            None => writer,
        }
    }

    /// Write `value` with the adapter for its declared type `T`.
    pub fn write<T: Reflect + Send + Sync>(
        &self,
        value: Option<&T>,
        writer: &mut dyn TokenWriter,
    ) -> Result<()> {
        self.adapter::<T>()?.write(writer, value)
    }

    /// JSON text for `value`.
    pub fn to_json<T: Reflect + Send + Sync>(&self, value: &T) -> Result<String> {
        utf8(self.to_writer(value, Vec::new())?)
    }

    /// JSON text for `value`, chosen by its runtime type.
    pub fn to_json_dyn(&self, value: &dyn Reflected) -> Result<String> {
        let adapter = self.adapter_for(&value.runtime_type()?)?;
        let mut writer = self.json_writer(Vec::new());
        adapter.write_erased(&mut writer, Some(value))?;
        utf8(writer.finish()?)
    }

    /// Write `value` as JSON into `out` and hand `out` back.
    pub fn to_writer<T: Reflect + Send + Sync, W: io::Write>(
        &self,
        value: &T,
        out: W,
    ) -> Result<W> {
        let mut writer = self.json_writer(out);
        self.write(Some(value), &mut writer)?;
        Ok(writer.finish()?)
    }

    /// Read a `T` from `reader`.
    ///
    /// A `null` is only accepted when the adapter maps it to a value, as
    /// the one for `Option` does.
    pub fn read<T: Reflect + Send + Sync>(&self, reader: &mut dyn TokenReader) -> Result<T> {
        let value = self.read_as(reader, &TypeDescriptor::of::<T>()?)?;
        Ok(T::from_instance(value)?)
    }

    /// Read a value of the type `descriptor` describes.
    pub fn read_as(
        &self,
        reader: &mut dyn TokenReader,
        descriptor: &TypeDescriptor,
    ) -> Result<Box<dyn Reflected>> {
        let adapter = self.adapter_for(descriptor)?;
        match adapter.read_erased(reader)? {
            Some(value) => Ok(value),
            None => Err(SyntaxError::new(
                format!("a value of type {descriptor}"),
                TokenKind::Null,
                reader.path(),
            )
            .into()),
        }
    }

    /// Parse a complete JSON document as a `T`.
    pub fn from_json<T: Reflect + Send + Sync>(&self, json: &str) -> Result<T> {
        let mut reader = JsonReader::new(json);
        let value = self.read(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    /// Parse a complete UTF-8 JSON document as a `T`.
    pub fn from_slice<T: Reflect + Send + Sync>(&self, json: &[u8]) -> Result<T> {
        let mut reader = JsonReader::from_slice(json)?;
        let value = self.read(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    /// Parse a complete JSON document as the type `descriptor` describes.
    pub fn from_json_as(
        &self,
        json: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<Box<dyn Reflected>> {
        let mut reader = JsonReader::new(json);
        let value = self.read_as(&mut reader, descriptor)?;
        reader.finish()?;
        Ok(value)
    }

    /// Convert `value` into a [`Value`] tree.
    pub fn to_value<T: Reflect + Send + Sync>(&self, value: &T) -> Result<Value> {
        let mut writer = TreeWriter::new().serialize_nulls(self.serialize_nulls);
        self.write(Some(value), &mut writer)?;
        Ok(writer.finish()?)
    }

    /// Convert a [`Value`] tree into a `T`.
    pub fn from_value<T: Reflect + Send + Sync>(&self, value: Value) -> Result<T> {
        self.read(&mut TreeReader::new(value))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("pretty", &self.indent.is_some())
            .field("serialize_nulls", &self.serialize_nulls)
            .finish_non_exhaustive()
    }
}

pub(crate) fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| StreamError::Io(io::Error::new(io::ErrorKind::InvalidData, e)).into())
}

/// Configures an [`Engine`].
///
/// Factories are queried in this order: exact adapters and factories in
/// registration order, then hierarchy adapters, then the built-in chain.
pub struct EngineBuilder {
    factories: Vec<Arc<dyn AdapterFactory>>,
    hierarchy: Vec<Arc<dyn AdapterFactory>>,
    numbers: Arc<dyn ToNumberStrategy>,
    instantiator: Instantiator,
    indent: Option<String>,
    serialize_nulls: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            factories: Vec::new(),
            hierarchy: Vec::new(),
            numbers: Arc::new(NumberPolicy::default()),
            instantiator: Instantiator::new(),
            indent: None,
            serialize_nulls: false,
        }
    }
}

impl EngineBuilder {
    /// Use one of the built-in number policies.
    pub fn number_policy(mut self, policy: NumberPolicy) -> Self {
        debug!(?policy, "number policy selected");
        self.numbers = Arc::new(policy);
        self
    }

    /// Use a custom number strategy.
    pub fn number_strategy(mut self, strategy: Arc<dyn ToNumberStrategy>) -> Self {
        self.numbers = strategy;
        self
    }

    /// Add a factory ahead of the built-in ones.
    pub fn register_factory(mut self, factory: impl AdapterFactory) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Use `adapter` for exactly its value type.
    pub fn register_adapter<A: TypeAdapter>(self, adapter: A) -> Result<Self> {
        let descriptor = TypeDescriptor::of::<A::Value>()?;
        Ok(self.register_adapter_for(descriptor, erase(adapter)))
    }

    /// Use `adapter` for exactly `descriptor`.
    pub fn register_adapter_for(
        mut self,
        descriptor: TypeDescriptor,
        adapter: Arc<dyn ErasedAdapter>,
    ) -> Self {
        self.factories.push(Arc::new(ExactFactory::new(descriptor, adapter)));
        self
    }

    /// Use `adapter` for `raw` and every declared subtype of it.
    pub fn register_hierarchy_adapter(
        mut self,
        raw: &'static RawType,
        adapter: Arc<dyn ErasedAdapter>,
    ) -> Self {
        self.hierarchy
            .push(Arc::new(HierarchyFactory::new(raw, adapter)));
        self
    }

    /// Create every decoded `T` with `creator` instead of its constructor
    /// or zero value.
    pub fn register_instance_creator<T, F>(mut self, creator: F) -> Result<Self>
    where
        T: Reflect + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.instantiator.register(creator)?;
        Ok(self)
    }

    /// Create instances of `descriptor` with `creator`, which may return
    /// any implementation. This is how interface types get instances.
    pub fn register_dyn_instance_creator(
        mut self,
        descriptor: TypeDescriptor,
        creator: impl Fn() -> Box<dyn Reflected> + Send + Sync + 'static,
    ) -> Self {
        self.instantiator.register_dyn(descriptor, creator);
        self
    }

    /// Indent output by two spaces per level.
    pub fn pretty_printing(mut self) -> Self {
        self.indent = Some("  ".to_owned());
        self
    }

    /// Keep object members whose value is `null`.
    pub fn serialize_nulls(mut self, yes: bool) -> Self {
        self.serialize_nulls = yes;
        self
    }

    /// Finish configuration.
    pub fn build(self) -> Engine {
        let mut factories = self.factories;
        factories.extend(self.hierarchy);
        factories.extend(builtin_factories(
            Arc::clone(&self.numbers),
            self.instantiator.clone(),
        ));
        debug!(factories = factories.len(), "built engine");
        Engine {
            registry: AdapterRegistry::new(factories),
            instantiator: self.instantiator,
            numbers: self.numbers,
            indent: self.indent,
            serialize_nulls: self.serialize_nulls,
        }
    }
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("factories", &self.factories.len())
            .field("hierarchy", &self.hierarchy.len())
            .field("pretty", &self.indent.is_some())
            .field("serialize_nulls", &self.serialize_nulls)
            .finish_non_exhaustive()
    }
}
