//! Producing fresh instances for decoding.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{CaptureError, Reflect, Reflected, TypeCategory, TypeDescriptor, debug, trace};

/// Why an instance could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiationError {
    /// What kind of type it was.
    pub kind: InstantiationErrorKind,
    /// The type.
    pub type_name: String,
}

/// Kinds of [`InstantiationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiationErrorKind {
    /// Interfaces have no instances of their own.
    Interface,
    /// Abstract types have no instances of their own.
    Abstract,
    /// A concrete type with neither a constructor nor a zero value.
    NoZeroValue,
    /// The descriptor carries no operations, so nothing is known about
    /// how to build the type.
    Unreified,
}

impl fmt::Display for InstantiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InstantiationErrorKind::Interface => write!(
                f,
                "cannot instantiate interface type `{}`; register an instance creator or adapter for it",
                self.type_name
            ),
            InstantiationErrorKind::Abstract => write!(
                f,
                "cannot instantiate abstract type `{}`; register an instance creator or adapter for it",
                self.type_name
            ),
            InstantiationErrorKind::NoZeroValue => write!(
                f,
                "type `{}` has neither a parameterless constructor nor a zero value",
                self.type_name
            ),
            InstantiationErrorKind::Unreified => write!(
                f,
                "type `{}` was described by hand and carries no construction operations",
                self.type_name
            ),
        }
    }
}

impl core::error::Error for InstantiationError {}

type Creator = Arc<dyn Fn() -> Box<dyn Reflected> + Send + Sync>;

/// Produces new instances of reflected types.
///
/// In order of preference: a creator registered for the exact type, the
/// type's parameterless constructor ([`Reflect::construct`]), and finally
/// a blank instance with every field at its zero value
/// ([`Reflect::blank`]). Interface and abstract types are refused before
/// any of the built-in paths is tried.
#[derive(Clone, Default)]
pub struct Instantiator {
    creators: HashMap<TypeDescriptor, Creator>,
}

impl Instantiator {
    /// An instantiator with no registered creators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `creator` for every instance of `T`.
    pub fn register<T, F>(&mut self, creator: F) -> Result<&mut Self, CaptureError>
    where
        T: Reflect + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let descriptor = TypeDescriptor::of::<T>()?;
        self.creators.insert(
            descriptor,
            Arc::new(move || Box::new(creator()) as Box<dyn Reflected>),
        );
        Ok(self)
    }

    /// Use `creator` for every instance of `descriptor`. The creator may
    /// return any implementation, which is how interface types get
    /// instances.
    pub fn register_dyn(
        &mut self,
        descriptor: TypeDescriptor,
        creator: impl Fn() -> Box<dyn Reflected> + Send + Sync + 'static,
    ) -> &mut Self {
        self.creators.insert(descriptor, Arc::new(creator));
        self
    }

    /// A new instance of `descriptor`.
    pub fn new_instance(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Box<dyn Reflected>, InstantiationError> {
        if let Some(creator) = self.creators.get(descriptor) {
            trace!(%descriptor, "instantiating with registered creator");
            return Ok(creator());
        }

        let error = |kind| InstantiationError {
            kind,
            type_name: descriptor.to_string(),
        };

        match descriptor.category() {
            TypeCategory::Interface => return Err(error(InstantiationErrorKind::Interface)),
            TypeCategory::Abstract => return Err(error(InstantiationErrorKind::Abstract)),
            TypeCategory::Concrete => {}
        }

        let ops = descriptor
            .ops()
            .ok_or_else(|| error(InstantiationErrorKind::Unreified))?;

        if let Some(instance) = (ops.construct)() {
            trace!(%descriptor, "instantiating with parameterless constructor");
            return Ok(instance);
        }
        if let Some(instance) = (ops.blank)() {
            debug!(%descriptor, "instantiating blank instance without a constructor");
            return Ok(instance);
        }
        Err(error(InstantiationErrorKind::NoZeroValue))
    }
}

impl fmt::Debug for Instantiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instantiator")
            .field("creators", &self.creators.keys().collect::<Vec<_>>())
            .finish()
    }
}
