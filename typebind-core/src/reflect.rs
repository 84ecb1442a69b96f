use core::any::{Any, type_name};
use core::fmt;

use crate::{CaptureError, TypeDescriptor, TypeMismatch, TypeOps, TypeShape};

/// Types that can describe themselves at runtime.
///
/// Implementations forward their type arguments' shapes, so that
/// `Vec<Option<String>>` describes itself completely. Implemented for the
/// standard scalars, strings and containers; structs use
/// [`crate::reflect_struct!`].
pub trait Reflect: Any {
    /// The structure of this type.
    fn type_shape() -> TypeShape;

    /// Operations generic adapters use to build and inspect values.
    fn type_ops() -> Option<TypeOps> {
        None
    }

    /// An instance with every field at its zero value, without running
    /// any constructor.
    fn blank() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    /// An instance built by the type's parameterless constructor,
    /// typically [`Default`].
    fn construct() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    /// Recover a typed value from a type-erased one.
    fn from_instance(instance: Box<dyn Reflected>) -> Result<Self, TypeMismatch>
    where
        Self: Sized,
    {
        // the box itself is `Reflected` too, so name the boxed value
        let found = (*instance).type_name();
        instance
            .into_any()
            .downcast::<Self>()
            .map(|boxed| *boxed)
            .map_err(|_| TypeMismatch::new(type_name::<Self>(), found))
    }

    /// View this value as the instance adapters should see.
    ///
    /// Dynamic slots override this to expose the value they hold.
    fn as_instance(&self) -> &dyn Reflected
    where
        Self: Sized + Send + Sync,
    {
        self
    }
}

/// Object-safe view of a [`Reflect`] value.
pub trait Reflected: Any + Send + Sync + 'static {
    /// The descriptor of the concrete type of this value.
    fn runtime_type(&self) -> Result<TypeDescriptor, CaptureError>;

    /// The Rust type name of this value.
    fn type_name(&self) -> &'static str;

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcast for downcasting by value.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Reflect + Send + Sync> Reflected for T {
    fn runtime_type(&self) -> Result<TypeDescriptor, CaptureError> {
        TypeDescriptor::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn Reflected {
    /// Borrow as `T` if that is the concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Whether the concrete type is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Debug for dyn Reflected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name())
    }
}

/// The universal top type.
///
/// A bare `Object` carries no data. Slots that may hold any value are
/// declared as `Box<dyn Reflected>`, which also describes itself as the
/// top type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Object;
