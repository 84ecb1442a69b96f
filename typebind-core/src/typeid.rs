//! A `TypeId` that can be stored in `static` items.

use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// [`TypeId`] equivalent usable in const contexts.
///
/// Holds the monomorphized `TypeId::of::<T>` function and calls it on
/// demand, which lets [`crate::RawType`] declarations live in statics.
#[derive(Copy, Clone)]
pub struct ConstTypeId {
    type_id_fn: fn() -> TypeId,
}

impl ConstTypeId {
    /// The id of `T`.
    #[must_use]
    pub const fn of<T: ?Sized + 'static>() -> Self {
        ConstTypeId {
            type_id_fn: TypeId::of::<T>,
        }
    }

    /// The underlying [`TypeId`].
    #[inline]
    pub fn get(self) -> TypeId {
        (self.type_id_fn)()
    }
}

impl fmt::Debug for ConstTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl PartialEq for ConstTypeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl PartialEq<TypeId> for ConstTypeId {
    #[inline]
    fn eq(&self, other: &TypeId) -> bool {
        self.get() == *other
    }
}

impl Eq for ConstTypeId {}

impl Hash for ConstTypeId {
    // function pointers are not unique per type across codegen units, so
    // hash the id itself
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}
