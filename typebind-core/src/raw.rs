//! Raw (unparameterized) types and the built-in declarations.
//!
//! A [`RawType`] is the runtime counterpart of a type constructor: `Vec`
//! with one parameter, `String` with none. Raw types form a small subtype
//! lattice through [`RawType::supertypes`], topped by [`OBJECT`].

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::ConstTypeId;
use crate::reflect::Object;

/// How a raw type may be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// Has values of its own.
    Concrete,
    /// A trait object: values only exist as implementors.
    Interface,
    /// Declared but never directly constructible.
    Abstract,
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeCategory::Concrete => "concrete",
            TypeCategory::Interface => "interface",
            TypeCategory::Abstract => "abstract",
        })
    }
}

/// A type constructor known at runtime.
///
/// Declared as a `static` so that references are stable:
///
/// ```
/// use typebind_core::{RawType, raw};
///
/// pub struct Meters(f64);
/// static METERS: RawType = RawType::concrete::<Meters>("Meters").with_supertypes(&[&raw::NUMBER]);
/// assert!(METERS.is_subtype_of(&raw::NUMBER));
/// ```
pub struct RawType {
    /// Identity.
    pub id: ConstTypeId,
    /// Display name.
    pub name: &'static str,
    /// Whether values can be created directly.
    pub category: TypeCategory,
    /// Names of the type parameters, in order.
    pub type_params: &'static [&'static str],
    /// Direct supertypes. [`OBJECT`] is implied.
    pub supertypes: &'static [&'static RawType],
}

impl RawType {
    /// A raw type of the given category.
    pub const fn new<T: ?Sized + 'static>(name: &'static str, category: TypeCategory) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            name,
            category,
            type_params: &[],
            supertypes: &[],
        }
    }

    /// A concrete, non-generic type.
    pub const fn concrete<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new::<T>(name, TypeCategory::Concrete)
    }

    /// An interface (trait object) type.
    pub const fn interface<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new::<T>(name, TypeCategory::Interface)
    }

    /// A concrete generic type. `T` is any type unique to this constructor,
    /// usually the constructor applied to [`Param`].
    pub const fn generic<T: ?Sized + 'static>(
        name: &'static str,
        type_params: &'static [&'static str],
    ) -> Self {
        Self {
            type_params,
            ..Self::concrete::<T>(name)
        }
    }

    /// Declare direct supertypes.
    pub const fn with_supertypes(self, supertypes: &'static [&'static RawType]) -> Self {
        Self { supertypes, ..self }
    }

    /// Whether this is the universal top type.
    pub fn is_object(&self) -> bool {
        self == &OBJECT
    }

    /// Reflexive, transitive subtyping. Everything is a subtype of [`OBJECT`].
    pub fn is_subtype_of(&self, other: &RawType) -> bool {
        if self == other || other.is_object() {
            return true;
        }
        self.supertypes.iter().any(|sup| sup.is_subtype_of(other))
    }
}

impl PartialEq for RawType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RawType {}

impl Hash for RawType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Placeholder argument used to give generic constructors a type identity.
pub enum Param {}

/// The top type: every type is assignable to it.
pub static OBJECT: RawType = RawType::concrete::<Object>("Object");

/// Abstract supertype of every numeric type.
pub static NUMBER: RawType = RawType::concrete::<crate::Number>("Number");

/// Numeric text parsed on demand.
pub static DEFERRED_NUMBER: RawType =
    RawType::concrete::<crate::DeferredNumber>("DeferredNumber").with_supertypes(&[&NUMBER]);

/// The generic tree of decoded values.
pub static VALUE: RawType = RawType::concrete::<crate::Value>("Value");

/// `bool`
pub static BOOL: RawType = RawType::concrete::<bool>("bool");
/// `char`
pub static CHAR: RawType = RawType::concrete::<char>("char");
/// `String`
pub static STRING: RawType = RawType::concrete::<String>("String");

macro_rules! numeric {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($ty), "`")]
            pub static $name: RawType =
                RawType::concrete::<$ty>(stringify!($ty)).with_supertypes(&[&NUMBER]);
        )*
    };
}

numeric! {
    I8 => i8, I16 => i16, I32 => i32, I64 => i64, I128 => i128, ISIZE => isize,
    U8 => u8, U16 => u16, U32 => u32, U64 => u64, U128 => u128, USIZE => usize,
    F32 => f32, F64 => f64,
}

/// `Vec<T>`
pub static VEC: RawType = RawType::generic::<Vec<Param>>("Vec", &["T"]);
/// Fixed arrays, `Box<[T]>`. Array descriptors report this as their raw type.
pub static ARRAY: RawType = RawType::generic::<Box<[Param]>>("Array", &["T"]);
/// `Option<T>`
pub static OPTION: RawType = RawType::generic::<Option<Param>>("Option", &["T"]);
/// `Arc<T>`
pub static ARC: RawType = RawType::generic::<std::sync::Arc<Param>>("Arc", &["T"]);
/// `HashMap<K, V>`
pub static HASH_MAP: RawType =
    RawType::generic::<std::collections::HashMap<Param, Param>>("HashMap", &["K", "V"]);
/// `BTreeMap<K, V>`
pub static BTREE_MAP: RawType =
    RawType::generic::<std::collections::BTreeMap<Param, Param>>("BTreeMap", &["K", "V"]);
/// `IndexMap<K, V>`
pub static INDEX_MAP: RawType =
    RawType::generic::<indexmap::IndexMap<Param, Param>>("IndexMap", &["K", "V"]);

#[cfg(test)]
mod tests {
    use super::*;
    use typebind_testhelpers::test;

    #[test]
    fn subtyping_is_reflexive_and_topped_by_object() {
        assert!(I32.is_subtype_of(&I32));
        assert!(I32.is_subtype_of(&NUMBER));
        assert!(I32.is_subtype_of(&OBJECT));
        assert!(!NUMBER.is_subtype_of(&I32));
        assert!(!STRING.is_subtype_of(&NUMBER));
    }

    #[test]
    fn identity_is_by_type() {
        assert_ne!(VEC, ARRAY);
        assert_eq!(OBJECT, OBJECT);
        assert!(OBJECT.is_object());
    }
}
