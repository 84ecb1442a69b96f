//! Operations that let generic adapters build and inspect values.
//!
//! Every operation works on type-erased values and reports a
//! [`TypeMismatch`] when handed a value of the wrong concrete type.

use crate::{CaptureError, EntryError, Reflect, Reflected, TypeDescriptor, TypeMismatch};

/// Per-type construction hooks plus a structural definition.
#[derive(Clone, Copy)]
pub struct TypeOps {
    /// Structural definition.
    pub def: Def,
    /// Zero-valued instance without running a constructor.
    pub blank: fn() -> Option<Box<dyn Reflected>>,
    /// Instance from the parameterless constructor.
    pub construct: fn() -> Option<Box<dyn Reflected>>,
}

impl TypeOps {
    /// Operations for `T` with the given definition.
    pub fn of<T: Reflect + Send + Sync>(def: Def) -> Self {
        TypeOps {
            def,
            blank: blank_of::<T>,
            construct: construct_of::<T>,
        }
    }
}

fn blank_of<T: Reflect + Send + Sync>() -> Option<Box<dyn Reflected>> {
    T::blank().map(|value| Box::new(value) as Box<dyn Reflected>)
}

fn construct_of<T: Reflect + Send + Sync>() -> Option<Box<dyn Reflected>> {
    T::construct().map(|value| Box::new(value) as Box<dyn Reflected>)
}

/// What kind of value a type holds.
#[derive(Clone, Copy)]
pub enum Def {
    /// A leaf value handled by a dedicated adapter.
    Scalar,
    /// A sequence.
    List(ListOps),
    /// String-keyed entries.
    Map(MapOps),
    /// An optional value.
    Option(OptionOps),
    /// A shared pointer to a value.
    Pointer(PointerOps),
    /// Named fields.
    Struct(StructOps),
    /// Anything else; only explicitly registered adapters apply.
    Opaque,
}

/// Sequence operations. Elements are collected into a builder value
/// which [`ListOps::finish`] converts into the final container.
#[derive(Clone, Copy)]
pub struct ListOps {
    /// Element type.
    pub element: fn() -> Result<TypeDescriptor, CaptureError>,
    /// An empty builder.
    pub new: fn() -> Box<dyn Reflected>,
    /// Append to a builder.
    pub push: fn(&mut dyn Reflected, Box<dyn Reflected>) -> Result<(), TypeMismatch>,
    /// Turn a builder into the container.
    pub finish: fn(Box<dyn Reflected>) -> Result<Box<dyn Reflected>, TypeMismatch>,
    /// The elements of a container, or `None` on a type mismatch.
    pub items: fn(&dyn Reflected) -> Option<Vec<&dyn Reflected>>,
}

/// Map operations. Keys travel as member names.
#[derive(Clone, Copy)]
pub struct MapOps {
    /// Key type.
    pub key: fn() -> Result<TypeDescriptor, CaptureError>,
    /// Value type.
    pub value: fn() -> Result<TypeDescriptor, CaptureError>,
    /// An empty map.
    pub new: fn() -> Box<dyn Reflected>,
    /// Insert an entry, replacing any previous value for the key.
    pub insert: fn(&mut dyn Reflected, &str, Box<dyn Reflected>) -> Result<(), EntryError>,
    /// The entries of a map, or `None` on a type mismatch.
    pub entries: fn(&dyn Reflected) -> Option<Vec<(String, &dyn Reflected)>>,
}

/// Optional value operations.
#[derive(Clone, Copy)]
pub struct OptionOps {
    /// Inner type.
    pub inner: fn() -> Result<TypeDescriptor, CaptureError>,
    /// The empty option.
    pub none: fn() -> Box<dyn Reflected>,
    /// Wrap a present value.
    pub some: fn(Box<dyn Reflected>) -> Result<Box<dyn Reflected>, TypeMismatch>,
    /// `Some(Some(v))` when present, `Some(None)` when empty, `None` on a
    /// type mismatch.
    pub get: for<'a> fn(&'a dyn Reflected) -> Option<Option<&'a dyn Reflected>>,
}

/// Shared pointer operations.
#[derive(Clone, Copy)]
pub struct PointerOps {
    /// Pointee type.
    pub inner: fn() -> Result<TypeDescriptor, CaptureError>,
    /// Wrap a value.
    pub wrap: fn(Box<dyn Reflected>) -> Result<Box<dyn Reflected>, TypeMismatch>,
    /// Borrow the pointee, or `None` on a type mismatch.
    pub get: fn(&dyn Reflected) -> Option<&dyn Reflected>,
}

/// Struct operations.
#[derive(Clone, Copy)]
pub struct StructOps {
    /// The fields in declaration order.
    pub fields: fn() -> Vec<FieldDef>,
}

/// One named field of a struct.
#[derive(Clone, Copy)]
pub struct FieldDef {
    /// Member name.
    pub name: &'static str,
    /// Declared field type.
    pub descriptor: fn() -> Result<TypeDescriptor, CaptureError>,
    /// Borrow the field, or `None` on a type mismatch.
    pub get: fn(&dyn Reflected) -> Option<&dyn Reflected>,
    /// Overwrite the field.
    pub set: fn(&mut dyn Reflected, Box<dyn Reflected>) -> Result<(), TypeMismatch>,
}

impl core::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Types usable as map keys: they round-trip through member names.
pub trait MapKey: Sized {
    /// Parse a member name.
    fn from_key(key: &str) -> Option<Self>;

    /// Render as a member name.
    fn to_key(&self) -> String;
}

impl MapKey for String {
    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_owned())
    }

    fn to_key(&self) -> String {
        self.clone()
    }
}

impl MapKey for bool {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn to_key(&self) -> String {
        self.to_string()
    }
}

impl MapKey for char {
    fn from_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let c = chars.next()?;
        chars.next().is_none().then_some(c)
    }

    fn to_key(&self) -> String {
        self.to_string()
    }
}

macro_rules! integer_keys {
    ($($ty:ty),*) => {
        $(
            impl MapKey for $ty {
                fn from_key(key: &str) -> Option<Self> {
                    use lexical_parse_integer::FromLexical as _;
                    <$ty>::from_lexical(key.as_bytes()).ok()
                }

                fn to_key(&self) -> String {
                    itoa::Buffer::new().format(*self).to_owned()
                }
            }
        )*
    };
}

integer_keys!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
