use core::fmt;

use crate::raw::{self, RawType};

/// The structure of a type, as built by [`crate::Reflect::type_shape`].
///
/// Shapes are plain data. They become usable lookup keys once validated
/// by [`crate::TypeDescriptor::capture`], which rejects unresolved type
/// variables, missing type arguments and misplaced wildcards.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// A non-generic type, or a generic one used without arguments.
    Raw(&'static RawType),
    /// An array of the element shape.
    Array(Box<TypeShape>),
    /// A generic type applied to arguments.
    Parameterized(&'static RawType, Vec<TypeShape>),
    /// `?` or `? extends Bound`, only valid as a type argument.
    Wildcard(Option<Box<TypeShape>>),
    /// A named type variable that was never bound to a concrete type.
    Variable(&'static str),
}

impl TypeShape {
    /// The unbounded wildcard `?`.
    pub const fn wildcard() -> Self {
        TypeShape::Wildcard(None)
    }

    /// The bounded wildcard `? extends bound`.
    pub fn wildcard_extends(bound: impl Into<TypeShape>) -> Self {
        TypeShape::Wildcard(Some(Box::new(bound.into())))
    }

    /// The raw type erasing this shape: arrays report [`raw::ARRAY`],
    /// wildcards their bound, and variables [`raw::OBJECT`].
    pub fn raw_type(&self) -> &'static RawType {
        match self {
            TypeShape::Raw(raw) | TypeShape::Parameterized(raw, _) => *raw,
            TypeShape::Array(_) => &raw::ARRAY,
            TypeShape::Wildcard(Some(bound)) => bound.raw_type(),
            TypeShape::Wildcard(None) | TypeShape::Variable(_) => &raw::OBJECT,
        }
    }

    /// Type arguments, empty unless parameterized.
    pub fn arguments(&self) -> &[TypeShape] {
        match self {
            TypeShape::Parameterized(_, args) => args,
            _ => &[],
        }
    }

    /// The element shape of an array.
    pub fn element(&self) -> Option<&TypeShape> {
        match self {
            TypeShape::Array(element) => Some(element),
            _ => None,
        }
    }
}

impl From<&'static RawType> for TypeShape {
    fn from(raw: &'static RawType) -> Self {
        TypeShape::Raw(raw)
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Raw(raw) => f.write_str(raw.name),
            TypeShape::Array(element) => write!(f, "{element}[]"),
            TypeShape::Parameterized(raw, args) => {
                write!(f, "{}<", raw.name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            TypeShape::Wildcard(None) => f.write_str("?"),
            TypeShape::Wildcard(Some(bound)) => write!(f, "? extends {bound}"),
            TypeShape::Variable(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
