//! Fully reified type descriptors.

use core::any::{TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::raw::{self, RawType};
use crate::{CaptureError, Def, Reflect, TypeCategory, TypeOps, TypeShape, trace};

struct Inner {
    shape: TypeShape,
    ops: Option<TypeOps>,
    rust_name: Option<&'static str>,
}

/// A runtime representation of a complete type such as `Vec<String>`.
///
/// Descriptors are cheap to clone and compare by structure: two
/// descriptors for the same type are equal and hash alike however they
/// were obtained. Descriptors captured from a Rust type through
/// [`TypeDescriptor::of`] also carry that type's own [`TypeOps`], even when
/// another Rust type describes itself with the same shape (as
/// `Box<dyn Reflected>` does with [`crate::Object`]). Descriptors assembled
/// by hand reuse the operations of the type that owns the shape once it
/// has been captured, and carry none otherwise.
#[derive(Clone)]
pub struct TypeDescriptor(Arc<Inner>);

static BY_TYPE: LazyLock<RwLock<HashMap<TypeId, TypeDescriptor>>> =
    LazyLock::new(Default::default);
static BY_SHAPE: LazyLock<RwLock<HashMap<TypeShape, TypeDescriptor>>> =
    LazyLock::new(Default::default);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Top,
    Element,
    Argument,
}

fn validate(shape: TypeShape, position: Position) -> Result<TypeShape, CaptureError> {
    match shape {
        TypeShape::Raw(raw) if !raw.type_params.is_empty() => {
            Err(CaptureError::MissingTypeArgument { raw: raw.name })
        }
        TypeShape::Raw(raw) => Ok(TypeShape::Raw(raw)),
        TypeShape::Array(element) => Ok(TypeShape::Array(Box::new(validate(
            *element,
            Position::Element,
        )?))),
        TypeShape::Parameterized(raw, args) => {
            if args.is_empty() {
                return Err(CaptureError::MissingTypeArgument { raw: raw.name });
            }
            if args.len() != raw.type_params.len() {
                return Err(CaptureError::ArityMismatch {
                    raw: raw.name,
                    expected: raw.type_params.len(),
                    found: args.len(),
                });
            }
            let args = args
                .into_iter()
                .map(|arg| validate(arg, Position::Argument))
                .collect::<Result<_, _>>()?;
            Ok(TypeShape::Parameterized(raw, args))
        }
        TypeShape::Wildcard(_) if position != Position::Argument => {
            Err(CaptureError::WildcardOutsideArgument)
        }
        TypeShape::Wildcard(None) => Ok(TypeShape::Wildcard(None)),
        TypeShape::Wildcard(Some(bound)) => {
            let bound = validate(*bound, Position::Top)?;
            // `? extends Object` is just `?`
            if bound == TypeShape::Raw(&raw::OBJECT) {
                Ok(TypeShape::Wildcard(None))
            } else {
                Ok(TypeShape::Wildcard(Some(Box::new(bound))))
            }
        }
        TypeShape::Variable(name) => Err(CaptureError::UnresolvedVariable { name }),
    }
}

/// Whether a value of shape `from` may be used where `to` is expected.
fn assignable(to: &TypeShape, from: &TypeShape) -> bool {
    if to == from {
        return true;
    }
    match to {
        TypeShape::Raw(target) => from.raw_type().is_subtype_of(target),
        TypeShape::Parameterized(target, to_args) => match from {
            TypeShape::Parameterized(source, from_args) if source == target => to_args
                .iter()
                .zip(from_args)
                .all(|(to_arg, from_arg)| argument_matches(to_arg, from_arg)),
            TypeShape::Raw(source) | TypeShape::Parameterized(source, _)
                if source.is_subtype_of(target) =>
            {
                to_args.iter().all(|arg| *arg == TypeShape::Wildcard(None))
            }
            _ => false,
        },
        TypeShape::Array(to_element) => match from {
            TypeShape::Array(from_element) => assignable(to_element, from_element),
            _ => false,
        },
        TypeShape::Wildcard(None) => true,
        TypeShape::Wildcard(Some(bound)) => assignable(bound, from),
        TypeShape::Variable(_) => false,
    }
}

/// Type arguments are invariant, except that wildcards admit their bound.
fn argument_matches(to: &TypeShape, from: &TypeShape) -> bool {
    match (to, from) {
        (TypeShape::Wildcard(None), _) => true,
        (TypeShape::Wildcard(Some(bound)), TypeShape::Wildcard(Some(from_bound))) => {
            assignable(bound, from_bound)
        }
        (TypeShape::Wildcard(Some(_)), TypeShape::Wildcard(None)) => false,
        (TypeShape::Wildcard(Some(bound)), _) => assignable(bound, from),
        _ => to == from,
    }
}

impl TypeDescriptor {
    /// Capture the descriptor of `T`.
    ///
    /// Fails if `T`'s shape is incomplete, for example when a generic
    /// implementation names a type variable instead of forwarding its
    /// argument's shape. Results are memoized per type.
    pub fn of<T: Reflect + ?Sized>() -> Result<Self, CaptureError> {
        let id = TypeId::of::<T>();
        if let Some(found) = BY_TYPE.read().get(&id) {
            return Ok(found.clone());
        }

        let shape = validate(T::type_shape(), Position::Top)?;
        let fresh = TypeDescriptor(Arc::new(Inner {
            shape: shape.clone(),
            ops: T::type_ops(),
            rust_name: Some(type_name::<T>()),
        }));
        trace!(descriptor = %fresh, rust_type = type_name::<T>(), "captured type");

        let descriptor = BY_TYPE.write().entry(id).or_insert(fresh).clone();
        // a type borrowing another raw type's shape never speaks for it
        let owns_shape = match &shape {
            TypeShape::Raw(raw) => raw.id.get() == id,
            _ => true,
        };
        if owns_shape {
            BY_SHAPE
                .write()
                .entry(shape)
                .or_insert_with(|| descriptor.clone());
        }
        Ok(descriptor)
    }

    /// Build a descriptor from an explicit shape.
    pub fn capture(shape: TypeShape) -> Result<Self, CaptureError> {
        let shape = validate(shape, Position::Top)?;
        Ok(Self::lookup(shape))
    }

    /// The descriptor of a non-generic raw type.
    pub fn raw(raw: &'static RawType) -> Result<Self, CaptureError> {
        Self::capture(TypeShape::Raw(raw))
    }

    /// The descriptor of an array of `element`.
    pub fn array_of(element: &TypeDescriptor) -> Self {
        Self::lookup(TypeShape::Array(Box::new(element.shape().clone())))
    }

    /// The descriptor of `raw` applied to `args`.
    ///
    /// Arguments may be wildcards built with [`TypeShape::wildcard`].
    pub fn parameterized_of(
        raw: &'static RawType,
        args: impl IntoIterator<Item = TypeShape>,
    ) -> Result<Self, CaptureError> {
        Self::capture(TypeShape::Parameterized(raw, args.into_iter().collect()))
    }

    fn lookup(shape: TypeShape) -> Self {
        if let Some(found) = BY_SHAPE.read().get(&shape) {
            return found.clone();
        }
        TypeDescriptor(Arc::new(Inner {
            shape,
            ops: None,
            rust_name: None,
        }))
    }

    /// The structure of this type.
    pub fn shape(&self) -> &TypeShape {
        &self.0.shape
    }

    /// The raw type this descriptor erases to.
    pub fn raw_type(&self) -> &'static RawType {
        self.0.shape.raw_type()
    }

    /// How the raw type may be instantiated.
    pub fn category(&self) -> TypeCategory {
        self.raw_type().category
    }

    /// Construction and access operations, when known.
    pub fn ops(&self) -> Option<&TypeOps> {
        self.0.ops.as_ref()
    }

    /// Shortcut for `ops().map(|ops| ops.def)`.
    pub fn def(&self) -> Option<Def> {
        self.0.ops.as_ref().map(|ops| ops.def)
    }

    /// The Rust type name this was captured from, if any.
    pub fn rust_name(&self) -> Option<&'static str> {
        self.0.rust_name
    }

    /// Whether this is the universal top type.
    pub fn is_top(&self) -> bool {
        matches!(self.0.shape, TypeShape::Raw(raw) if raw.is_object())
    }

    /// Whether a value of type `other` can be used where `self` is expected.
    ///
    /// Raw types follow declared subtyping, arrays are covariant, and type
    /// arguments must be equal unless the target argument is a wildcard.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        assignable(&self.0.shape, &other.0.shape)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.shape == other.0.shape
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.shape.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.shape, f)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.0.shape)
    }
}

impl From<TypeDescriptor> for TypeShape {
    fn from(descriptor: TypeDescriptor) -> Self {
        descriptor.0.shape.clone()
    }
}

impl From<&TypeDescriptor> for TypeShape {
    fn from(descriptor: &TypeDescriptor) -> Self {
        descriptor.0.shape.clone()
    }
}
