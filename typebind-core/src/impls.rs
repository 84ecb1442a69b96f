//! [`Reflect`] for standard library types.

use core::hash::Hash;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::raw;
use crate::{
    Def, DeferredNumber, EntryError, ListOps, MapKey, MapOps, Number, Object, OptionOps,
    PointerOps, Reflect, Reflected, TypeDescriptor, TypeMismatch, TypeOps, TypeShape, Value,
};

macro_rules! scalars {
    ($($ty:ty => $raw:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_shape() -> TypeShape {
                    TypeShape::Raw(&raw::$raw)
                }

                fn type_ops() -> Option<TypeOps> {
                    Some(TypeOps::of::<Self>(Def::Scalar))
                }

                fn blank() -> Option<Self> {
                    Some(<$ty>::default())
                }

                fn construct() -> Option<Self> {
                    Some(<$ty>::default())
                }
            }
        )*
    };
}

scalars! {
    bool => BOOL, char => CHAR, String => STRING,
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128, isize => ISIZE,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128, usize => USIZE,
    f32 => F32, f64 => F64,
    Number => NUMBER, DeferredNumber => DEFERRED_NUMBER, Value => VALUE,
}

impl Reflect for Object {
    fn type_shape() -> TypeShape {
        TypeShape::Raw(&raw::OBJECT)
    }

    fn type_ops() -> Option<TypeOps> {
        Some(TypeOps::of::<Self>(Def::Opaque))
    }

    fn blank() -> Option<Self> {
        Some(Object)
    }

    fn construct() -> Option<Self> {
        Some(Object)
    }
}

/// A slot holding any value. Describes itself as the top type; adapters
/// see the boxed value.
impl Reflect for Box<dyn Reflected> {
    fn type_shape() -> TypeShape {
        TypeShape::Raw(&raw::OBJECT)
    }

    fn type_ops() -> Option<TypeOps> {
        Some(TypeOps::of::<Self>(Def::Opaque))
    }

    fn blank() -> Option<Self> {
        Some(Box::new(Value::Null))
    }

    fn from_instance(instance: Box<dyn Reflected>) -> Result<Self, TypeMismatch> {
        Ok(instance)
    }

    fn as_instance(&self) -> &dyn Reflected {
        let inner: &dyn Reflected = &**self;
        match inner.downcast_ref::<Box<dyn Reflected>>() {
            Some(nested) => nested.as_instance(),
            None => inner,
        }
    }
}

// Vec<T> and Box<[T]> share a Vec<T> builder.

fn list_new<T: Reflect + Send + Sync>() -> Box<dyn Reflected> {
    Box::new(Vec::<T>::new())
}

fn list_push<T: Reflect + Send + Sync>(
    list: &mut dyn Reflected,
    item: Box<dyn Reflected>,
) -> Result<(), TypeMismatch> {
    let found = list.type_name();
    let list = list
        .as_any_mut()
        .downcast_mut::<Vec<T>>()
        .ok_or_else(|| TypeMismatch::expected::<Vec<T>>(found))?;
    list.push(T::from_instance(item)?);
    Ok(())
}

fn vec_finish(list: Box<dyn Reflected>) -> Result<Box<dyn Reflected>, TypeMismatch> {
    Ok(list)
}

fn vec_items<T: Reflect + Send + Sync>(list: &dyn Reflected) -> Option<Vec<&dyn Reflected>> {
    let list = list.downcast_ref::<Vec<T>>()?;
    Some(list.iter().map(T::as_instance).collect())
}

impl<T: Reflect + Send + Sync> Reflect for Vec<T> {
    fn type_shape() -> TypeShape {
        TypeShape::Parameterized(&raw::VEC, vec![T::type_shape()])
    }

    fn type_ops() -> Option<TypeOps> {
        Some(TypeOps::of::<Self>(Def::List(ListOps {
            element: TypeDescriptor::of::<T>,
            new: list_new::<T>,
            push: list_push::<T>,
            finish: vec_finish,
            items: vec_items::<T>,
        })))
    }

    fn blank() -> Option<Self> {
        Some(Vec::new())
    }

    fn construct() -> Option<Self> {
        Some(Vec::new())
    }
}

fn boxed_finish<T: Reflect + Send + Sync>(
    list: Box<dyn Reflected>,
) -> Result<Box<dyn Reflected>, TypeMismatch> {
    let found = (*list).type_name();
    let list = list
        .into_any()
        .downcast::<Vec<T>>()
        .map_err(|_| TypeMismatch::expected::<Vec<T>>(found))?;
    Ok(Box::new(list.into_boxed_slice()))
}

fn boxed_items<T: Reflect + Send + Sync>(list: &dyn Reflected) -> Option<Vec<&dyn Reflected>> {
    let list = list.downcast_ref::<Box<[T]>>()?;
    Some(list.iter().map(T::as_instance).collect())
}

/// Fixed-length sequences are arrays.
impl<T: Reflect + Send + Sync> Reflect for Box<[T]> {
    fn type_shape() -> TypeShape {
        TypeShape::Array(Box::new(T::type_shape()))
    }

    fn type_ops() -> Option<TypeOps> {
        Some(TypeOps::of::<Self>(Def::List(ListOps {
            element: TypeDescriptor::of::<T>,
            new: list_new::<T>,
            push: list_push::<T>,
            finish: boxed_finish::<T>,
            items: boxed_items::<T>,
        })))
    }

    fn blank() -> Option<Self> {
        Some(Box::default())
    }

    fn construct() -> Option<Self> {
        Some(Box::default())
    }
}

fn option_none<T: Reflect + Send + Sync>() -> Box<dyn Reflected> {
    Box::new(None::<T>)
}

fn option_some<T: Reflect + Send + Sync>(
    value: Box<dyn Reflected>,
) -> Result<Box<dyn Reflected>, TypeMismatch> {
    Ok(Box::new(Some(T::from_instance(value)?)))
}

fn option_get<T: Reflect + Send + Sync>(value: &dyn Reflected) -> Option<Option<&dyn Reflected>> {
    let value = value.downcast_ref::<Option<T>>()?;
    Some(value.as_ref().map(T::as_instance))
}

impl<T: Reflect + Send + Sync> Reflect for Option<T> {
    fn type_shape() -> TypeShape {
        TypeShape::Parameterized(&raw::OPTION, vec![T::type_shape()])
    }

    fn type_ops() -> Option<TypeOps> {
        Some(TypeOps::of::<Self>(Def::Option(OptionOps {
            inner: TypeDescriptor::of::<T>,
            none: option_none::<T>,
            some: option_some::<T>,
            get: option_get::<T>,
        })))
    }

    fn blank() -> Option<Self> {
        Some(None)
    }

    fn construct() -> Option<Self> {
        Some(None)
    }
}

fn arc_wrap<T: Reflect + Send + Sync>(
    value: Box<dyn Reflected>,
) -> Result<Box<dyn Reflected>, TypeMismatch> {
    Ok(Box::new(Arc::new(T::from_instance(value)?)))
}

fn arc_get<T: Reflect + Send + Sync>(value: &dyn Reflected) -> Option<&dyn Reflected> {
    let value = value.downcast_ref::<Arc<T>>()?;
    Some(T::as_instance(value))
}

impl<T: Reflect + Send + Sync> Reflect for Arc<T> {
    fn type_shape() -> TypeShape {
        TypeShape::Parameterized(&raw::ARC, vec![T::type_shape()])
    }

    fn type_ops() -> Option<TypeOps> {
        Some(TypeOps::of::<Self>(Def::Pointer(PointerOps {
            inner: TypeDescriptor::of::<T>,
            wrap: arc_wrap::<T>,
            get: arc_get::<T>,
        })))
    }

    fn blank() -> Option<Self> {
        T::blank().map(Arc::new)
    }

    fn construct() -> Option<Self> {
        T::construct().map(Arc::new)
    }
}

/// The maps we reflect: string-convertible keys, any reflected value.
trait MapStore<K, V>: Default {
    fn put(&mut self, key: K, value: V);
    fn pairs(&self) -> Vec<(&K, &V)>;
}

impl<K: Eq + Hash, V> MapStore<K, V> for HashMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn pairs(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

impl<K: Ord, V> MapStore<K, V> for BTreeMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn pairs(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

impl<K: Eq + Hash, V> MapStore<K, V> for IndexMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn pairs(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

fn map_new<M: Reflect + Send + Sync + Default>() -> Box<dyn Reflected> {
    Box::new(M::default())
}

fn map_insert<M, K, V>(
    map: &mut dyn Reflected,
    key: &str,
    value: Box<dyn Reflected>,
) -> Result<(), EntryError>
where
    M: MapStore<K, V> + Reflect + Send + Sync,
    K: MapKey + 'static,
    V: Reflect + Send + Sync,
{
    let found = map.type_name();
    let map = map
        .as_any_mut()
        .downcast_mut::<M>()
        .ok_or_else(|| TypeMismatch::expected::<M>(found))?;
    let parsed = K::from_key(key).ok_or_else(|| EntryError::Key {
        key: key.to_owned(),
        expected: core::any::type_name::<K>(),
    })?;
    map.put(parsed, V::from_instance(value)?);
    Ok(())
}

fn map_entries<M, K, V>(map: &dyn Reflected) -> Option<Vec<(String, &dyn Reflected)>>
where
    M: MapStore<K, V> + Reflect + Send + Sync,
    K: MapKey + 'static,
    V: Reflect + Send + Sync,
{
    let map = map.downcast_ref::<M>()?;
    Some(
        map.pairs()
            .into_iter()
            .map(|(key, value)| (key.to_key(), value.as_instance()))
            .collect(),
    )
}

fn map_ops<M, K, V>() -> MapOps
where
    M: MapStore<K, V> + Reflect + Send + Sync,
    K: MapKey + Reflect + Send + Sync,
    V: Reflect + Send + Sync,
{
    MapOps {
        key: TypeDescriptor::of::<K>,
        value: TypeDescriptor::of::<V>,
        new: map_new::<M>,
        insert: map_insert::<M, K, V>,
        entries: map_entries::<M, K, V>,
    }
}

macro_rules! maps {
    ($($map:ident where [$($bound:tt)*] => $raw:ident),* $(,)?) => {
        $(
            impl<K, V> Reflect for $map<K, V>
            where
                K: MapKey + Reflect + Send + Sync + $($bound)*,
                V: Reflect + Send + Sync,
            {
                fn type_shape() -> TypeShape {
                    TypeShape::Parameterized(&raw::$raw, vec![K::type_shape(), V::type_shape()])
                }

                fn type_ops() -> Option<TypeOps> {
                    Some(TypeOps::of::<Self>(Def::Map(map_ops::<Self, K, V>())))
                }

                fn blank() -> Option<Self> {
                    Some(Self::default())
                }

                fn construct() -> Option<Self> {
                    Some(Self::default())
                }
            }
        )*
    };
}

maps! {
    HashMap where [Eq + Hash] => HASH_MAP,
    BTreeMap where [Ord] => BTREE_MAP,
    IndexMap where [Eq + Hash] => INDEX_MAP,
}
