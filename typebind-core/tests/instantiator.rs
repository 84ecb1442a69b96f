use std::marker::PhantomData;

use typebind_core::{
    InstantiationErrorKind, Instantiator, RawType, Reflect, Reflected, TypeCategory,
    TypeDescriptor, TypeShape, reflect_struct,
};
use typebind_testhelpers::test;

trait Shape: Send + Sync {
    fn area(&self) -> f64;
}

static SHAPE: RawType = RawType::interface::<dyn Shape>("Shape");

impl Reflect for dyn Shape {
    fn type_shape() -> TypeShape {
        TypeShape::Raw(&SHAPE)
    }
}

struct Square {
    side: f64,
}

reflect_struct!(Square { side: f64 });

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

enum Never {}

static NEVER: RawType = RawType::new::<Never>("Never", TypeCategory::Abstract);

impl Reflect for Never {
    fn type_shape() -> TypeShape {
        TypeShape::Raw(&NEVER)
    }
}

// No `Default`: only the blank form is available.
struct Account {
    owner: String,
    balance: i64,
}

reflect_struct!(Account { owner: String, balance: i64 });

struct Counter {
    start: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Counter { start: 42 }
    }
}

reflect_struct!(Counter { start: u32 }, default);

#[test]
fn interfaces_are_refused() {
    let err = Instantiator::new()
        .new_instance(&TypeDescriptor::of::<dyn Shape>().unwrap())
        .unwrap_err();
    assert_eq!(err.kind, InstantiationErrorKind::Interface);
    assert_eq!(err.type_name, "Shape");
}

#[test]
fn abstract_types_are_refused() {
    let err = Instantiator::new()
        .new_instance(&TypeDescriptor::of::<Never>().unwrap())
        .unwrap_err();
    assert_eq!(err.kind, InstantiationErrorKind::Abstract);
    insta::assert_snapshot!(err, @"cannot instantiate abstract type `Never`; register an instance creator or adapter for it");
}

#[test]
fn blank_instance_without_constructor() {
    let instance = Instantiator::new()
        .new_instance(&TypeDescriptor::of::<Account>().unwrap())
        .unwrap();
    let account = instance.downcast_ref::<Account>().unwrap();
    assert_eq!(account.owner, "");
    assert_eq!(account.balance, 0);
}

#[test]
fn constructor_preferred_over_blank() {
    let instance = Instantiator::new()
        .new_instance(&TypeDescriptor::of::<Counter>().unwrap())
        .unwrap();
    assert_eq!(instance.downcast_ref::<Counter>().unwrap().start, 42);
}

#[test]
fn registered_creator_preferred() {
    let mut instantiator = Instantiator::new();
    instantiator.register(|| Counter { start: 7 }).unwrap();
    let instance = instantiator
        .new_instance(&TypeDescriptor::of::<Counter>().unwrap())
        .unwrap();
    assert_eq!(instance.downcast_ref::<Counter>().unwrap().start, 7);
}

#[test]
fn creators_give_interfaces_instances() {
    let mut instantiator = Instantiator::new();
    instantiator.register_dyn(TypeDescriptor::of::<dyn Shape>().unwrap(), || {
        Box::new(Square { side: 3.0 }) as Box<dyn Reflected>
    });
    let instance = instantiator
        .new_instance(&TypeDescriptor::of::<dyn Shape>().unwrap())
        .unwrap();
    let square = instance.downcast_ref::<Square>().unwrap();
    assert_eq!(square.area(), 9.0);
}

#[test]
fn containers_and_scalars() {
    let instantiator = Instantiator::new();
    let list = instantiator
        .new_instance(&TypeDescriptor::of::<Vec<String>>().unwrap())
        .unwrap();
    assert!(list.downcast_ref::<Vec<String>>().unwrap().is_empty());

    let number = instantiator
        .new_instance(&TypeDescriptor::of::<f64>().unwrap())
        .unwrap();
    assert_eq!(*number.downcast_ref::<f64>().unwrap(), 0.0);
}

static GHOST: RawType = RawType::concrete::<PhantomData<i8>>("Ghost");

#[test]
fn hand_built_types_without_ops() {
    let err = Instantiator::new()
        .new_instance(&TypeDescriptor::raw(&GHOST).unwrap())
        .unwrap_err();
    assert_eq!(err.kind, InstantiationErrorKind::Unreified);
}
