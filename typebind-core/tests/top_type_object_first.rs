//! Capture order is fixed by running in a binary of its own.

use core::any::type_name;

use typebind_core::{Instantiator, Object, Reflected, TypeDescriptor, Value, raw};
use typebind_testhelpers::test;

#[test]
fn object_then_dynamic_slot() {
    let object = TypeDescriptor::of::<Object>().unwrap();
    let slot = TypeDescriptor::of::<Box<dyn Reflected>>().unwrap();

    assert_eq!(object, slot);
    assert_eq!(object.rust_name(), Some(type_name::<Object>()));
    assert_eq!(slot.rust_name(), Some(type_name::<Box<dyn Reflected>>()));

    let instantiator = Instantiator::new();
    let instance = instantiator.new_instance(&slot).unwrap();
    let held = (*instance).downcast_ref::<Box<dyn Reflected>>().unwrap();
    assert_eq!((**held).downcast_ref::<Value>(), Some(&Value::Null));
    assert!((*instantiator.new_instance(&object).unwrap()).is::<Object>());

    let assembled = TypeDescriptor::raw(&raw::OBJECT).unwrap();
    assert_eq!(assembled.rust_name(), Some(type_name::<Object>()));
}
