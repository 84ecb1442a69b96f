use core::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use typebind::{
    AdapterFactory, Engine, ErasedAdapter, Error, RawType, Reflect, Reflected, Resolver, Result,
    TokenReader, TokenWriter, TypeAdapter, TypeDescriptor, TypeShape, TypedAdapter, erase,
};
use typebind_testhelpers::test;

/// Writes a fixed string for every `i32`.
struct Constant(&'static str);

impl TypeAdapter for Constant {
    type Value = i32;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<i32>> {
        reader.skip_value()?;
        Ok(Some(0))
    }

    fn write(&self, writer: &mut dyn TokenWriter, _value: Option<&i32>) -> Result<()> {
        writer.string_value(self.0)?;
        Ok(())
    }
}

fn is_i32(descriptor: &TypeDescriptor) -> Result<bool> {
    Ok(*descriptor == TypeDescriptor::of::<i32>()?)
}

struct ConstantFactory(&'static str);

impl AdapterFactory for ConstantFactory {
    fn create(
        &self,
        _resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        if !is_i32(descriptor)? {
            return Ok(None);
        }
        Ok(Some(erase(Constant(self.0))))
    }
}

struct Declining(Arc<AtomicUsize>);

impl AdapterFactory for Declining {
    fn create(
        &self,
        _resolver: &Resolver<'_>,
        _descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[test]
fn first_accepting_factory_wins() {
    let asked = Arc::new(AtomicUsize::new(0));
    let engine = Engine::builder()
        .register_factory(Declining(Arc::clone(&asked)))
        .register_factory(ConstantFactory("two"))
        .register_factory(ConstantFactory("three"))
        .build();
    assert_eq!(engine.to_json(&5_i32).unwrap(), r#""two""#);
    assert_eq!(asked.load(Ordering::SeqCst), 1);

    let engine = Engine::builder()
        .register_factory(ConstantFactory("three"))
        .register_factory(ConstantFactory("two"))
        .build();
    assert_eq!(engine.to_json(&5_i32).unwrap(), r#""three""#);
}

#[test]
fn declining_factories_do_not_change_the_match() {
    let asked = Arc::new(AtomicUsize::new(0));
    let declining_first = Engine::builder()
        .register_factory(Declining(Arc::clone(&asked)))
        .register_factory(ConstantFactory("only"))
        .build();
    assert_eq!(declining_first.to_json(&5_i32).unwrap(), r#""only""#);
    assert_eq!(asked.load(Ordering::SeqCst), 1);

    let asked = Arc::new(AtomicUsize::new(0));
    let matching_first = Engine::builder()
        .register_factory(ConstantFactory("only"))
        .register_factory(Declining(Arc::clone(&asked)))
        .build();
    assert_eq!(matching_first.to_json(&5_i32).unwrap(), r#""only""#);
    // resolution stops at the match
    assert_eq!(asked.load(Ordering::SeqCst), 0);
}

#[test]
fn user_factories_precede_builtins() {
    let engine = Engine::builder()
        .register_factory(ConstantFactory("custom"))
        .build();
    assert_eq!(engine.to_json(&vec![1_i32, 2]).unwrap(), r#"["custom","custom"]"#);
    // other integer widths are untouched
    assert_eq!(engine.to_json(&vec![1_i64, 2]).unwrap(), "[1,2]");
}

struct Counting(Arc<AtomicUsize>);

impl AdapterFactory for Counting {
    fn create(
        &self,
        _resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        if !is_i32(descriptor)? {
            return Ok(None);
        }
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Some(erase(Constant("counted"))))
    }
}

#[test]
fn adapters_are_created_once() {
    let created = Arc::new(AtomicUsize::new(0));
    let engine = Engine::builder()
        .register_factory(Counting(Arc::clone(&created)))
        .build();
    engine.to_json(&1_i32).unwrap();
    engine.to_json(&2_i32).unwrap();
    engine.to_json(&vec![3_i32]).unwrap();
    engine.to_json(&Some(4_i32)).unwrap();
    assert_eq!(created.load(Ordering::SeqCst), 1);

    let descriptor = TypeDescriptor::of::<Vec<i32>>().unwrap();
    let first = engine.adapter_for(&descriptor).unwrap();
    let second = engine.adapter_for(&descriptor).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(engine.registry().cached(&descriptor).is_some());
}

#[test]
fn clones_share_the_cache() {
    let engine = Engine::new();
    let clone = engine.clone();
    let descriptor = TypeDescriptor::of::<HashMap<String, bool>>().unwrap();
    let adapter = engine.adapter_for(&descriptor).unwrap();
    assert!(Arc::ptr_eq(&adapter, &clone.registry().cached(&descriptor).unwrap()));
}

/// Wraps whatever the rest of the chain produces for `i32` in a
/// one-element array.
struct Bracketed;

struct BracketedAdapter(Arc<dyn ErasedAdapter>);

impl AdapterFactory for Bracketed {
    fn create(
        &self,
        resolver: &Resolver<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<Arc<dyn ErasedAdapter>>> {
        if !is_i32(descriptor)? {
            return Ok(None);
        }
        let inner = resolver.delegate_adapter(self, descriptor)?;
        Ok(Some(Arc::new(BracketedAdapter(inner))))
    }
}

impl ErasedAdapter for BracketedAdapter {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        reader.begin_array()?;
        let value = self.0.read_erased(reader)?;
        reader.end_array()?;
        Ok(value)
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        writer.begin_array()?;
        self.0.write_erased(writer, value)?;
        writer.end_array()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn delegating_factory_wraps_the_next_adapter() {
    let engine = Engine::builder().register_factory(Bracketed).build();
    assert_eq!(engine.to_json(&7_i32).unwrap(), "[7]");
    assert_eq!(engine.to_json(&vec![1_i32, 2]).unwrap(), "[[1],[2]]");
    assert_eq!(engine.from_json::<i32>("[7]").unwrap(), 7);

    let descriptor = TypeDescriptor::of::<i32>().unwrap();
    let wrapped = engine.adapter_for(&descriptor).unwrap();
    assert!(wrapped.downcast_ref::<BracketedAdapter>().is_some());

    let factories = engine.registry().factories();
    let plain = engine
        .registry()
        .resolve_skipping(&*factories[0], &descriptor)
        .unwrap();
    assert!(plain.downcast_ref::<BracketedAdapter>().is_none());
    assert_eq!(TypedAdapter::<i32>::new(plain).to_json(&7).unwrap(), "7");
    // the cached adapter is still the wrapper
    let cached = engine.registry().cached(&descriptor).unwrap();
    assert!(Arc::ptr_eq(&cached, &wrapped));
}

struct Ghost;

static GHOST: RawType = RawType::concrete::<Ghost>("Ghost");

impl Reflect for Ghost {
    fn type_shape() -> TypeShape {
        TypeShape::Raw(&GHOST)
    }
}

#[test]
fn unsupported_type_is_reported() {
    let engine = Engine::new();
    let err = engine.to_json(&Ghost).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
    assert_eq!(err.code(), "typebind::unsupported");
    insta::assert_snapshot!(err, @"no adapter factory supports type `Ghost` (registry::Ghost)");

    // nothing is cached for a failed resolution
    let descriptor = TypeDescriptor::of::<Ghost>().unwrap();
    assert!(engine.registry().cached(&descriptor).is_none());
}

#[test]
fn unsupported_element_fails_the_container() {
    let engine = Engine::new();
    let err = engine.to_json(&vec![Ghost]).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[test]
fn concurrent_resolution_converges_on_one_adapter() {
    let engine = Engine::new();
    let descriptor = TypeDescriptor::of::<Vec<HashMap<String, Option<i64>>>>().unwrap();
    let adapters: Vec<Arc<dyn ErasedAdapter>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.adapter_for(&descriptor).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let cached = engine.registry().cached(&descriptor).unwrap();
    for adapter in &adapters {
        assert!(Arc::ptr_eq(adapter, &cached));
    }
}

#[test]
fn concurrent_conversions_agree() {
    let engine = Engine::new();
    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4_i64)
            .map(|n| {
                let engine = &engine;
                scope.spawn(move || engine.to_json(&vec![n, n + 1]).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(outputs, ["[0,1]", "[1,2]", "[2,3]", "[3,4]"]);
}
