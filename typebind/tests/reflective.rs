use core::any::Any;
use std::sync::Arc;

use typebind::{
    Engine, ErasedAdapter, Error, RawType, Reflect, Reflected, Result, SyntaxError, TokenKind,
    TokenReader, TokenWriter, TypeAdapter, TypeShape, reflect_struct,
};
use typebind_testhelpers::test;

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

reflect_struct!(Point { x: i32, y: i32 });

#[test]
fn structs_round_trip() {
    let engine = Engine::new();
    let json = engine.to_json(&Point { x: 1, y: -2 }).unwrap();
    assert_eq!(json, r#"{"x":1,"y":-2}"#);
    assert_eq!(engine.from_json::<Point>(&json).unwrap(), Point { x: 1, y: -2 });
}

#[test]
fn missing_and_null_members_keep_zero_values() {
    let engine = Engine::new();
    assert_eq!(engine.from_json::<Point>("{}").unwrap(), Point { x: 0, y: 0 });
    assert_eq!(
        engine.from_json::<Point>(r#"{"x":null,"y":3}"#).unwrap(),
        Point { x: 0, y: 3 }
    );
}

#[test]
fn unknown_members_are_skipped() {
    let engine = Engine::new();
    let point: Point = engine
        .from_json(r#"{"x":1,"extra":{"deep":[1,2,{"a":null}]},"y":2,"z":"?"}"#)
        .unwrap();
    assert_eq!(point, Point { x: 1, y: 2 });
}

#[test]
fn wrong_shape_is_a_syntax_error() {
    let engine = Engine::new();
    let err = engine.from_json::<Point>("[1,2]").unwrap_err();
    assert!(matches!(err, Error::Syntax(_)), "{err}");
    let err = engine.from_json::<Point>(r#"{"x":"one"}"#).unwrap_err();
    assert!(matches!(err, Error::Conversion { .. }), "{err}");
    assert_eq!(err.to_string(), r#"cannot convert "one" to i32 at path $.x"#);
}

#[derive(Debug, PartialEq)]
struct Counter {
    start: u32,
    step: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Counter { start: 42, step: 1 }
    }
}

reflect_struct!(Counter { start: u32, step: u32 }, default);

#[test]
fn constructor_values_survive_missing_members() {
    let engine = Engine::new();
    assert_eq!(
        engine.from_json::<Counter>(r#"{"step":5}"#).unwrap(),
        Counter { start: 42, step: 5 }
    );
}

#[test]
fn instance_creator_takes_priority() {
    let engine = Engine::builder()
        .register_instance_creator(|| Counter { start: 7, step: 7 })
        .unwrap()
        .build();
    assert_eq!(
        engine.from_json::<Counter>(r#"{"step":5}"#).unwrap(),
        Counter { start: 7, step: 5 }
    );
}

#[derive(Debug, PartialEq)]
struct Node {
    name: String,
    children: Vec<Node>,
}

reflect_struct!(Node { name: String, children: Vec<Node> });

fn tree() -> Node {
    Node {
        name: "root".to_owned(),
        children: vec![
            Node {
                name: "leaf".to_owned(),
                children: Vec::new(),
            },
            Node {
                name: "branch".to_owned(),
                children: vec![Node {
                    name: "twig".to_owned(),
                    children: Vec::new(),
                }],
            },
        ],
    }
}

#[test]
fn recursive_types_resolve() {
    let engine = Engine::new();
    let json = engine.to_json(&tree()).unwrap();
    assert_eq!(
        json,
        r#"{"name":"root","children":[{"name":"leaf","children":[]},{"name":"branch","children":[{"name":"twig","children":[]}]}]}"#
    );
    assert_eq!(engine.from_json::<Node>(&json).unwrap(), tree());
}

#[derive(Debug, PartialEq)]
struct Link {
    value: i32,
    next: Option<Arc<Link>>,
}

reflect_struct!(Link { value: i32, next: Option<Arc<Link>> });

#[test]
fn recursion_through_options_and_pointers() {
    let engine = Engine::new();
    let list = Link {
        value: 1,
        next: Some(Arc::new(Link {
            value: 2,
            next: None,
        })),
    };
    let json = engine.to_json(&list).unwrap();
    assert_eq!(json, r#"{"value":1,"next":{"value":2}}"#);
    assert_eq!(engine.from_json::<Link>(&json).unwrap(), list);

    let engine = Engine::builder().serialize_nulls(true).build();
    assert_eq!(
        engine.to_json(&list).unwrap(),
        r#"{"value":1,"next":{"value":2,"next":null}}"#
    );
}

#[test]
fn pretty_printing() {
    let engine = Engine::builder().pretty_printing().build();
    let json = engine.to_json(&tree().children).unwrap();
    insta::assert_snapshot!(json, @r#"
    [
      {
        "name": "leaf",
        "children": []
      },
      {
        "name": "branch",
        "children": [
          {
            "name": "twig",
            "children": []
          }
        ]
      }
    ]
    "#);
}

/// Encodes booleans as `1` and `0`.
struct Bit;

impl TypeAdapter for Bit {
    type Value = bool;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<bool>> {
        if reader.consume_null()? {
            return Ok(None);
        }
        Ok(Some(reader.next_string()? != "0"))
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&bool>) -> Result<()> {
        match value {
            Some(bit) => writer.number_value(if *bit { "1" } else { "0" })?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
struct Flags {
    name: String,
    enabled: bool,
    mask: Vec<bool>,
}

reflect_struct!(Flags { name: String, enabled: bool, mask: Vec<bool> });

#[test]
fn custom_adapter_applies_everywhere() {
    let engine = Engine::builder().register_adapter(Bit).unwrap().build();
    let flags = Flags {
        name: "f".to_owned(),
        enabled: true,
        mask: vec![false, true],
    };
    let json = engine.to_json(&flags).unwrap();
    assert_eq!(json, r#"{"name":"f","enabled":1,"mask":[0,1]}"#);
    assert_eq!(engine.from_json::<Flags>(&json).unwrap(), flags);

    let adapter = engine.adapter::<bool>().unwrap();
    assert!(adapter.erased().downcast_ref::<Bit>().is_some());
    assert_eq!(adapter.to_json(&false).unwrap(), "0");
}

trait Shape: Send + Sync {}

static SHAPE: RawType = RawType::interface::<dyn Shape>("Shape");
static CIRCLE: RawType = RawType::concrete::<Circle>("Circle").with_supertypes(&[&SHAPE]);
static SQUARE: RawType = RawType::concrete::<Square>("Square").with_supertypes(&[&SHAPE]);

#[derive(Debug, Default, PartialEq)]
struct Circle {
    radius: f64,
}

reflect_struct!(Circle as CIRCLE { radius: f64 });

impl Shape for Circle {}

#[derive(Debug, Default, PartialEq)]
struct Square {
    side: f64,
}

reflect_struct!(Square as SQUARE { side: f64 });

impl Shape for Square {}

/// Writes any shape as its type name.
struct ShapeName;

impl ErasedAdapter for ShapeName {
    fn read_erased(&self, reader: &mut dyn TokenReader) -> Result<Option<Box<dyn Reflected>>> {
        if reader.consume_null()? {
            return Ok(None);
        }
        let name = reader.next_string()?;
        match name.as_str() {
            "Circle" => Ok(Some(Box::new(Circle::default()))),
            "Square" => Ok(Some(Box::new(Square::default()))),
            _ => Err(SyntaxError::new("a shape name", TokenKind::String, reader.path()).into()),
        }
    }

    fn write_erased(
        &self,
        writer: &mut dyn TokenWriter,
        value: Option<&dyn Reflected>,
    ) -> Result<()> {
        match value {
            Some(shape) => writer.string_value(&shape.runtime_type()?.to_string())?,
            None => writer.null_value()?,
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn shapes_engine() -> Engine {
    Engine::builder()
        .register_hierarchy_adapter(&SHAPE, Arc::new(ShapeName))
        .build()
}

#[test]
fn hierarchy_adapter_covers_subtypes() {
    let engine = shapes_engine();
    assert_eq!(engine.to_json(&Circle { radius: 2.0 }).unwrap(), r#""Circle""#);
    assert_eq!(
        engine.to_json(&vec![Square { side: 1.0 }]).unwrap(),
        r#"["Square"]"#
    );
    // unrelated structs still go through reflection
    assert_eq!(engine.to_json(&Point { x: 1, y: 2 }).unwrap(), r#"{"x":1,"y":2}"#);

    let squares: Vec<Square> = engine.from_json(r#"["Square"]"#).unwrap();
    assert_eq!(squares, [Square::default()]);
    let err = engine.from_json::<Vec<Square>>(r#"["Circle"]"#).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "{err}");
}

#[test]
fn exact_adapters_precede_hierarchy_adapters() {
    struct Radius;

    impl TypeAdapter for Radius {
        type Value = Circle;

        fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<Circle>> {
            let radius = reader.next_string()?;
            Ok(radius.parse().ok().map(|radius| Circle { radius }))
        }

        fn write(&self, writer: &mut dyn TokenWriter, value: Option<&Circle>) -> Result<()> {
            match value {
                Some(circle) => writer.f64_value(circle.radius)?,
                None => writer.null_value()?,
            }
            Ok(())
        }
    }

    let engine = Engine::builder()
        .register_hierarchy_adapter(&SHAPE, Arc::new(ShapeName))
        .register_adapter(Radius)
        .unwrap()
        .build();
    assert_eq!(engine.to_json(&Circle { radius: 2.5 }).unwrap(), "2.5");
    assert_eq!(engine.to_json(&Square { side: 1.0 }).unwrap(), r#""Square""#);
}

struct Token(u64);

static TOKEN: RawType = RawType::concrete::<Token>("Token");

impl Reflect for Token {
    fn type_shape() -> TypeShape {
        TypeShape::Raw(&TOKEN)
    }
}

struct TokenAdapter;

impl TypeAdapter for TokenAdapter {
    type Value = Token;

    fn read(&self, reader: &mut dyn TokenReader) -> Result<Option<Token>> {
        Ok(Some(Token(reader.next_string()?.len() as u64)))
    }

    fn write(&self, writer: &mut dyn TokenWriter, value: Option<&Token>) -> Result<()> {
        match value {
            Some(token) => writer.u64_value(token.0)?,
            None => writer.null_value()?,
        }
        Ok(())
    }
}

struct Session {
    token: Token,
}

reflect_struct!(Session { token: Token });

#[test]
fn struct_without_zero_value_needs_a_creator() {
    let engine = Engine::builder()
        .register_adapter(TokenAdapter)
        .unwrap()
        .build();
    assert_eq!(engine.to_json(&Session { token: Token(9) }).unwrap(), r#"{"token":9}"#);

    let err = engine.from_json::<Session>(r#"{"token":"abc"}"#).err().unwrap();
    assert_eq!(err.code(), "typebind::instantiation");
    insta::assert_snapshot!(err, @"type `Session` has neither a parameterless constructor nor a zero value");

    let engine = Engine::builder()
        .register_adapter(TokenAdapter)
        .unwrap()
        .register_instance_creator(|| Session { token: Token(0) })
        .unwrap()
        .build();
    let session: Session = engine.from_json(r#"{"token":"abc"}"#).unwrap();
    assert_eq!(session.token.0, 3);
}
