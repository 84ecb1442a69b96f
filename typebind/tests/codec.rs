use std::collections::BTreeMap;

use typebind::{
    DEFAULT_MAX_DEPTH, DeferredNumber, Engine, Error, JsonReader, Number, NumberPolicy, Object,
    Reflected, TokenReader, Value, reflect_struct,
};
use typebind_testhelpers::test;

const DOCUMENT: &str = r#"{"a":[1,2.5,null,"x",true]}"#;

#[test]
fn top_type_reads_a_value_tree() {
    let engine = Engine::new();
    let value: Box<dyn Reflected> = engine.from_json(DOCUMENT).unwrap();
    let tree = (*value).downcast_ref::<Value>().unwrap();
    let items = tree.get("a").and_then(Value::as_array).unwrap();
    assert_eq!(
        items,
        [
            Value::Number(Number::Float(1.0)),
            Value::Number(Number::Float(2.5)),
            Value::Null,
            Value::from("x"),
            Value::Bool(true),
        ]
    );
    assert_eq!(engine.to_json(&value).unwrap(), DOCUMENT);
}

#[test]
fn value_round_trips() {
    let engine = Engine::new();
    let tree: Value = engine.from_json(DOCUMENT).unwrap();
    assert_eq!(engine.to_json(&tree).unwrap(), DOCUMENT);
}

#[test]
fn numeric_strings_stay_strings() {
    let engine = Engine::builder()
        .number_policy(NumberPolicy::LongOrDouble)
        .build();
    let tree: Value = engine.from_json(r#"["12", 12]"#).unwrap();
    assert_eq!(
        tree.as_array().unwrap(),
        [Value::from("12"), Value::Number(Number::Int(12))]
    );
}

#[test]
fn repeated_member_keeps_last_value() {
    let engine = Engine::new();
    let tree: Value = engine.from_json(r#"{"a":1,"b":2,"a":"x"}"#).unwrap();
    let members = tree.as_object().unwrap();
    assert_eq!(members.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(members["a"], Value::from("x"));
}

#[test]
fn bare_object_writes_empty_object() {
    let engine = Engine::new();
    assert_eq!(engine.to_json(&Object).unwrap(), "{}");
    let slots: Vec<Box<dyn Reflected>> = vec![Box::new(Object), Box::new(3_i32)];
    assert_eq!(engine.to_json(&slots).unwrap(), "[{},3]");
}

#[derive(Debug)]
struct Envelope {
    kind: String,
    payload: Box<dyn Reflected>,
}

reflect_struct!(Envelope { kind: String, payload: Box<dyn Reflected> });

#[test]
fn dynamic_slot_uses_runtime_type() {
    let engine = Engine::new();
    let envelope = Envelope {
        kind: "pair".to_owned(),
        payload: Box::new(vec![1_i32, 2]),
    };
    let json = engine.to_json(&envelope).unwrap();
    assert_eq!(json, r#"{"kind":"pair","payload":[1,2]}"#);

    let back: Envelope = engine.from_json(&json).unwrap();
    assert_eq!(back.kind, "pair");
    let payload = (*back.payload).downcast_ref::<Value>().unwrap();
    assert_eq!(payload.as_array().map(<[Value]>::len), Some(2));

    let dynamic: &dyn Reflected = &envelope;
    assert_eq!(engine.to_json_dyn(dynamic).unwrap(), json);
}

const BIG: &str = "10000000000000000000001";

fn reread(policy: NumberPolicy, json: &str) -> String {
    let engine = Engine::builder().number_policy(policy).build();
    let tree: Value = engine.from_json(json).unwrap();
    engine.to_json(&tree).unwrap()
}

#[test]
fn double_policy_loses_precision() {
    assert_eq!(reread(NumberPolicy::Double, BIG), "1e+22");
    assert_eq!(reread(NumberPolicy::LongOrDouble, BIG), "1e+22");
}

#[test]
fn deferred_and_decimal_policies_keep_digits() {
    assert_eq!(reread(NumberPolicy::Deferred, BIG), BIG);
    assert_eq!(reread(NumberPolicy::Decimal, BIG), BIG);
    assert_eq!(reread(NumberPolicy::Deferred, "[1.50,2e3]"), "[1.50,2e3]");
}

#[test]
fn policy_applies_to_declared_numbers() {
    let engine = Engine::builder()
        .number_policy(NumberPolicy::LongOrDouble)
        .build();
    assert_eq!(engine.from_json::<Number>("12").unwrap(), Number::Int(12));
    assert_eq!(engine.from_json::<Number>("1.5").unwrap(), Number::Float(1.5));
    assert_eq!(engine.from_json::<Number>(r#""7""#).unwrap(), Number::Int(7));
    assert_eq!(
        engine.from_json::<Option<Number>>("null").unwrap(),
        None
    );
}

#[test]
fn deferred_numbers_are_written_verbatim() {
    let engine = Engine::new();
    let number: DeferredNumber = engine.from_json("1.50").unwrap();
    assert_eq!(number.as_str(), "1.50");
    assert_eq!(number, DeferredNumber::new("1.5"));
    assert_eq!(engine.to_json(&number).unwrap(), "1.50");
}

#[test]
fn typed_numbers() {
    let engine = Engine::new();
    assert_eq!(engine.from_json::<i64>("1.5e3").unwrap(), 1500);
    assert_eq!(engine.from_json::<u8>(r#""255""#).unwrap(), 255);
    assert_eq!(engine.from_json::<f64>("1e22").unwrap(), 1e22);
    assert_eq!(engine.to_json(&1e22_f64).unwrap(), "1e+22");
    assert_eq!(engine.to_json(&0.1_f32).unwrap(), "0.1");

    let err = engine.from_json::<i32>("2.5").unwrap_err();
    assert_eq!(err.code(), "typebind::conversion");
    insta::assert_snapshot!(err, @r#"cannot convert "2.5" to i32 at path $"#);

    let err = engine.to_json(&f64::NAN).unwrap_err();
    assert!(matches!(err, Error::Stream(_)));
}

#[test]
fn scalars_are_lenient_about_quoting() {
    let engine = Engine::new();
    assert!(engine.from_json::<bool>(r#""TRUE""#).unwrap());
    assert_eq!(engine.from_json::<String>("true").unwrap(), "true");
    assert_eq!(engine.from_json::<String>("12.0").unwrap(), "12.0");
    assert_eq!(engine.from_json::<char>(r#""é""#).unwrap(), 'é');
    assert!(engine.from_json::<char>(r#""ab""#).is_err());
}

#[test]
fn top_level_null_needs_an_option() {
    let engine = Engine::new();
    assert_eq!(engine.from_json::<Option<Vec<i32>>>("null").unwrap(), None);
    let err = engine.from_json::<Vec<i32>>("null").unwrap_err();
    insta::assert_snapshot!(err, @"Expected a value of type Vec<i32> but was NULL at path $");
    // the top type reads null as a tree
    let value: Value = engine.from_json("null").unwrap();
    assert!(value.is_null());
}

#[test]
fn null_elements_are_rejected() {
    let engine = Engine::new();
    let err = engine.from_json::<Vec<i32>>("[1,null]").unwrap_err();
    assert!(matches!(err, Error::Syntax(_)));
    assert!(err.to_string().starts_with("Expected a non-null element but was NULL"));

    let err = engine
        .from_json::<BTreeMap<String, i32>>(r#"{"a":null}"#)
        .unwrap_err();
    assert!(err.to_string().starts_with("Expected a non-null map value but was NULL"));

    let options: Vec<Option<i32>> = engine.from_json("[1,null]").unwrap();
    assert_eq!(options, [Some(1), None]);
}

#[test]
fn maps_use_member_names() {
    let engine = Engine::new();
    let map: BTreeMap<String, Vec<i32>> = engine.from_json(r#"{"b":[2],"a":[1],"b":[3]}"#).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["b"], [3]);
    assert_eq!(engine.to_json(&map).unwrap(), r#"{"a":[1],"b":[3]}"#);
}

#[test]
fn malformed_documents_fail() {
    let engine = Engine::new();
    let err = engine.from_json::<Vec<i32>>("[1,2").unwrap_err();
    assert!(matches!(err, Error::Stream(_) | Error::Syntax(_)));
    let err = engine.from_json::<Vec<i32>>("[1] [2]").unwrap_err();
    assert!(matches!(err, Error::Stream(_) | Error::Syntax(_)));
    let err = engine.from_json::<i32>(r#"{"a":1}"#).unwrap_err();
    insta::assert_snapshot!(err, @"Expected a number but was BEGIN_OBJECT at path $");
}

#[test]
fn value_position_rejects_structural_tokens() {
    let engine = Engine::new();

    let mut reader = JsonReader::new("[]");
    reader.begin_array().unwrap();
    let err = engine.read::<Value>(&mut reader).unwrap_err();
    assert_eq!(err.code(), "typebind::syntax");
    insta::assert_snapshot!(err, @"Expected a value but was END_ARRAY at path $[0]");

    let mut reader = JsonReader::new(r#"{"a":{}}"#);
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.begin_object().unwrap();
    let err = engine.read::<Box<dyn Reflected>>(&mut reader).unwrap_err();
    assert_eq!(err.code(), "typebind::syntax");
    insta::assert_snapshot!(err, @"Expected a value but was END_OBJECT at path $.a.");
}

#[test]
fn nesting_depth_is_bounded() {
    let engine = Engine::new();
    let nested = |depth: usize| format!("{}{}", "[".repeat(depth), "]".repeat(depth));

    let tree: Value = engine.from_json(&nested(DEFAULT_MAX_DEPTH)).unwrap();
    assert!(tree.as_array().is_some());

    for depth in [DEFAULT_MAX_DEPTH + 1, 5_000, 50_000] {
        let err = engine.from_json::<Value>(&nested(depth)).unwrap_err();
        assert_eq!(err.code(), "typebind::stream");
        assert!(
            err.to_string().starts_with("nesting exceeds the maximum depth of 128"),
            "{err}"
        );
    }

    let err = engine.from_json::<Vec<Value>>(&nested(20_000)).unwrap_err();
    assert!(matches!(err, Error::Stream(_)), "{err}");
}

#[test]
fn tree_conversion_skips_text() {
    let engine = Engine::new();
    let map: BTreeMap<String, Option<i64>> =
        BTreeMap::from([("a".to_owned(), Some(1)), ("b".to_owned(), None)]);
    let tree = engine.to_value(&map).unwrap();
    assert_eq!(
        tree.get("a").and_then(Value::as_number).map(ToString::to_string),
        Some("1".into())
    );
    // nulls are dropped like in text output
    assert!(tree.get("b").is_none());
    let back: BTreeMap<String, Option<i64>> = engine.from_value(tree).unwrap();
    assert_eq!(back, BTreeMap::from([("a".to_owned(), Some(1))]));

    let engine = Engine::builder().serialize_nulls(true).build();
    let tree = engine.to_value(&map).unwrap();
    assert_eq!(tree.get("b"), Some(&Value::Null));
    let back: BTreeMap<String, Option<i64>> = engine.from_value(tree).unwrap();
    assert_eq!(back, map);
}

#[test]
fn slices_are_accepted() {
    let engine = Engine::new();
    let values: Vec<String> = engine.from_slice(br#"["a","b"]"#).unwrap();
    assert_eq!(values, ["a", "b"]);
    assert!(engine.from_slice::<Vec<String>>(b"[\"\xff\"]").is_err());
}
