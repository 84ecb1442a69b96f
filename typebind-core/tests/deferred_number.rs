use std::collections::HashSet;

use rust_decimal::Decimal;
use typebind_core::DeferredNumber;
use typebind_testhelpers::test;

#[test]
fn keeps_original_text() {
    let n = DeferredNumber::new("1.2300e2");
    assert_eq!(n.as_str(), "1.2300e2");
    assert_eq!(n.to_string(), "1.2300e2");
}

#[test]
fn equal_values_in_different_notations() {
    let forms = ["1", "1.0", "1e0", "10E-1", "1.000"];
    for a in forms {
        for b in forms {
            assert_eq!(DeferredNumber::new(a), DeferredNumber::new(b), "{a} vs {b}");
        }
    }
    assert_eq!(DeferredNumber::new("-0"), DeferredNumber::new("0"));
    assert_ne!(DeferredNumber::new("1"), DeferredNumber::new("1.5"));
}

#[test]
fn hashing_agrees_with_equality() {
    let set: HashSet<DeferredNumber> = ["1", "1.0", "1e0", "10E-1", "2"]
        .into_iter()
        .map(DeferredNumber::new)
        .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn non_numeric_text_compares_textually() {
    assert_eq!(DeferredNumber::new("abc"), DeferredNumber::new("abc"));
    assert_ne!(DeferredNumber::new("abc"), DeferredNumber::new("abd"));
    assert!(DeferredNumber::new("abc").exact().is_none());
}

#[test]
fn conversions() {
    let n = DeferredNumber::new("12.50");
    assert_eq!(n.to_f64().unwrap(), 12.5);
    assert!(n.to_i64().is_err());
    assert_eq!(n.to_decimal().unwrap(), Decimal::new(1250, 2));

    let whole = DeferredNumber::new("1.5e3");
    assert_eq!(whole.to_i64().unwrap(), 1500);
    assert_eq!(whole.to_i128().unwrap(), 1500);

    let big = DeferredNumber::new("170141183460469231731687303715884105728");
    assert!(big.to_i128().is_err());
    assert_eq!(big.to_u128().unwrap(), 1u128 << 127);
}

#[test]
fn precision_is_not_lost() {
    let n = DeferredNumber::new("10000000000000000000001");
    assert_eq!(n.exact().unwrap().to_string(), "10000000000000000000001");
    assert_ne!(n, DeferredNumber::new("1e22"));
}

#[test]
fn invalid_text_fails_on_conversion() {
    let err = DeferredNumber::new("1.2.3").to_f64().unwrap_err();
    assert_eq!(err.target, "f64");
    insta::assert_snapshot!(err, @r#"cannot convert "1.2.3" to f64"#);
}
