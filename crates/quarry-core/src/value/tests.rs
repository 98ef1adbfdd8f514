use crate::{
    types::Decimal,
    value::{Value, ValueTag, strict_order_cmp},
};
use std::cmp::Ordering;

#[test]
fn cross_variant_order_follows_tags() {
    let ordered = [
        Value::Null,
        Value::object([("a", Value::Int(1))]),
        Value::Array(vec![Value::Int(1)]),
        Value::from("x"),
        Value::Bool(false),
        Value::Bool(true),
        Value::Decimal(Decimal::from_rep(-1)),
        Value::Decimal(Decimal::from_rep(1)),
        Value::Int(i64::MIN),
        Value::Int(0),
        Value::Int(i64::MAX),
    ];

    for pair in ordered.windows(2) {
        assert!(pair[0] < pair[1], "{:?} should sort before {:?}", pair[0], pair[1]);
    }
}

#[test]
fn arrays_compare_elementwise_then_by_length() {
    let short = Value::Array(vec![Value::Int(1)]);
    let long = Value::Array(vec![Value::Int(1), Value::Int(0)]);
    let bigger = Value::Array(vec![Value::Int(2)]);

    assert!(short < long);
    assert!(long < bigger);
}

#[test]
fn objects_compare_entries_in_name_order() {
    let a = Value::object([("a", Value::Int(1)), ("b", Value::Int(9))]);
    let b = Value::object([("a", Value::Int(2))]);
    let c = Value::object([("b", Value::Int(0))]);

    assert!(a < b);
    assert!(b < c);
}

#[test]
fn strict_order_rejects_mixed_variants() {
    assert_eq!(strict_order_cmp(&Value::Int(1), &Value::from("1")), None);
    assert_eq!(
        strict_order_cmp(&Value::from("a"), &Value::from("b")),
        Some(Ordering::Less)
    );
    assert_eq!(
        strict_order_cmp(&Value::Array(vec![]), &Value::Array(vec![])),
        None
    );
}

#[test]
fn tag_labels_are_stable() {
    assert_eq!(Value::Null.tag().label(), "Null");
    assert_eq!(Value::Int(3).tag(), ValueTag::Int);
    assert_eq!(ValueTag::Int.to_u8(), 7);
}

#[test]
fn object_builder_keeps_last_duplicate() {
    let v = Value::object([("k", Value::Int(1)), ("k", Value::Int(2))]);

    assert_eq!(v.get("k"), Some(&Value::Int(2)));
}
