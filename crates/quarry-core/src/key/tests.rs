use crate::{
    key::{Key, KeyBuilder, KeyError, KeyRange, KeySet},
    text::{CollationStrength, FoldingCollator},
    types::Decimal,
    value::Value,
};
use proptest::prelude::*;

fn key(value: impl Into<Value>) -> Key {
    Key::from_value(&value.into(), None).expect("encode key")
}

fn composite(values: &[Value]) -> Key {
    let mut out = Key::default();
    for value in values {
        out.push_value(value, None).expect("encode component");
    }
    out
}

fn arb_component() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<i64>().prop_map(|rep| Value::Decimal(Decimal::from_rep(rep))),
        "[a-c]{0,4}".prop_map(Value::String),
    ]
}

#[test]
fn increment_bumps_the_last_byte() {
    let k = Key::from_bytes(vec![1, 2, 3]);

    assert_eq!(k.increment().expect("increment"), Key::from_bytes(vec![1, 2, 4]));
}

#[test]
fn increment_drops_trailing_ff() {
    let k = Key::from_bytes(vec![1, 0xff, 0xff]);

    assert_eq!(k.increment().expect("increment"), Key::from_bytes(vec![2]));
}

#[test]
fn increment_of_all_ff_overflows() {
    assert!(matches!(
        Key::from_bytes(vec![0xff, 0xff]).increment(),
        Err(KeyError::IncrementOverflow)
    ));
    assert!(matches!(Key::EMPTY.increment(), Err(KeyError::IncrementOverflow)));
}

#[test]
fn containers_are_not_key_material() {
    assert!(matches!(
        Key::from_value(&Value::Array(vec![]), None),
        Err(KeyError::Unsupported { kind: "Array" })
    ));
}

#[test]
fn collated_strings_use_sort_keys() {
    let collator = FoldingCollator::new(CollationStrength::Primary);
    let a = Key::from_value(&Value::from("Hello"), Some(&collator)).expect("key");
    let b = Key::from_value(&Value::from("hello"), Some(&collator)).expect("key");

    assert_eq!(a, b);
    assert_eq!(a.as_bytes()[0], 4);
    assert_eq!(a.as_bytes().last(), Some(&0));
}

#[test]
fn collator_is_ignored_for_non_strings() {
    let collator = FoldingCollator::new(CollationStrength::Primary);

    assert_eq!(
        Key::from_value(&Value::Int(7), Some(&collator)).expect("key"),
        key(7)
    );
}

#[test]
fn string_prefix_ignores_terminator() {
    let abc = key("abc");
    let abcd = key("abcd");

    assert!(abc.string_prefix_of(&abcd));
    assert!(!abc.has_prefix(&abcd));
    assert!(!abcd.string_prefix_of(&abc));
    assert!(!abc.has_prefix(&key("ab")));
}

#[test]
fn strip_terminator_only_removes_nul() {
    let mut k = key("ab");
    assert!(k.strip_terminator());
    assert_eq!(k.as_bytes(), &[4, b'a', b'b']);

    let mut n = key(5);
    assert!(!n.strip_terminator());
}

#[test]
fn builder_forms_sorted_cartesian_product() {
    let mut builder = KeyBuilder::new();
    builder.push_key(key(1));
    builder.push(&KeySet::from([key("b"), key("a")]));
    builder.push(&KeySet::from([key(true), key(false)]));

    let keys: Vec<Key> = builder.into_keys().into_iter().collect();
    let expected = vec![
        composite(&[Value::Int(1), "a".into(), false.into()]),
        composite(&[Value::Int(1), "a".into(), true.into()]),
        composite(&[Value::Int(1), "b".into(), false.into()]),
        composite(&[Value::Int(1), "b".into(), true.into()]),
    ];
    assert_eq!(keys, expected);
}

#[test]
fn builder_with_empty_column_is_empty() {
    let mut builder = KeyBuilder::new();
    builder.push_key(key(1));
    builder.push(&KeySet::new());

    assert!(builder.is_empty());
}

#[test]
fn range_containment_treats_empty_as_unbounded() {
    let all = KeyRange::new(Key::EMPTY, Key::EMPTY, 0);
    let part = KeyRange::new(key(1), key(5), 0);
    let open_top = KeyRange::new(key(3), Key::EMPTY, 0);

    assert!(all.contains_range(&part));
    assert!(!part.contains_range(&all));
    assert!(!part.contains_range(&open_top));
    assert!(part.contains_key(&key(1)));
    assert!(!part.contains_key(&key(5)));
    assert!(open_top.contains_key(&key(i64::MAX)));
}

#[test]
fn range_bounds_follow_direction() {
    let range = KeyRange::new(key(1), key(2), 0);

    assert_eq!(range.seek_bound(false), &key(1));
    assert_eq!(range.stop_bound(false), &key(2));
    assert_eq!(range.seek_bound(true), &key(2));
    assert_eq!(range.stop_bound(true), &key(1));
    assert!(KeyRange::new(key(2), key(1), 0).is_void());
}

proptest! {
    #[test]
    fn increment_is_least_upper_bound_of_prefix(
        bytes in prop::collection::vec(any::<u8>(), 1..8),
        suffix in prop::collection::vec(any::<u8>(), 0..4),
        other in prop::collection::vec(any::<u8>(), 0..10),
    ) {
        let k = Key::from_bytes(bytes.clone());
        prop_assume!(bytes.iter().any(|b| *b != 0xff));
        let next = k.increment().expect("increment");

        prop_assert!(k < next);

        let mut extended = bytes;
        extended.extend(suffix);
        prop_assert!(Key::from_bytes(extended) < next);

        let m = Key::from_bytes(other);
        if k < m && m < next {
            prop_assert!(m.has_prefix(&k));
        }
    }

    #[test]
    fn composite_order_is_lexicographic(
        a in prop::collection::vec(arb_component(), 1..4),
        b in prop::collection::vec(arb_component(), 1..4),
    ) {
        prop_assert_eq!(composite(&a).cmp(&composite(&b)), a.cmp(&b));
    }
}
