use crate::{
    codec::{
        CodecError, MARKERS, Marker, TOKEN_START, TokenSet, ValueReader, ValueWriter, decode,
        decode_with, encode,
    },
    types::Decimal,
    value::Value,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        prop_oneof![Just(0i64), Just(255), Just(256), Just(65_535), Just(65_536)]
            .prop_map(Value::Int),
        any::<i64>().prop_map(|rep| Value::Decimal(Decimal::from_rep(rep))),
        "[a-zA-Z0-9 _]{0,8}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]{1,3}", inner, 0..4).prop_map(Value::Object),
        ]
    })
}

#[test]
fn marker_table_is_strictly_ascending() {
    for pair in MARKERS.windows(2) {
        assert!(pair[0].to_u8() < pair[1].to_u8(), "{pair:?}");
    }
    for (i, marker) in MARKERS.iter().enumerate() {
        assert_eq!(usize::from(marker.to_u8()), i);
        assert_eq!(Marker::from_u8(marker.to_u8()), Some(*marker));
    }
    assert!(MARKERS[MARKERS.len() - 1].to_u8() < TOKEN_START);
}

#[test]
fn ints_use_the_narrowest_tier() {
    let cases: [(i64, &[u8]); 6] = [
        (0, &[10]),
        (1, &[11, 1]),
        (255, &[11, 255]),
        (256, &[12, 1, 0]),
        (65_536, &[13, 0, 1, 0, 0]),
        (-1, &[9, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
    ];

    for (value, expected) in cases {
        let bytes = encode(&Value::Int(value)).expect("encode int");
        assert_eq!(bytes, expected, "int {value}");
    }

    let big = encode(&Value::Int(1 << 40)).expect("encode int");
    assert_eq!(big[0], Marker::Int64.to_u8());
    assert_eq!(big.len(), 9);
}

#[test]
fn strings_are_nul_terminated() {
    let bytes = encode(&Value::from("ab")).expect("encode string");

    assert_eq!(bytes, vec![4, b'a', b'b', 0]);
    assert_eq!(
        encode(&Value::from("a\0b")),
        Err(CodecError::EmbeddedNul)
    );
}

#[test]
fn containers_are_delimited_by_end_markers() {
    let value = Value::object([("a", Value::Array(vec![Value::Null]))]);
    let bytes = encode(&value).expect("encode object");

    assert_eq!(bytes, vec![2, 4, b'a', 0, 3, 1, 0, 0]);
}

#[test]
fn truncated_streams_are_corrupt() {
    let bytes = encode(&Value::object([("name", Value::from("value"))])).expect("encode");

    for cut in 0..bytes.len() {
        let err = decode(&bytes[..cut]).expect_err("truncated input must fail");
        assert!(
            matches!(err, CodecError::CorruptStream { .. }),
            "cut {cut}: {err:?}"
        );
    }
}

#[test]
fn trailing_bytes_are_corrupt() {
    let mut bytes = encode(&Value::Int(3)).expect("encode");
    bytes.push(1);

    assert!(matches!(
        decode(&bytes),
        Err(CodecError::CorruptStream { .. })
    ));
}

#[test]
fn unknown_marker_without_tokens_is_unexpected() {
    assert_eq!(
        decode(&[20]),
        Err(CodecError::UnexpectedMarker {
            marker: 20,
            offset: 0
        })
    );
    assert_eq!(
        decode(&[2, TOKEN_START, 1, 0]),
        Err(CodecError::UnexpectedMarker {
            marker: TOKEN_START,
            offset: 1
        })
    );
}

#[test]
fn tokens_replace_registered_property_names_only() {
    let mut tokens = TokenSet::new();
    let token = tokens.register("name").expect("register token");
    assert_eq!(token, TOKEN_START);
    assert_eq!(tokens.register("name"), Some(token));

    let value = Value::object([("name", Value::from("name")), ("other", Value::Int(0))]);
    let mut writer = ValueWriter::new().with_tokens(&tokens);
    writer.write_value(&value).expect("encode with tokens");
    let bytes = writer.into_bytes();

    assert_eq!(bytes[1], token);
    assert_eq!(&bytes[2..8], &[4, b'n', b'a', b'm', b'e', 0]);
    assert_eq!(decode_with(&bytes, Some(&tokens)).expect("decode"), value);
}

#[test]
fn unregistered_token_is_reported() {
    let tokens = TokenSet::new();

    assert_eq!(
        decode_with(&[2, 40, 1, 0], Some(&tokens)),
        Err(CodecError::UnknownToken { token: 40 })
    );
}

#[test]
fn token_table_stops_at_byte_limit() {
    let mut tokens = TokenSet::new();
    for i in 0..224 {
        assert!(tokens.register(&format!("p{i}")).is_some());
    }

    assert_eq!(tokens.register("overflow"), None);
    assert_eq!(tokens.len(), 224);
}

#[test]
fn extensions_are_skipped() {
    // [ext(2 bytes), 7] decodes as [7]
    let array = [3, 15, 0, 0, 0, 2, 0xaa, 0xbb, 11, 7, 0];
    assert_eq!(
        decode(&array).expect("decode array"),
        Value::Array(vec![Value::Int(7)])
    );

    // {a: ext, b: null} drops `a`
    let object = [2, 4, b'a', 0, 15, 0, 0, 0, 0, 4, b'b', 0, 1, 0];
    assert_eq!(
        decode(&object).expect("decode object"),
        Value::object([("b", Value::Null)])
    );
}

#[test]
fn skip_value_consumes_one_value() {
    let first = encode(&Value::object([(
        "x",
        Value::Array(vec![Value::from("y"), Value::Int(300)]),
    )]))
    .expect("encode");
    let mut bytes = first.clone();
    bytes.extend(encode(&Value::Bool(true)).expect("encode"));

    let mut reader = ValueReader::new(&bytes);
    reader.skip_value().expect("skip object");
    assert_eq!(reader.position(), first.len());
    assert_eq!(reader.read_value().expect("read bool"), Value::Bool(true));
    assert!(reader.is_empty());
}

#[test]
fn skip_value_steps_over_a_leading_extension_like_read_value() {
    // empty extension, then null
    let bytes = [15, 0, 0, 0, 0, 1];

    let mut read = ValueReader::new(&bytes);
    assert_eq!(read.read_value().expect("read"), Value::Null);

    let mut skip = ValueReader::new(&bytes);
    skip.skip_value().expect("skip");

    assert_eq!(skip.position(), read.position());
    assert_eq!(skip.position(), bytes.len());
}

#[test]
fn skip_value_accepts_non_utf8_string_bytes() {
    let mut writer = ValueWriter::new();
    writer.write_string_bytes(&[0xff, 0xfe]).expect("write sort key");
    writer.write_int(5);
    let bytes = writer.into_bytes();

    let mut reader = ValueReader::new(&bytes);
    reader.skip_value().expect("skip raw string");
    assert_eq!(reader.read_value().expect("read int"), Value::Int(5));
}

#[test]
fn deep_nesting_does_not_recurse() {
    let depth = 2_000;
    let mut bytes = vec![3; depth];
    bytes.extend(std::iter::repeat_n(0, depth));

    let mut value = decode(&bytes).expect("decode nested arrays");
    let mut seen = 1;
    while let Value::Array(mut items) = value {
        match items.pop() {
            Some(inner) => {
                seen += 1;
                value = inner;
            }
            None => break,
        }
    }
    assert_eq!(seen, depth);
}

proptest! {
    #[test]
    fn round_trip(value in arb_value()) {
        let bytes = encode(&value).expect("encode");
        prop_assert_eq!(decode(&bytes).expect("decode"), value);
    }

    #[test]
    fn byte_order_matches_value_order(a in arb_value(), b in arb_value()) {
        let ea = encode(&a).expect("encode a");
        let eb = encode(&b).expect("encode b");
        prop_assert_eq!(ea.cmp(&eb), a.cmp(&b));
    }

    #[test]
    fn skip_agrees_with_read(value in arb_value()) {
        let bytes = encode(&value).expect("encode");
        let mut reader = ValueReader::new(&bytes);
        reader.skip_value().expect("skip");
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn tokens_round_trip(map in prop::collection::btree_map("[a-f]{1,2}", arb_scalar(), 0..6)) {
        let mut tokens = TokenSet::new();
        for name in map.keys().take(3) {
            tokens.register(name);
        }
        let value = Value::Object(map.into_iter().collect::<BTreeMap<_, _>>());
        let mut writer = ValueWriter::new().with_tokens(&tokens);
        writer.write_value(&value).expect("encode");
        prop_assert_eq!(decode_with(writer.as_bytes(), Some(&tokens)).expect("decode"), value);
    }
}
