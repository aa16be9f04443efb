//! Round-trip properties of the array literal codec.

use proptest::prelude::*;
use relational_core::Value;
use relational_core::codec::{convert_scalar, encode_array_literal, encode_param, parse_array_literal};

fn ints(v: &[i64]) -> Vec<Value> {
    v.iter().copied().map(Value::Int).collect()
}

#[test]
fn empty_sequence() {
    assert_eq!(encode_array_literal(&[]), "{}");
    assert_eq!(
        parse_array_literal("{}", "int4").unwrap(),
        Some(Value::Array(vec![]))
    );
}

#[test]
fn nested_sequences() {
    let v = Value::Array(vec![Value::from(vec![1, 2]), Value::from(vec![3])]);
    let text = encode_param(&v).unwrap();
    assert_eq!(text, "{{1,2},{3}}");
    assert_eq!(convert_scalar(&text, "_int4").unwrap(), v);
    assert_eq!(parse_array_literal(&text, "int4").unwrap(), Some(v));
}

#[test]
fn nulls_inside_arrays() {
    let v = Value::Array(vec![Value::Int(1), Value::Null]);
    assert_eq!(encode_param(&v).as_deref(), Some("{1,null}"));
    assert_eq!(parse_array_literal("{1,null}", "int4").unwrap(), Some(v));
}

#[test]
fn top_level_booleans_are_digits() {
    for b in [true, false] {
        let text = encode_param(&Value::Bool(b)).unwrap();
        assert!(text == "1" || text == "0");
        assert_ne!(text, b.to_string());
    }
}

proptest! {
    #[test]
    fn integer_sequences_round_trip(v in prop::collection::vec(any::<i64>(), 0..16)) {
        let text = encode_array_literal(&ints(&v));
        prop_assert_eq!(parse_array_literal(&text, "int4").unwrap(), Some(Value::Array(ints(&v))));
    }

    #[test]
    fn strings_round_trip(v in prop::collection::vec(".*", 0..8)) {
        let items: Vec<Value> = v.iter().map(Value::from).collect();
        let text = encode_array_literal(&items);
        prop_assert_eq!(parse_array_literal(&text, "text").unwrap(), Some(Value::Array(items)));
    }

    #[test]
    fn strings_with_separators_round_trip(s in "[a-z\"\\\\,{} ]{0,12}") {
        let items = vec![Value::from(s.as_str()), Value::from("x")];
        let text = encode_array_literal(&items);
        prop_assert_eq!(parse_array_literal(&text, "varchar").unwrap(), Some(Value::Array(items)));
    }

    #[test]
    fn nested_integer_sequences_round_trip(
        v in prop::collection::vec(prop::collection::vec(-1000_i64..1000, 0..4), 0..4)
    ) {
        let value = Value::Array(v.iter().map(|inner| Value::Array(ints(inner))).collect());
        let text = encode_param(&value).unwrap();
        prop_assert_eq!(convert_scalar(&text, "_int8").unwrap(), value);
    }
}
