//! Tests for constant values: key normalization, conversions, numeric
//! strings.

use super::*;
use crate::value::{Number, NumericString, float_to_int, format_float, parse_numeric_string};

fn key(text: &str) -> ArrayKey {
    ArrayKey::from_string(&PhpString::from(text))
}

#[test]
fn test_string_keys_normalize_to_integers_only_when_canonical() {
    assert_eq!(key("12"), ArrayKey::Int(12));
    assert_eq!(key("-3"), ArrayKey::Int(-3));
    assert_eq!(key("0"), ArrayKey::Int(0));
    assert_eq!(key("012"), ArrayKey::String("012".into()));
    assert_eq!(key("-0"), ArrayKey::String("-0".into()));
    assert_eq!(key("1.5"), ArrayKey::String("1.5".into()));
    assert_eq!(key(" 1"), ArrayKey::String(" 1".into()));
    assert_eq!(
        key("9223372036854775808"),
        ArrayKey::String("9223372036854775808".into())
    );
}

#[test]
fn test_value_keys() {
    assert_eq!(ArrayKey::from_value(&ConstValue::Null), Some(ArrayKey::String(PhpString::new())));
    assert_eq!(ArrayKey::from_value(&ConstValue::Bool(true)), Some(ArrayKey::Int(1)));
    assert_eq!(ArrayKey::from_value(&ConstValue::Float(2.9)), Some(ArrayKey::Int(2)));
    assert_eq!(ArrayKey::from_value(&ConstValue::Array(PhpArray::new())), None);
}

#[test]
fn test_push_continues_after_highest_integer_key() {
    let mut array = PhpArray::new();
    array.insert(ArrayKey::Int(5), ConstValue::Int(1));
    array.insert(ArrayKey::String("x".into()), ConstValue::Int(2));
    array.push(ConstValue::Int(3)).expect("room for next key");
    let keys: Vec<&ArrayKey> = array.keys().collect();
    assert_eq!(keys, vec![&ArrayKey::Int(5), &ArrayKey::String("x".into()), &ArrayKey::Int(6)]);
}

#[test]
fn test_push_after_max_key_fails() {
    let mut array = PhpArray::new();
    array.insert(ArrayKey::Int(i64::MAX), ConstValue::Null);
    assert!(array.push(ConstValue::Null).is_err());
}

#[test]
fn test_overwrite_keeps_position() {
    let mut array = PhpArray::from_list([ConstValue::Int(1), ConstValue::Int(2)]);
    array.insert(ArrayKey::Int(0), ConstValue::Int(9));
    let values: Vec<&ConstValue> = array.values().collect();
    assert_eq!(values, vec![&ConstValue::Int(9), &ConstValue::Int(2)]);
    assert!(array.is_list());
}

#[test]
fn test_union_keeps_left_values() {
    let left = PhpArray::from_list([ConstValue::from("a")]);
    let right = PhpArray::from_list([ConstValue::from("b"), ConstValue::from("c")]);
    let union = left.union(&right);
    let values: Vec<&ConstValue> = union.values().collect();
    assert_eq!(values, vec![&ConstValue::from("a"), &ConstValue::from("c")]);
}

#[test]
fn test_truthiness() {
    assert!(!ConstValue::Null.to_bool());
    assert!(!ConstValue::from("0").to_bool());
    assert!(!ConstValue::from("").to_bool());
    assert!(ConstValue::from("0.0").to_bool());
    assert!(!ConstValue::Float(0.0).to_bool());
    assert!(!ConstValue::Array(PhpArray::new()).to_bool());
    assert!(ConstValue::EnumCase { class: "Suit".into(), case: "Hearts".into() }.to_bool());
}

#[test]
fn test_float_formatting() {
    assert_eq!(format_float(0.1), "0.1");
    assert_eq!(format_float(1.0), "1");
    assert_eq!(format_float(-0.0), "-0");
    assert_eq!(format_float(1e25), "1.0E+25");
    assert_eq!(format_float(1.5e-7), "1.5E-7");
    assert_eq!(format_float(0.0001), "0.0001");
    assert_eq!(format_float(1.0 / 3.0), "0.33333333333333");
    assert_eq!(format_float(123456.789), "123456.789");
    assert_eq!(format_float(f64::INFINITY), "INF");
    assert_eq!(format_float(f64::NAN), "NAN");
}

#[test]
fn test_string_conversion() {
    assert_eq!(ConstValue::Bool(true).to_php_string(), Ok(PhpString::from("1")));
    assert_eq!(ConstValue::Bool(false).to_php_string(), Ok(PhpString::new()));
    assert_eq!(ConstValue::Float(2.5).to_php_string(), Ok(PhpString::from("2.5")));
    assert_eq!(
        ConstValue::Array(PhpArray::new()).to_php_string(),
        Err("Array to string conversion".to_string())
    );
}

#[test]
fn test_numeric_strings() {
    assert_eq!(parse_numeric_string(b"42"), NumericString::Numeric(Number::Int(42)));
    assert_eq!(parse_numeric_string(b" 42 "), NumericString::Numeric(Number::Int(42)));
    assert_eq!(parse_numeric_string(b"1e3"), NumericString::Numeric(Number::Float(1000.0)));
    assert_eq!(parse_numeric_string(b".5"), NumericString::Numeric(Number::Float(0.5)));
    assert_eq!(parse_numeric_string(b"12abc"), NumericString::Leading(Number::Int(12)));
    assert_eq!(parse_numeric_string(b"1e"), NumericString::Leading(Number::Int(1)));
    assert_eq!(parse_numeric_string(b"abc"), NumericString::NonNumeric);
    assert_eq!(parse_numeric_string(b"."), NumericString::NonNumeric);
    assert_eq!(
        parse_numeric_string(b"99999999999999999999"),
        NumericString::Numeric(Number::Float(1e20))
    );
}

#[test]
fn test_float_to_int_wraps_out_of_range() {
    assert_eq!(float_to_int(3.99), 3);
    assert_eq!(float_to_int(-3.99), -3);
    assert_eq!(float_to_int(f64::NAN), 0);
    assert_eq!(float_to_int(f64::INFINITY), 0);
    assert_eq!(float_to_int(18_446_744_073_709_551_616.0 + 4096.0), 4096);
}

#[test]
fn test_json_rendering() {
    let mut map = PhpArray::new();
    map.insert(ArrayKey::String("a".into()), ConstValue::Int(1));
    map.insert(ArrayKey::Int(7), ConstValue::Array(PhpArray::from_list([ConstValue::Bool(true), ConstValue::Null])));
    let json = ConstValue::Array(map).to_json();
    assert_eq!(json, serde_json::json!({"a": 1, "7": [true, null]}));
    assert_eq!(
        ConstValue::EnumCase { class: "Suit".into(), case: "Hearts".into() }.to_json(),
        serde_json::json!("Suit::Hearts")
    );
}


#[test]
fn test_php_strings_hold_arbitrary_bytes() {
    let raw = PhpString::from(vec![b'a', 0xff]);
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.to_str(), None);
    assert_eq!(raw.to_string_lossy(), "a\u{fffd}");
    assert_eq!(format!("{raw:?}"), r#"b"a\xff""#);
    assert_eq!(format!("{:?}", PhpString::from("é")), "\"é\"");

    let value = ConstValue::String(raw);
    assert_eq!(value.as_str(), None);
    assert_eq!(value.as_bytes(), Some(&[b'a', 0xff][..]));
    assert_eq!(value.to_json(), serde_json::json!("a\u{fffd}"));
    assert!(ConstValue::String(PhpString::from(&[0x80_u8][..])).to_bool());
}
