//! Tests for operator semantics.

use super::*;
use crate::ops::{binary, bitwise_not, loose_equals, negate, spaceship, strict_equals};
use refract_scanner::SyntaxKind;

fn int(value: i64) -> ConstValue {
    ConstValue::Int(value)
}

fn list(values: &[i64]) -> ConstValue {
    ConstValue::Array(PhpArray::from_list(values.iter().copied().map(ConstValue::Int)))
}

#[test]
fn test_integer_overflow_becomes_float() {
    assert_eq!(
        binary(SyntaxKind::PlusToken, &int(i64::MAX), &int(1)),
        Ok(ConstValue::Float(9.223_372_036_854_775_808e18))
    );
    assert_eq!(
        binary(SyntaxKind::AsteriskToken, &int(i64::MAX), &int(2)),
        Ok(ConstValue::Float(1.844_674_407_370_955_2e19))
    );
    assert_eq!(negate(&int(i64::MIN)), Ok(ConstValue::Float(9.223_372_036_854_775_808e18)));
}

#[test]
fn test_division() {
    assert_eq!(binary(SyntaxKind::SlashToken, &int(6), &int(3)), Ok(int(2)));
    assert_eq!(binary(SyntaxKind::SlashToken, &int(7), &int(2)), Ok(ConstValue::Float(3.5)));
    assert_eq!(
        binary(SyntaxKind::SlashToken, &int(1), &int(0)),
        Err("Division by zero".to_string())
    );
    assert_eq!(
        binary(SyntaxKind::PercentToken, &int(1), &int(0)),
        Err("Modulo by zero".to_string())
    );
    assert_eq!(binary(SyntaxKind::PercentToken, &int(i64::MIN), &int(-1)), Ok(int(0)));
    assert_eq!(binary(SyntaxKind::PercentToken, &int(-7), &int(3)), Ok(int(-1)));
}

#[test]
fn test_power() {
    assert_eq!(binary(SyntaxKind::AsteriskAsteriskToken, &int(2), &int(10)), Ok(int(1024)));
    assert_eq!(
        binary(SyntaxKind::AsteriskAsteriskToken, &int(2), &int(-1)),
        Ok(ConstValue::Float(0.5))
    );
    assert_eq!(
        binary(SyntaxKind::AsteriskAsteriskToken, &int(2), &int(64)),
        Ok(ConstValue::Float(18_446_744_073_709_551_616.0))
    );
}

#[test]
fn test_numeric_strings_in_arithmetic() {
    assert_eq!(
        binary(SyntaxKind::PlusToken, &ConstValue::from("5"), &ConstValue::from("3")),
        Ok(int(8))
    );
    assert_eq!(
        binary(SyntaxKind::PlusToken, &ConstValue::from("1.5"), &int(1)),
        Ok(ConstValue::Float(2.5))
    );
    assert_eq!(binary(SyntaxKind::PlusToken, &ConstValue::from("12abc"), &int(1)), Ok(int(13)));
    assert_eq!(
        binary(SyntaxKind::PlusToken, &ConstValue::from("abc"), &int(1)),
        Err("Unsupported operand types: string + int".to_string())
    );
    assert_eq!(
        binary(SyntaxKind::MinusToken, &list(&[1]), &int(1)),
        Err("Unsupported operand types: array - int".to_string())
    );
}

#[test]
fn test_concatenation_formats_floats() {
    assert_eq!(
        binary(SyntaxKind::DotToken, &ConstValue::from("v"), &ConstValue::Float(0.1 + 0.2)),
        Ok(ConstValue::from("v0.3"))
    );
    assert_eq!(
        binary(SyntaxKind::DotToken, &ConstValue::Bool(true), &ConstValue::Null),
        Ok(ConstValue::from("1"))
    );
    assert_eq!(
        binary(SyntaxKind::DotToken, &list(&[]), &ConstValue::from("x")),
        Err("Array to string conversion".to_string())
    );
}

#[test]
fn test_array_union() {
    assert_eq!(binary(SyntaxKind::PlusToken, &list(&[1]), &list(&[7, 8])), Ok(list(&[1, 8])));
}

#[test]
fn test_bitwise() {
    assert_eq!(binary(SyntaxKind::BarToken, &int(1), &int(4)), Ok(int(5)));
    assert_eq!(binary(SyntaxKind::AmpersandToken, &int(6), &int(3)), Ok(int(2)));
    assert_eq!(binary(SyntaxKind::CaretToken, &int(6), &int(3)), Ok(int(5)));
    assert_eq!(binary(SyntaxKind::LessThanLessThanToken, &int(1), &int(3)), Ok(int(8)));
    assert_eq!(binary(SyntaxKind::LessThanLessThanToken, &int(1), &int(64)), Ok(int(0)));
    assert_eq!(binary(SyntaxKind::GreaterThanGreaterThanToken, &int(-8), &int(70)), Ok(int(-1)));
    assert_eq!(
        binary(SyntaxKind::LessThanLessThanToken, &int(1), &int(-1)),
        Err("Bit shift by negative number".to_string())
    );
    assert_eq!(bitwise_not(&int(5)), Ok(int(-6)));
    assert_eq!(
        binary(SyntaxKind::BarToken, &ConstValue::from("a"), &ConstValue::from(" ")),
        Ok(ConstValue::from("a"))
    );
    // String operands work byte by byte and may leave UTF-8.
    let bytes = |raw: &[u8]| ConstValue::String(PhpString::from(raw));
    assert_eq!(bitwise_not(&ConstValue::from("a")), Ok(bytes(&[0x9e])));
    assert_eq!(
        binary(SyntaxKind::CaretToken, &bytes(&[0xff, 0x0f]), &ConstValue::from("\u{7f}")),
        Ok(bytes(&[0x80]))
    );
}

#[test]
fn test_loose_comparison() {
    assert!(loose_equals(&int(1), &ConstValue::from("1")));
    assert!(loose_equals(&int(100), &ConstValue::from("1e2")));
    assert!(!loose_equals(&int(0), &ConstValue::from("abc")));
    assert!(loose_equals(&ConstValue::Null, &ConstValue::Bool(false)));
    assert!(loose_equals(&ConstValue::Null, &ConstValue::from("")));
    assert!(loose_equals(&ConstValue::from("abc"), &ConstValue::Bool(true)));
    assert!(loose_equals(&ConstValue::from("1.0"), &ConstValue::from("01")));
    assert!(!strict_equals(&int(1), &ConstValue::Float(1.0)));
    assert!(strict_equals(&list(&[1, 2]), &list(&[1, 2])));
}

#[test]
fn test_spaceship() {
    assert_eq!(spaceship(&int(1), &int(2)), -1);
    assert_eq!(spaceship(&ConstValue::from("b"), &ConstValue::from("a")), 1);
    assert_eq!(spaceship(&int(1), &ConstValue::from("1")), 0);
    assert_eq!(spaceship(&list(&[1, 2]), &list(&[1, 3])), -1);
    assert_eq!(spaceship(&list(&[1, 2, 3]), &list(&[9])), 1);
    assert_eq!(
        binary(SyntaxKind::SpaceshipToken, &ConstValue::Float(1.5), &int(1)),
        Ok(int(1))
    );
}
