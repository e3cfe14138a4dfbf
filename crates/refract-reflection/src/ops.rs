//! PHP 8 operator semantics over [`ConstValue`].
//!
//! Errors are returned as the message PHP would throw; the evaluator adds
//! the source location.

use crate::value::{ConstValue, Number, NumericString, PhpString, float_to_int, numeric_value, parse_numeric_string};
use refract_scanner::SyntaxKind;
use std::cmp::Ordering;

pub type OpResult = Result<ConstValue, String>;

/// Source spelling of an operator, for messages.
pub fn operator_symbol(op: SyntaxKind) -> &'static str {
    match op {
        SyntaxKind::PlusToken => "+",
        SyntaxKind::MinusToken => "-",
        SyntaxKind::AsteriskToken => "*",
        SyntaxKind::SlashToken => "/",
        SyntaxKind::PercentToken => "%",
        SyntaxKind::AsteriskAsteriskToken => "**",
        SyntaxKind::DotToken => ".",
        SyntaxKind::AmpersandToken => "&",
        SyntaxKind::BarToken => "|",
        SyntaxKind::CaretToken => "^",
        SyntaxKind::LessThanLessThanToken => "<<",
        SyntaxKind::GreaterThanGreaterThanToken => ">>",
        SyntaxKind::EqualsEqualsToken => "==",
        SyntaxKind::ExclamationEqualsToken => "!=",
        SyntaxKind::EqualsEqualsEqualsToken => "===",
        SyntaxKind::ExclamationEqualsEqualsToken => "!==",
        SyntaxKind::LessThanToken => "<",
        SyntaxKind::LessThanEqualsToken => "<=",
        SyntaxKind::GreaterThanToken => ">",
        SyntaxKind::GreaterThanEqualsToken => ">=",
        SyntaxKind::SpaceshipToken => "<=>",
        SyntaxKind::AmpersandAmpersandToken | SyntaxKind::AndKeyword => "&&",
        SyntaxKind::BarBarToken | SyntaxKind::OrKeyword => "||",
        SyntaxKind::XorKeyword => "xor",
        SyntaxKind::QuestionQuestionToken => "??",
        _ => "?",
    }
}

/// Apply a non-short-circuiting binary operator.
pub fn binary(op: SyntaxKind, left: &ConstValue, right: &ConstValue) -> OpResult {
    match op {
        SyntaxKind::PlusToken => add(left, right),
        SyntaxKind::MinusToken => arithmetic(op, left, right, sub_numbers),
        SyntaxKind::AsteriskToken => arithmetic(op, left, right, mul_numbers),
        SyntaxKind::SlashToken => divide(left, right),
        SyntaxKind::PercentToken => modulo(left, right),
        SyntaxKind::AsteriskAsteriskToken => arithmetic(op, left, right, pow_numbers),
        SyntaxKind::DotToken => concat(left, right),
        SyntaxKind::AmpersandToken | SyntaxKind::BarToken | SyntaxKind::CaretToken => {
            bitwise(op, left, right)
        }
        SyntaxKind::LessThanLessThanToken | SyntaxKind::GreaterThanGreaterThanToken => {
            shift(op, left, right)
        }
        SyntaxKind::EqualsEqualsToken => Ok(ConstValue::Bool(loose_equals(left, right))),
        SyntaxKind::ExclamationEqualsToken => Ok(ConstValue::Bool(!loose_equals(left, right))),
        SyntaxKind::EqualsEqualsEqualsToken => Ok(ConstValue::Bool(strict_equals(left, right))),
        SyntaxKind::ExclamationEqualsEqualsToken => {
            Ok(ConstValue::Bool(!strict_equals(left, right)))
        }
        SyntaxKind::LessThanToken => Ok(ConstValue::Bool(
            loose_compare(left, right) == Some(Ordering::Less),
        )),
        SyntaxKind::LessThanEqualsToken => Ok(ConstValue::Bool(matches!(
            loose_compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        SyntaxKind::GreaterThanToken => Ok(ConstValue::Bool(
            loose_compare(left, right) == Some(Ordering::Greater),
        )),
        SyntaxKind::GreaterThanEqualsToken => Ok(ConstValue::Bool(matches!(
            loose_compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        SyntaxKind::SpaceshipToken => Ok(ConstValue::Int(spaceship(left, right))),
        SyntaxKind::XorKeyword => Ok(ConstValue::Bool(left.to_bool() ^ right.to_bool())),
        SyntaxKind::AmpersandAmpersandToken | SyntaxKind::AndKeyword => {
            Ok(ConstValue::Bool(left.to_bool() && right.to_bool()))
        }
        SyntaxKind::BarBarToken | SyntaxKind::OrKeyword => {
            Ok(ConstValue::Bool(left.to_bool() || right.to_bool()))
        }
        _ => Err(format!("Unsupported operator {op:?}")),
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

fn unsupported(op: SyntaxKind, left: &ConstValue, right: &ConstValue) -> String {
    format!(
        "Unsupported operand types: {} {} {}",
        left.type_name(),
        operator_symbol(op),
        right.type_name()
    )
}

/// Numeric value for arithmetic. Leading-numeric strings use their prefix;
/// non-numeric strings, arrays and objects have none.
fn to_number(value: &ConstValue) -> Option<Number> {
    match value {
        ConstValue::Null => Some(Number::Int(0)),
        ConstValue::Bool(b) => Some(Number::Int(i64::from(*b))),
        ConstValue::Int(i) => Some(Number::Int(*i)),
        ConstValue::Float(f) => Some(Number::Float(*f)),
        ConstValue::String(s) => match parse_numeric_string(s.as_bytes()) {
            NumericString::Numeric(n) | NumericString::Leading(n) => Some(n),
            NumericString::NonNumeric => None,
        },
        ConstValue::Array(_) | ConstValue::EnumCase { .. } => None,
    }
}

fn operands(op: SyntaxKind, left: &ConstValue, right: &ConstValue) -> Result<(Number, Number), String> {
    match (to_number(left), to_number(right)) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(unsupported(op, left, right)),
    }
}

fn arithmetic(
    op: SyntaxKind,
    left: &ConstValue,
    right: &ConstValue,
    apply: fn(Number, Number) -> Number,
) -> OpResult {
    let (l, r) = operands(op, left, right)?;
    Ok(apply(l, r).into_value())
}

fn add(left: &ConstValue, right: &ConstValue) -> OpResult {
    if let (ConstValue::Array(l), ConstValue::Array(r)) = (left, right) {
        return Ok(ConstValue::Array(l.union(r)));
    }
    arithmetic(SyntaxKind::PlusToken, left, right, add_numbers)
}

fn add_numbers(l: Number, r: Number) -> Number {
    match (l, r) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_add(b)
            .map_or(Number::Float(a as f64 + b as f64), Number::Int),
        _ => Number::Float(l.to_f64() + r.to_f64()),
    }
}

fn sub_numbers(l: Number, r: Number) -> Number {
    match (l, r) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_sub(b)
            .map_or(Number::Float(a as f64 - b as f64), Number::Int),
        _ => Number::Float(l.to_f64() - r.to_f64()),
    }
}

fn mul_numbers(l: Number, r: Number) -> Number {
    match (l, r) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_mul(b)
            .map_or(Number::Float(a as f64 * b as f64), Number::Int),
        _ => Number::Float(l.to_f64() * r.to_f64()),
    }
}

fn pow_numbers(l: Number, r: Number) -> Number {
    match (l, r) {
        (Number::Int(base), Number::Int(exp)) if exp >= 0 => u32::try_from(exp)
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .map_or_else(
                || Number::Float((base as f64).powf(exp as f64)),
                Number::Int,
            ),
        _ => Number::Float(l.to_f64().powf(r.to_f64())),
    }
}

fn divide(left: &ConstValue, right: &ConstValue) -> OpResult {
    let (l, r) = operands(SyntaxKind::SlashToken, left, right)?;
    if r.to_f64() == 0.0 {
        return Err("Division by zero".to_string());
    }
    let result = match (l, r) {
        (Number::Int(a), Number::Int(b)) => match a.checked_rem(b) {
            Some(0) => a
                .checked_div(b)
                .map_or(ConstValue::Float(a as f64 / b as f64), ConstValue::Int),
            _ => ConstValue::Float(a as f64 / b as f64),
        },
        _ => ConstValue::Float(l.to_f64() / r.to_f64()),
    };
    Ok(result)
}

fn modulo(left: &ConstValue, right: &ConstValue) -> OpResult {
    let (l, r) = operands(SyntaxKind::PercentToken, left, right)?;
    let (a, b) = (number_to_int(l), number_to_int(r));
    if b == 0 {
        return Err("Modulo by zero".to_string());
    }
    // i64::MIN % -1 overflows; PHP defines it as 0.
    Ok(ConstValue::Int(a.checked_rem(b).unwrap_or(0)))
}

fn number_to_int(number: Number) -> i64 {
    match number {
        Number::Int(i) => i,
        Number::Float(f) => float_to_int(f),
    }
}

/// `-x` (compiled by PHP as `x * -1`).
pub fn negate(value: &ConstValue) -> OpResult {
    arithmetic(SyntaxKind::AsteriskToken, value, &ConstValue::Int(-1), mul_numbers)
}

/// `+x` (compiled by PHP as `x * 1`).
pub fn identity(value: &ConstValue) -> OpResult {
    arithmetic(SyntaxKind::AsteriskToken, value, &ConstValue::Int(1), mul_numbers)
}

// =============================================================================
// Strings and bits
// =============================================================================

fn concat(left: &ConstValue, right: &ConstValue) -> OpResult {
    let mut text = left.to_php_string()?;
    text.push_bytes(right.to_php_string()?.as_bytes());
    Ok(ConstValue::String(text))
}

fn bitwise(op: SyntaxKind, left: &ConstValue, right: &ConstValue) -> OpResult {
    if let (ConstValue::String(l), ConstValue::String(r)) = (left, right) {
        let (l, r) = (l.as_bytes(), r.as_bytes());
        let bytes: Vec<u8> = match op {
            SyntaxKind::BarToken => (0..l.len().max(r.len()))
                .map(|i| l.get(i).copied().unwrap_or(0) | r.get(i).copied().unwrap_or(0))
                .collect(),
            SyntaxKind::AmpersandToken => l.iter().zip(r).map(|(a, b)| a & b).collect(),
            _ => l.iter().zip(r).map(|(a, b)| a ^ b).collect(),
        };
        return Ok(ConstValue::String(PhpString::from(bytes)));
    }

    let (l, r) = int_operands(op, left, right)?;
    let result = match op {
        SyntaxKind::AmpersandToken => l & r,
        SyntaxKind::BarToken => l | r,
        _ => l ^ r,
    };
    Ok(ConstValue::Int(result))
}

fn int_operands(op: SyntaxKind, left: &ConstValue, right: &ConstValue) -> Result<(i64, i64), String> {
    let (l, r) = operands(op, left, right)?;
    Ok((number_to_int(l), number_to_int(r)))
}

fn shift(op: SyntaxKind, left: &ConstValue, right: &ConstValue) -> OpResult {
    let (value, amount) = int_operands(op, left, right)?;
    if amount < 0 {
        return Err("Bit shift by negative number".to_string());
    }
    let result = if op == SyntaxKind::LessThanLessThanToken {
        if amount >= 64 { 0 } else { value.wrapping_shl(amount as u32) }
    } else if amount >= 64 {
        if value < 0 { -1 } else { 0 }
    } else {
        value >> amount
    };
    Ok(ConstValue::Int(result))
}

/// `~x`.
pub fn bitwise_not(value: &ConstValue) -> OpResult {
    match value {
        ConstValue::Int(i) => Ok(ConstValue::Int(!i)),
        ConstValue::Float(f) => Ok(ConstValue::Int(!float_to_int(*f))),
        ConstValue::String(s) => Ok(ConstValue::String(PhpString::from(
            s.as_bytes().iter().map(|b| !b).collect::<Vec<u8>>(),
        ))),
        other => Err(format!("Cannot perform bitwise not on {}", other.type_name())),
    }
}

// =============================================================================
// Comparison
// =============================================================================

fn compare_numbers(l: Number, r: Number) -> Option<Ordering> {
    match (l, r) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        _ => l.to_f64().partial_cmp(&r.to_f64()),
    }
}

fn scalar_number(value: &ConstValue) -> Option<Number> {
    match value {
        ConstValue::Int(i) => Some(Number::Int(*i)),
        ConstValue::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

/// PHP 8 loose comparison; `None` when the operands are uncomparable.
pub fn loose_compare(left: &ConstValue, right: &ConstValue) -> Option<Ordering> {
    use ConstValue as V;
    match (left, right) {
        (V::Null, V::Null) => Some(Ordering::Equal),
        (V::String(l), V::String(r)) => match (numeric_value(l.as_bytes()), numeric_value(r.as_bytes())) {
            (Some(a), Some(b)) => compare_numbers(a, b),
            _ => Some(l.as_bytes().cmp(r.as_bytes())),
        },
        (V::Bool(_), _) | (_, V::Bool(_)) => Some(left.to_bool().cmp(&right.to_bool())),
        (V::Null, V::String(s)) => Some(b"".as_slice().cmp(s.as_bytes())),
        (V::String(s), V::Null) => Some(s.as_bytes().cmp(b"".as_slice())),
        (V::Null, _) | (_, V::Null) => Some(left.to_bool().cmp(&right.to_bool())),
        (V::Int(_) | V::Float(_), V::Int(_) | V::Float(_)) => {
            compare_numbers(scalar_number(left)?, scalar_number(right)?)
        }
        (V::Int(_) | V::Float(_), V::String(s)) => {
            let number = scalar_number(left)?;
            match numeric_value(s.as_bytes()) {
                Some(other) => compare_numbers(number, other),
                None => {
                    let text = left.to_php_string().ok()?;
                    Some(text.as_bytes().cmp(s.as_bytes()))
                }
            }
        }
        (V::String(_), V::Int(_) | V::Float(_)) => {
            loose_compare(right, left).map(Ordering::reverse)
        }
        (V::Array(l), V::Array(r)) => {
            if l.len() != r.len() {
                return Some(l.len().cmp(&r.len()));
            }
            for (key, value) in l.iter() {
                let other = r.get(key)?;
                match loose_compare(value, other)? {
                    Ordering::Equal => {}
                    unequal => return Some(unequal),
                }
            }
            Some(Ordering::Equal)
        }
        (V::Array(_), _) => Some(Ordering::Greater),
        (_, V::Array(_)) => Some(Ordering::Less),
        (V::EnumCase { .. }, V::EnumCase { .. }) => (left == right).then_some(Ordering::Equal),
        _ => None,
    }
}

pub fn loose_equals(left: &ConstValue, right: &ConstValue) -> bool {
    loose_compare(left, right) == Some(Ordering::Equal)
}

/// `<=>`; uncomparable operands yield 1 as in PHP.
pub fn spaceship(left: &ConstValue, right: &ConstValue) -> i64 {
    match loose_compare(left, right) {
        Some(Ordering::Less) => -1,
        Some(Ordering::Equal) => 0,
        _ => 1,
    }
}

/// `===`.
pub fn strict_equals(left: &ConstValue, right: &ConstValue) -> bool {
    use ConstValue as V;
    match (left, right) {
        (V::Null, V::Null) => true,
        (V::Bool(a), V::Bool(b)) => a == b,
        (V::Int(a), V::Int(b)) => a == b,
        (V::Float(a), V::Float(b)) => a == b,
        (V::String(a), V::String(b)) => a == b,
        (V::Array(a), V::Array(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && strict_equals(va, vb))
        }
        (V::EnumCase { .. }, V::EnumCase { .. }) => left == right,
        _ => false,
    }
}
