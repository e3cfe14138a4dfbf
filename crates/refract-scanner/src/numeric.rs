//! Numeric literal parsing.
//!
//! Integer literals that do not fit in an `i64` become floats, the same way
//! PHP promotes them.

/// Value of a numeric literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericLiteral {
    Int(i64),
    Float(f64),
}

/// Parse an integer literal (`_` separators already removed).
/// Accepts decimal, `0x` hex, `0b` binary, `0o` and legacy leading-zero
/// octal.
pub fn parse_integer_literal(text: &str) -> NumericLiteral {
    let (digits, radix) = if let Some(rest) = strip_prefix_ci(text, "0x") {
        (rest, 16)
    } else if let Some(rest) = strip_prefix_ci(text, "0b") {
        (rest, 2)
    } else if let Some(rest) = strip_prefix_ci(text, "0o") {
        (rest, 8)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    if digits.is_empty() {
        return NumericLiteral::Int(0);
    }

    match i64::from_str_radix(digits, radix) {
        Ok(value) => NumericLiteral::Int(value),
        Err(_) => NumericLiteral::Float(accumulate_float(digits, radix)),
    }
}

/// Parse a float literal (`1.5`, `.5`, `1e3`, `1_000.0`).
pub fn parse_float_literal(text: &str) -> f64 {
    let cleaned: String;
    let text = if text.contains('_') {
        cleaned = text.replace('_', "");
        &cleaned
    } else {
        text
    };
    text.parse::<f64>().unwrap_or(0.0)
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn accumulate_float(digits: &str, radix: u32) -> f64 {
    if radix == 10 {
        return digits.parse::<f64>().unwrap_or(f64::INFINITY);
    }
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}
