//! Values produced by constant evaluation.
//!
//! `ConstValue` models the subset of PHP values a constant expression can
//! produce. Conversions follow PHP 8 rules (saner numeric strings, float to
//! string with 14 significant digits).

use indexmap::IndexMap;
use refract_common::limits::FLOAT_STRING_PRECISION;
use serde_json::{Map, Value as JsonValue};
use std::borrow::Cow;
use std::fmt;

/// A PHP string: bytes with no encoding attached. Escapes such as `"\xff"`
/// produce bytes that need not form valid UTF-8.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhpString(Vec<u8>);

impl PhpString {
    pub fn new() -> PhpString {
        PhpString::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The text, when the bytes are valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }
}

impl fmt::Debug for PhpString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(text) => write!(f, "{text:?}"),
            None => write!(f, "b\"{}\"", self.0.escape_ascii()),
        }
    }
}

impl fmt::Display for PhpString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for PhpString {
    fn from(value: &str) -> Self {
        PhpString(value.as_bytes().to_vec())
    }
}

impl From<String> for PhpString {
    fn from(value: String) -> Self {
        PhpString(value.into_bytes())
    }
}

impl From<&[u8]> for PhpString {
    fn from(value: &[u8]) -> Self {
        PhpString(value.to_vec())
    }
}

impl From<Vec<u8>> for PhpString {
    fn from(value: Vec<u8>) -> Self {
        PhpString(value)
    }
}

impl PartialEq<str> for PhpString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for PhpString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// Array key after PHP key normalization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayKey {
    Int(i64),
    String(PhpString),
}

impl ArrayKey {
    /// Key for a string offset. Canonical decimal integers (`"12"`, `"-3"`,
    /// but not `"012"` or `"-0"`) become integer keys.
    pub fn from_string(text: &PhpString) -> ArrayKey {
        match canonical_integer(text.as_bytes()) {
            Some(value) => ArrayKey::Int(value),
            None => ArrayKey::String(text.clone()),
        }
    }

    /// Key for an arbitrary value, or `None` for illegal offset types.
    pub fn from_value(value: &ConstValue) -> Option<ArrayKey> {
        match value {
            ConstValue::Null => Some(ArrayKey::String(PhpString::new())),
            ConstValue::Bool(b) => Some(ArrayKey::Int(i64::from(*b))),
            ConstValue::Int(i) => Some(ArrayKey::Int(*i)),
            ConstValue::Float(f) => Some(ArrayKey::Int(float_to_int(*f))),
            ConstValue::String(s) => Some(ArrayKey::from_string(s)),
            ConstValue::Array(_) | ConstValue::EnumCase { .. } => None,
        }
    }

    pub fn to_value(&self) -> ConstValue {
        match self {
            ArrayKey::Int(i) => ConstValue::Int(*i),
            ArrayKey::String(s) => ConstValue::String(s.clone()),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{i}"),
            ArrayKey::String(s) => write!(f, "\"{s}\""),
        }
    }
}

fn canonical_integer(text: &[u8]) -> Option<i64> {
    let digits = text.strip_prefix(b"-").unwrap_or(text);
    let canonical = !digits.is_empty()
        && digits.iter().all(u8::is_ascii_digit)
        && (digits == b"0" || !digits.starts_with(b"0"))
        && text != b"-0";
    if !canonical {
        return None;
    }
    std::str::from_utf8(text).ok()?.parse().ok()
}

/// Ordered PHP array.
#[derive(Clone, Debug)]
pub struct PhpArray {
    entries: IndexMap<ArrayKey, ConstValue>,
    /// Next implicit integer key; `None` once `i64::MAX` has been used.
    next_free: Option<i64>,
}

impl Default for PhpArray {
    fn default() -> Self {
        PhpArray {
            entries: IndexMap::new(),
            next_free: Some(0),
        }
    }
}

impl PhpArray {
    pub fn new() -> PhpArray {
        PhpArray::default()
    }

    /// Build a list with keys `0..n`.
    pub fn from_list(values: impl IntoIterator<Item = ConstValue>) -> PhpArray {
        let mut array = PhpArray::new();
        for value in values {
            // A fresh list cannot run out of keys.
            let _ = array.push(value);
        }
        array
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&ConstValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite in place. Overwriting keeps the original position.
    pub fn insert(&mut self, key: ArrayKey, value: ConstValue) {
        if let ArrayKey::Int(index) = key {
            if self.next_free.is_some_and(|next| index >= next) {
                self.next_free = index.checked_add(1);
            }
        }
        self.entries.insert(key, value);
    }

    /// Append under the next implicit key. Fails when the next key would
    /// overflow.
    pub fn push(&mut self, value: ConstValue) -> Result<(), String> {
        let Some(index) = self.next_free else {
            return Err(
                "Cannot add element to the array as the next element is already occupied"
                    .to_string(),
            );
        };
        self.insert(ArrayKey::Int(index), value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &ConstValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &ConstValue> {
        self.entries.values()
    }

    /// Whether keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(position, key)| *key == ArrayKey::Int(position as i64))
    }

    /// `$a + $b`: keys of `other` missing from `self` are appended.
    pub fn union(&self, other: &PhpArray) -> PhpArray {
        let mut result = self.clone();
        for (key, value) in other.iter() {
            if !result.contains_key(key) {
                result.insert(key.clone(), value.clone());
            }
        }
        result
    }
}

impl PartialEq for PhpArray {
    /// Same pairs in the same order.
    fn eq(&self, other: &PhpArray) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl FromIterator<(ArrayKey, ConstValue)> for PhpArray {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, ConstValue)>>(iter: I) -> PhpArray {
        let mut array = PhpArray::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

/// A constant-expression value.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(PhpString),
    Array(PhpArray),
    /// An enum case object.
    EnumCase { class: String, case: String },
}

/// Result of numeric coercion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn into_value(self) -> ConstValue {
        match self {
            Number::Int(i) => ConstValue::Int(i),
            Number::Float(f) => ConstValue::Float(f),
        }
    }
}

impl ConstValue {
    /// Type name as PHP's `get_debug_type` reports it.
    pub fn type_name(&self) -> &str {
        match self {
            ConstValue::Null => "null",
            ConstValue::Bool(_) => "bool",
            ConstValue::Int(_) => "int",
            ConstValue::Float(_) => "float",
            ConstValue::String(_) => "string",
            ConstValue::Array(_) => "array",
            ConstValue::EnumCase { class, .. } => class,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String contents, when they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => s.to_str(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ConstValue::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PhpArray> {
        match self {
            ConstValue::Array(array) => Some(array),
            _ => None,
        }
    }

    /// PHP truthiness.
    pub fn to_bool(&self) -> bool {
        match self {
            ConstValue::Null => false,
            ConstValue::Bool(b) => *b,
            ConstValue::Int(i) => *i != 0,
            ConstValue::Float(f) => *f != 0.0,
            ConstValue::String(s) => !(s.is_empty() || s.as_bytes() == b"0"),
            ConstValue::Array(array) => !array.is_empty(),
            ConstValue::EnumCase { .. } => true,
        }
    }

    /// String conversion. Arrays and enum cases have none.
    pub fn to_php_string(&self) -> Result<PhpString, String> {
        match self {
            ConstValue::Null => Ok(PhpString::new()),
            ConstValue::Bool(true) => Ok(PhpString::from("1")),
            ConstValue::Bool(false) => Ok(PhpString::new()),
            ConstValue::Int(i) => Ok(PhpString::from(i.to_string())),
            ConstValue::Float(f) => Ok(PhpString::from(format_float(*f))),
            ConstValue::String(s) => Ok(s.clone()),
            ConstValue::Array(_) => Err("Array to string conversion".to_string()),
            ConstValue::EnumCase { class, .. } => Err(format!(
                "Object of class {class} could not be converted to string"
            )),
        }
    }

    /// Render as JSON: lists become arrays, other arrays objects, enum cases
    /// `Class::Case` strings and non-finite floats `null`. Strings that are
    /// not valid UTF-8 are converted lossily.
    pub fn to_json(&self) -> JsonValue {
        match self {
            ConstValue::Null => JsonValue::Null,
            ConstValue::Bool(b) => JsonValue::Bool(*b),
            ConstValue::Int(i) => JsonValue::from(*i),
            ConstValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ConstValue::String(s) => JsonValue::String(s.to_string_lossy().into_owned()),
            ConstValue::Array(array) if array.is_list() => {
                JsonValue::Array(array.values().map(ConstValue::to_json).collect())
            }
            ConstValue::Array(array) => {
                let mut object = Map::new();
                for (key, value) in array.iter() {
                    let key = match key {
                        ArrayKey::Int(i) => i.to_string(),
                        ArrayKey::String(s) => s.to_string_lossy().into_owned(),
                    };
                    object.insert(key, value.to_json());
                }
                JsonValue::Object(object)
            }
            ConstValue::EnumCase { class, case } => JsonValue::String(format!("{class}::{case}")),
        }
    }
}

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Bool(value)
    }
}

impl From<i64> for ConstValue {
    fn from(value: i64) -> Self {
        ConstValue::Int(value)
    }
}

impl From<f64> for ConstValue {
    fn from(value: f64) -> Self {
        ConstValue::Float(value)
    }
}

impl From<&str> for ConstValue {
    fn from(value: &str) -> Self {
        ConstValue::String(PhpString::from(value))
    }
}

impl From<String> for ConstValue {
    fn from(value: String) -> Self {
        ConstValue::String(PhpString::from(value))
    }
}

impl From<PhpString> for ConstValue {
    fn from(value: PhpString) -> Self {
        ConstValue::String(value)
    }
}

impl From<PhpArray> for ConstValue {
    fn from(value: PhpArray) -> Self {
        ConstValue::Array(value)
    }
}

// =============================================================================
// Numeric strings
// =============================================================================

/// How much of a string is numeric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericString {
    /// The whole string (surrounding whitespace allowed).
    Numeric(Number),
    /// A numeric prefix followed by other characters (`"12abc"`).
    Leading(Number),
    NonNumeric,
}

fn is_numeric_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Classify a string under PHP 8 numeric-string rules.
pub fn parse_numeric_string(bytes: &[u8]) -> NumericString {
    let len = bytes.len();
    let mut i = 0;
    while i < len && is_numeric_whitespace(bytes[i]) {
        i += 1;
    }
    let start = i;
    if i < len && matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }

    let int_start = i;
    while i < len && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut is_float = false;
    let mut frac_digits = 0;
    if i < len && bytes[i] == b'.' {
        let dot = i;
        i += 1;
        let frac_start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
        if int_digits == 0 && frac_digits == 0 {
            i = dot;
        } else {
            is_float = true;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return NumericString::NonNumeric;
    }

    if i < len && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < len && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
            is_float = true;
        }
    }

    let end = i;
    while i < len && is_numeric_whitespace(bytes[i]) {
        i += 1;
    }

    // Only ASCII digits, signs, dots and exponents in range.
    let literal = std::str::from_utf8(&bytes[start..end]).unwrap_or("0");
    let number = if is_float {
        Number::Float(literal.parse().unwrap_or(0.0))
    } else {
        match literal.parse::<i64>() {
            Ok(value) => Number::Int(value),
            Err(_) => Number::Float(literal.parse().unwrap_or(0.0)),
        }
    };

    if i == len {
        NumericString::Numeric(number)
    } else {
        NumericString::Leading(number)
    }
}

/// Whole-string numeric value, if any.
pub fn numeric_value(bytes: &[u8]) -> Option<Number> {
    match parse_numeric_string(bytes) {
        NumericString::Numeric(number) => Some(number),
        _ => None,
    }
}

// =============================================================================
// Float conversions
// =============================================================================

/// Float to int the way PHP does on 64-bit targets: truncation, modular
/// wrap-around when out of range, zero for NaN and infinities.
pub fn float_to_int(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let truncated = value.trunc();
    if truncated >= -9.223_372_036_854_775_808e18 && truncated < 9.223_372_036_854_775_808e18 {
        return truncated as i64;
    }
    let two_pow_64 = 18_446_744_073_709_551_616.0_f64;
    let mut wrapped = truncated % two_pow_64;
    if wrapped < 0.0 {
        wrapped += two_pow_64;
    }
    if wrapped >= 9.223_372_036_854_775_808e18 {
        wrapped -= two_pow_64;
    }
    wrapped as i64
}

/// Float to string with PHP's default precision (`1.0E+25`, `0.1`, `-0`).
pub fn format_float(value: f64) -> String {
    format_float_with_precision(value, FLOAT_STRING_PRECISION)
}

/// `%.{precision}G` with PHP's `.0` mantissa suffix in exponent form.
pub fn format_float_with_precision(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let all_digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = all_digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }

    if exponent < -4 || exponent >= precision as i32 {
        out.push_str(&digits[..1]);
        out.push('.');
        if digits.len() > 1 {
            out.push_str(&digits[1..]);
        } else {
            out.push('0');
        }
        out.push('E');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&exponent.unsigned_abs().to_string());
    } else if exponent < 0 {
        out.push_str("0.");
        for _ in 0..(-exponent - 1) {
            out.push('0');
        }
        out.push_str(digits);
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            out.push_str(digits);
            for _ in digits.len()..int_len {
                out.push('0');
            }
        } else {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        }
    }
    out
}
