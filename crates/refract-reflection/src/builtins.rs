//! Built-in constants and the allow-list of pure functions the evaluator may
//! call.

use crate::value::{ConstValue, PhpArray, PhpString};
use refract_common::limits::MAX_STR_REPEAT_LEN;

/// Value of a predefined global constant. `directory_separator` feeds
/// `DIRECTORY_SEPARATOR`.
pub fn builtin_constant(name: &str, directory_separator: char) -> Option<ConstValue> {
    use ConstValue::{Float, Int};
    let text = |value: &str| ConstValue::String(PhpString::from(value));
    let value = match name {
        "PHP_EOL" => text("\n"),
        "PHP_INT_MAX" => Int(i64::MAX),
        "PHP_INT_MIN" => Int(i64::MIN),
        "PHP_INT_SIZE" => Int(8),
        "PHP_FLOAT_EPSILON" => Float(f64::EPSILON),
        "PHP_FLOAT_MAX" => Float(f64::MAX),
        "PHP_FLOAT_MIN" => Float(f64::MIN_POSITIVE),
        "PHP_FLOAT_DIG" => Int(15),
        "PHP_VERSION" => text("8.3.0"),
        "PHP_MAJOR_VERSION" => Int(8),
        "PHP_MINOR_VERSION" => Int(3),
        "PHP_RELEASE_VERSION" => Int(0),
        "PHP_VERSION_ID" => Int(80300),
        "PHP_OS" | "PHP_OS_FAMILY" => text("Linux"),
        "PHP_MAXPATHLEN" => Int(4096),
        "DIRECTORY_SEPARATOR" => text(directory_separator.encode_utf8(&mut [0; 4])),
        "PATH_SEPARATOR" => text(if directory_separator == '\\' { ";" } else { ":" }),
        "NAN" => Float(f64::NAN),
        "INF" => Float(f64::INFINITY),
        "M_PI" => Float(std::f64::consts::PI),
        "M_E" => Float(std::f64::consts::E),
        "M_SQRT2" => Float(std::f64::consts::SQRT_2),
        "M_LN2" => Float(std::f64::consts::LN_2),
        "M_LN10" => Float(std::f64::consts::LN_10),
        "E_ERROR" => Int(1),
        "E_WARNING" => Int(2),
        "E_PARSE" => Int(4),
        "E_NOTICE" => Int(8),
        "E_CORE_ERROR" => Int(16),
        "E_CORE_WARNING" => Int(32),
        "E_COMPILE_ERROR" => Int(64),
        "E_COMPILE_WARNING" => Int(128),
        "E_USER_ERROR" => Int(256),
        "E_USER_WARNING" => Int(512),
        "E_USER_NOTICE" => Int(1024),
        "E_STRICT" => Int(2048),
        "E_RECOVERABLE_ERROR" => Int(4096),
        "E_DEPRECATED" => Int(8192),
        "E_USER_DEPRECATED" => Int(16384),
        "E_ALL" => Int(32767),
        "SORT_REGULAR" => Int(0),
        "SORT_NUMERIC" => Int(1),
        "SORT_STRING" => Int(2),
        "SORT_LOCALE_STRING" => Int(5),
        "SORT_NATURAL" => Int(6),
        "SORT_FLAG_CASE" => Int(8),
        "SORT_ASC" => Int(4),
        "SORT_DESC" => Int(3),
        "COUNT_NORMAL" => Int(0),
        "COUNT_RECURSIVE" => Int(1),
        "STR_PAD_LEFT" => Int(0),
        "STR_PAD_RIGHT" => Int(1),
        "STR_PAD_BOTH" => Int(2),
        "ENT_QUOTES" => Int(3),
        "ENT_HTML5" => Int(48),
        "JSON_HEX_TAG" => Int(1),
        "JSON_HEX_QUOT" => Int(8),
        "JSON_PRETTY_PRINT" => Int(128),
        "JSON_UNESCAPED_SLASHES" => Int(64),
        "JSON_UNESCAPED_UNICODE" => Int(256),
        "JSON_PRESERVE_ZERO_FRACTION" => Int(1024),
        "JSON_THROW_ON_ERROR" => Int(4_194_304),
        "ARRAY_FILTER_USE_BOTH" => Int(1),
        "ARRAY_FILTER_USE_KEY" => Int(2),
        "PREG_SPLIT_NO_EMPTY" => Int(1),
        "LC_ALL" => Int(6),
        _ => return None,
    };
    Some(value)
}

/// `true`, `false` and `null`, matched case-insensitively.
pub fn literal_constant(name: &str) -> Option<ConstValue> {
    if name.eq_ignore_ascii_case("true") {
        Some(ConstValue::Bool(true))
    } else if name.eq_ignore_ascii_case("false") {
        Some(ConstValue::Bool(false))
    } else if name.eq_ignore_ascii_case("null") {
        Some(ConstValue::Null)
    } else {
        None
    }
}

/// Allow-listed functions and their parameter names. `constant` is listed
/// here but needs name lookup, so the evaluator implements it.
const BUILTIN_FUNCTIONS: &[(&str, &[&str])] = &[
    ("dirname", &["path", "levels"]),
    ("basename", &["path", "suffix"]),
    ("strtolower", &["string"]),
    ("strtoupper", &["string"]),
    ("strlen", &["string"]),
    ("str_repeat", &["string", "times"]),
    ("implode", &["separator", "array"]),
    ("count", &["value", "mode"]),
    ("constant", &["name"]),
];

/// Parameter names of an allow-listed function (lowercase global name).
pub fn builtin_parameters(name: &str) -> Option<&'static [&'static str]> {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, params)| *params)
}

pub fn is_builtin_function(name: &str) -> bool {
    builtin_parameters(name).is_some()
}

fn string_arg(function: &str, position: usize, value: &ConstValue) -> Result<PhpString, String> {
    match value {
        ConstValue::Array(_) | ConstValue::EnumCase { .. } => Err(format!(
            "{function}(): Argument #{position} must be of type string, {} given",
            value.type_name()
        )),
        other => other.to_php_string(),
    }
}

fn int_arg(function: &str, position: usize, value: &ConstValue) -> Result<i64, String> {
    match value {
        ConstValue::Int(i) => Ok(*i),
        ConstValue::Bool(b) => Ok(i64::from(*b)),
        ConstValue::Null => Ok(0),
        ConstValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        ConstValue::String(s) => match crate::value::numeric_value(s.as_bytes()) {
            Some(crate::value::Number::Int(i)) => Ok(i),
            _ => Err(format!(
                "{function}(): Argument #{position} must be of type int, string given"
            )),
        },
        other => Err(format!(
            "{function}(): Argument #{position} must be of type int, {} given",
            other.type_name()
        )),
    }
}

fn arity(function: &str, args: &[ConstValue], min: usize, max: usize) -> Result<(), String> {
    if args.len() < min {
        return Err(format!(
            "Too few arguments to function {function}(), {} passed and at least {min} expected",
            args.len()
        ));
    }
    if args.len() > max {
        return Err(format!(
            "{function}() expects at most {max} arguments, {} given",
            args.len()
        ));
    }
    Ok(())
}

/// Call a pure built-in with positional arguments. `name` is the lowercase
/// global function name; `constant` is not handled here.
pub fn call_builtin(name: &str, args: &[ConstValue], directory_separator: char) -> Result<ConstValue, String> {
    match name {
        "dirname" => {
            arity(name, args, 1, 2)?;
            let path = string_arg(name, 1, &args[0])?;
            let levels = match args.get(1) {
                Some(value) => int_arg(name, 2, value)?,
                None => 1,
            };
            if levels < 1 {
                return Err(
                    "dirname(): Argument #2 ($levels) must be greater than or equal to 1"
                        .to_string(),
                );
            }
            let mut result = path.into_bytes();
            for _ in 0..levels {
                let parent = dirname(&result, directory_separator);
                if parent == result {
                    break;
                }
                result = parent;
            }
            Ok(ConstValue::String(PhpString::from(result)))
        }
        "basename" => {
            arity(name, args, 1, 2)?;
            let path = string_arg(name, 1, &args[0])?;
            let suffix = match args.get(1) {
                Some(value) => string_arg(name, 2, value)?,
                None => PhpString::new(),
            };
            let base = basename(path.as_bytes(), suffix.as_bytes(), directory_separator);
            Ok(ConstValue::String(PhpString::from(base)))
        }
        "strtolower" => {
            arity(name, args, 1, 1)?;
            let text = string_arg(name, 1, &args[0])?;
            Ok(ConstValue::String(PhpString::from(text.as_bytes().to_ascii_lowercase())))
        }
        "strtoupper" => {
            arity(name, args, 1, 1)?;
            let text = string_arg(name, 1, &args[0])?;
            Ok(ConstValue::String(PhpString::from(text.as_bytes().to_ascii_uppercase())))
        }
        "strlen" => {
            arity(name, args, 1, 1)?;
            Ok(ConstValue::Int(string_arg(name, 1, &args[0])?.len() as i64))
        }
        "str_repeat" => {
            arity(name, args, 2, 2)?;
            let text = string_arg(name, 1, &args[0])?;
            let times = int_arg(name, 2, &args[1])?;
            if times < 0 {
                return Err(
                    "str_repeat(): Argument #2 ($times) must be greater than or equal to 0"
                        .to_string(),
                );
            }
            let total = text.len().saturating_mul(times as usize);
            if total > MAX_STR_REPEAT_LEN {
                return Err(format!(
                    "str_repeat(): result of {total} bytes exceeds the limit of {MAX_STR_REPEAT_LEN}"
                ));
            }
            Ok(ConstValue::String(PhpString::from(text.as_bytes().repeat(times as usize))))
        }
        "implode" => {
            arity(name, args, 1, 2)?;
            let (separator, array) = match (&args[0], args.get(1)) {
                (ConstValue::Array(array), None) => (PhpString::new(), array),
                (separator, Some(ConstValue::Array(array))) => (string_arg(name, 1, separator)?, array),
                (ConstValue::Array(_), Some(_)) => {
                    return Err(
                        "implode(): Argument #2 ($array) must be of type ?array, string given"
                            .to_string(),
                    );
                }
                (_, None) => {
                    return Err(
                        "implode(): Argument #1 ($array) must be of type array, string given"
                            .to_string(),
                    );
                }
                (_, Some(other)) => {
                    return Err(format!(
                        "implode(): Argument #2 ($array) must be of type ?array, {} given",
                        other.type_name()
                    ));
                }
            };
            let parts = array
                .values()
                .map(ConstValue::to_php_string)
                .collect::<Result<Vec<_>, _>>()?;
            let parts: Vec<&[u8]> = parts.iter().map(PhpString::as_bytes).collect();
            Ok(ConstValue::String(PhpString::from(parts.join(separator.as_bytes()))))
        }
        "count" => {
            arity(name, args, 1, 2)?;
            let mode = match args.get(1) {
                Some(value) => int_arg(name, 2, value)?,
                None => 0,
            };
            match &args[0] {
                ConstValue::Array(array) => Ok(ConstValue::Int(count(array, mode == 1))),
                other => Err(format!(
                    "count(): Argument #1 ($value) must be of type Countable|array, {} given",
                    other.type_name()
                )),
            }
        }
        _ => Err(format!("Call to undefined function {name}()")),
    }
}

fn count(array: &PhpArray, recursive: bool) -> i64 {
    let mut total = array.len() as i64;
    if recursive {
        for value in array.values() {
            if let ConstValue::Array(nested) = value {
                total += count(nested, true);
            }
        }
    }
    total
}

fn is_separator(byte: u8, directory_separator: char) -> bool {
    byte == b'/' || u8::try_from(directory_separator).is_ok_and(|separator| byte == separator)
}

fn trim_separators(path: &[u8], directory_separator: char) -> &[u8] {
    let end = path
        .iter()
        .rposition(|byte| !is_separator(*byte, directory_separator))
        .map_or(0, |index| index + 1);
    &path[..end]
}

/// One level of `dirname`.
pub fn dirname(path: &[u8], directory_separator: char) -> Vec<u8> {
    if path.is_empty() {
        return Vec::new();
    }
    let trimmed = trim_separators(path, directory_separator);
    if trimmed.is_empty() {
        return path[..1].to_vec();
    }
    match trimmed.iter().rposition(|byte| is_separator(*byte, directory_separator)) {
        None => b".".to_vec(),
        Some(index) => {
            let parent = trim_separators(&trimmed[..index], directory_separator);
            if parent.is_empty() {
                path[..1].to_vec()
            } else {
                parent.to_vec()
            }
        }
    }
}

pub fn basename(path: &[u8], suffix: &[u8], directory_separator: char) -> Vec<u8> {
    let trimmed = trim_separators(path, directory_separator);
    let base = match trimmed.iter().rposition(|byte| is_separator(*byte, directory_separator)) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    };
    match base.strip_suffix(suffix) {
        Some(stripped) if !suffix.is_empty() && !stripped.is_empty() => stripped.to_vec(),
        _ => base.to_vec(),
    }
}
