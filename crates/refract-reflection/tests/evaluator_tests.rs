//! Tests for constant-expression evaluation.

use super::*;
use std::path::PathBuf;

const PATH: &str = "/virtual/eval.php";

fn load(reflector: &Reflector, source: &str) {
    reflector.reflect_source(PATH, source).expect("valid source");
}

/// Value of the namespace constant `name` declared in `source`.
fn constant_in(source: &str, name: &str) -> Result<ConstValue> {
    let reflector = Reflector::new(NullLocator);
    load(&reflector, source);
    reflector.reflect_constant(name)?.value()
}

/// Value of `expr` as the initializer of a global constant.
fn eval(expr: &str) -> Result<ConstValue> {
    constant_in(&format!("<?php\nconst X = {expr};\n"), "X")
}

fn message(err: ReflectionError) -> String {
    match err {
        ReflectionError::Evaluation { message, .. } => message,
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

fn unresolvable_kind(err: ReflectionError) -> String {
    match err {
        ReflectionError::UnresolvableConstantExpression { kind, .. } => kind,
        other => panic!("expected an unresolvable expression, got {other:?}"),
    }
}

fn s(text: &str) -> ConstValue {
    ConstValue::from(text)
}

fn array(entries: Vec<(ArrayKey, ConstValue)>) -> ConstValue {
    ConstValue::Array(entries.into_iter().collect())
}

// =============================================================================
// Scalars and operators
// =============================================================================

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Ok(ConstValue::Int(7)));
    assert_eq!(eval("(1 + 2) * 3"), Ok(ConstValue::Int(9)));
    assert_eq!(eval("2 ** 3 ** 2"), Ok(ConstValue::Int(512)));
    assert_eq!(eval("-PHP_INT_MAX - 2"), Ok(ConstValue::Float(-9.223_372_036_854_775_808e18)));
    assert_eq!(eval("'v' . 1.0"), Ok(s("v1")));
    assert_eq!(eval("!0"), Ok(ConstValue::Bool(true)));
    assert_eq!(eval("~0"), Ok(ConstValue::Int(-1)));
}

#[test]
fn test_runtime_errors_carry_location() {
    let err = eval("1 / 0").expect_err("division by zero");
    assert_eq!(
        err,
        ReflectionError::Evaluation {
            message: "Division by zero".to_string(),
            file: PathBuf::from(PATH),
            line: 2,
        }
    );
    assert_eq!(err.to_string(), "Division by zero in /virtual/eval.php on line 2");
}

#[test]
fn test_ternaries_and_coalesce() {
    assert_eq!(eval("true ? 'yes' : 'no'"), Ok(s("yes")));
    assert_eq!(eval("0 ?: 'fallback'"), Ok(s("fallback")));
    assert_eq!(eval("'set' ?: 'fallback'"), Ok(s("set")));
    assert_eq!(eval("null ?? 'default'"), Ok(s("default")));
    assert_eq!(eval("[1, 2][5] ?? 'missing'"), Ok(s("missing")));
    assert_eq!(eval("['a' => null]['a'] ?? 2"), Ok(ConstValue::Int(2)));
    assert_eq!(eval("['a' => ['b' => 1]]['a']['c'] ?? 3"), Ok(ConstValue::Int(3)));
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_eq!(eval("false && UNDEFINED_THING"), Ok(ConstValue::Bool(false)));
    assert_eq!(eval("true || UNDEFINED_THING"), Ok(ConstValue::Bool(true)));
    assert_eq!(eval("1 and 2"), Ok(ConstValue::Bool(true)));
    assert_eq!(
        eval("true && UNDEFINED_THING"),
        Err(ReflectionError::ConstantNotFound { name: "UNDEFINED_THING".to_string() })
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("1 == '1'"), Ok(ConstValue::Bool(true)));
    assert_eq!(eval("1 === '1'"), Ok(ConstValue::Bool(false)));
    assert_eq!(eval("0 == 'a'"), Ok(ConstValue::Bool(false)));
    assert_eq!(eval("[1, 2] <=> [1, 3]"), Ok(ConstValue::Int(-1)));
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn test_array_keys_are_normalized_and_implicit_keys_continue() {
    assert_eq!(
        eval("[1, 2, 'k' => 3, 4]"),
        Ok(array(vec![
            (ArrayKey::Int(0), ConstValue::Int(1)),
            (ArrayKey::Int(1), ConstValue::Int(2)),
            (ArrayKey::String("k".into()), ConstValue::Int(3)),
            (ArrayKey::Int(2), ConstValue::Int(4)),
        ]))
    );
    assert_eq!(
        eval("['1' => 'a', '01' => 'b', true => 'c', 1.7 => 'd', null => 'e']"),
        Ok(array(vec![
            (ArrayKey::Int(1), s("d")),
            (ArrayKey::String("01".into()), s("b")),
            (ArrayKey::String(PhpString::new()), s("e")),
        ]))
    );
    assert_eq!(
        eval("[5 => 'a', 'b', -10 => 'c', 'd']"),
        Ok(array(vec![
            (ArrayKey::Int(5), s("a")),
            (ArrayKey::Int(6), s("b")),
            (ArrayKey::Int(-10), s("c")),
            (ArrayKey::Int(7), s("d")),
        ]))
    );
}

#[test]
fn test_array_spread_renumbers_integer_keys() {
    assert_eq!(
        eval("[0, ...[5 => 1, 6 => 2], ...['a' => 3], 4]"),
        Ok(array(vec![
            (ArrayKey::Int(0), ConstValue::Int(0)),
            (ArrayKey::Int(1), ConstValue::Int(1)),
            (ArrayKey::Int(2), ConstValue::Int(2)),
            (ArrayKey::String("a".into()), ConstValue::Int(3)),
            (ArrayKey::Int(3), ConstValue::Int(4)),
        ]))
    );
    assert_eq!(
        eval("[...1]").map_err(message),
        Err("Only arrays and Traversables can be unpacked".to_string())
    );
}

#[test]
fn test_illegal_offset_type() {
    assert_eq!(eval("[[1] => 2]").map_err(message), Err("Illegal offset type array".to_string()));
}

#[test]
fn test_dim_fetch() {
    assert_eq!(eval("['a' => ['b' => 7]]['a']['b']"), Ok(ConstValue::Int(7)));
    assert_eq!(eval("[10, 20]['1']"), Ok(ConstValue::Int(20)));
    assert_eq!(eval("[1, 2][5]").map_err(message), Err("Undefined array key 5".to_string()));
    assert_eq!(
        eval("['a' => 1]['b']").map_err(message),
        Err("Undefined array key \"b\"".to_string())
    );
}

#[test]
fn test_string_offsets() {
    assert_eq!(eval("'abc'[1]"), Ok(s("b")));
    assert_eq!(eval("'abc'[-1]"), Ok(s("c")));
    assert_eq!(
        eval("'abc'[5]").map_err(message),
        Err("Uninitialized string offset 5".to_string())
    );
    assert_eq!(eval("'abc'[5] ?? 'none'"), Ok(s("none")));
}

#[test]
fn test_strings_are_byte_sequences() {
    let bytes = |raw: &[u8]| ConstValue::String(PhpString::from(raw));
    assert_eq!(eval(r#""\xc3\xa9" === "\u{e9}""#), Ok(ConstValue::Bool(true)));
    assert_eq!(eval(r#""\xc3\xa9" === 'é'"#), Ok(ConstValue::Bool(true)));
    assert_eq!(eval(r#"strlen("\xff")"#), Ok(ConstValue::Int(1)));
    assert_eq!(eval(r#"strlen("\u{e9}")"#), Ok(ConstValue::Int(2)));
    assert_eq!(eval("strlen('héllo'[1])"), Ok(ConstValue::Int(1)));
    assert_eq!(eval("'héllo'[1]"), Ok(bytes(&[0xc3])));
    assert_eq!(eval(r#""\xff" . "\x41""#), Ok(bytes(&[0xff, b'A'])));
    assert_eq!(eval(r#""\400""#), Ok(bytes(&[0])));
    assert_eq!(eval(r#"str_repeat("\xfe", 2)"#), Ok(bytes(&[0xfe, 0xfe])));
    assert_eq!(eval(r#"strtoupper("\xe9a")"#), Ok(bytes(&[0xe9, b'A'])));

    let key = eval(r#"["\xff" => 1]"#).map(|value| value.as_array().map(|array| array.keys().cloned().collect::<Vec<_>>()));
    assert_eq!(key, Ok(Some(vec![ArrayKey::String(PhpString::from(&[0xff_u8][..]))])));
}

#[test]
fn test_dim_fetch_on_scalar_is_null() {
    let source = "<?php\nconst N = null;\nconst I = 5;\nconst X = N[0];\nconst Y = I['k'];\n";
    assert_eq!(constant_in(source, "X"), Ok(ConstValue::Null));
    assert_eq!(constant_in(source, "Y"), Ok(ConstValue::Null));
}

// =============================================================================
// Constant references
// =============================================================================

#[test]
fn test_namespaced_constants_fall_back_to_global() {
    let source = r#"<?php
namespace {
    const SHARED = 5;
}
namespace App {
    const LOCAL = 1;
    const A = LOCAL + 1;
    const B = SHARED * 2;
    const C = \App\LOCAL . PHP_EOL;
    const D = MISSING;
}
"#;
    assert_eq!(constant_in(source, "App\\A"), Ok(ConstValue::Int(2)));
    assert_eq!(constant_in(source, "App\\B"), Ok(ConstValue::Int(10)));
    assert_eq!(constant_in(source, "app\\C"), Ok(s("1\n")));
    assert_eq!(
        constant_in(source, "App\\D"),
        Err(ReflectionError::ConstantNotFound { name: "App\\MISSING".to_string() })
    );
}

#[test]
fn test_builtin_constants_can_be_disabled() {
    let reflector = Reflector::with_options(
        NullLocator,
        ReflectorOptions::default().with_builtin_constants(false),
    );
    load(&reflector, "<?php const X = PHP_EOL; const Y = true;");
    let x = reflector.reflect_constant("X").expect("declared").value();
    assert_eq!(x, Err(ReflectionError::ConstantNotFound { name: "PHP_EOL".to_string() }));
    let y = reflector.reflect_constant("Y").expect("declared").value();
    assert_eq!(y, Ok(ConstValue::Bool(true)));
}

#[test]
fn test_directory_separator_option() {
    let reflector = Reflector::with_options(
        NullLocator,
        ReflectorOptions::default().with_directory_separator('\\'),
    );
    load(&reflector, "<?php const X = DIRECTORY_SEPARATOR; const Y = dirname('C:\\app\\src');");
    let x = reflector.reflect_constant("X").expect("declared").value();
    assert_eq!(x, Ok(s("\\")));
    let y = reflector.reflect_constant("Y").expect("declared").value();
    assert_eq!(y, Ok(s("C:\\app")));
}

#[test]
fn test_class_constant_references() {
    let source = r#"<?php
namespace App;

class Box {
    const SIZE = 3;
    const AREA = self::SIZE * Box::SIZE;
    const NAME = Box::class;
    const LATE = static::SIZE;
    const GHOST = Missing::VALUE;
    const NOPE = self::UNKNOWN;
}
"#;
    let reflector = Reflector::new(NullLocator);
    load(&reflector, source);
    let class = reflector.reflect_class("App\\Box").expect("declared");

    assert_eq!(class.get_constant("AREA"), Ok(Some(ConstValue::Int(9))));
    assert_eq!(class.get_constant("NAME"), Ok(Some(s("App\\Box"))));
    assert_eq!(
        class.get_constant("LATE").map_err(message),
        Err("\"static::\" is not allowed in compile-time constants".to_string())
    );
    assert_eq!(
        class.get_constant("GHOST"),
        Err(ReflectionError::ClassNotFound { name: "App\\Missing".to_string() })
    );
    assert_eq!(
        class.get_constant("NOPE"),
        Err(ReflectionError::ConstantNotFound { name: "App\\Box::UNKNOWN".to_string() })
    );
}

#[test]
fn test_magic_constants() {
    let source = r#"<?php
namespace App;

class Box {
    const CLS = __CLASS__;
    const NS = __NAMESPACE__;
    const LINE = __LINE__;
    const IN_TRAIT = __TRAIT__;
    const FILE = __FILE__;
    const DIR = __DIR__;

    public function open($method = __METHOD__, $function = __FUNCTION__) {}
}

trait Greets {
    const NAME = __TRAIT__;
}

function helper($method = __METHOD__, $class = __CLASS__) {}
"#;
    let reflector = Reflector::new(NullLocator);
    load(&reflector, source);
    let class = reflector.reflect_class("App\\Box").expect("declared");
    assert_eq!(class.get_constant("CLS"), Ok(Some(s("App\\Box"))));
    assert_eq!(class.get_constant("NS"), Ok(Some(s("App"))));
    assert_eq!(class.get_constant("LINE"), Ok(Some(ConstValue::Int(7))));
    assert_eq!(class.get_constant("IN_TRAIT"), Ok(Some(s(""))));
    assert_eq!(class.get_constant("FILE"), Ok(Some(s(PATH))));
    assert_eq!(class.get_constant("DIR"), Ok(Some(s("/virtual"))));

    let open = class.get_method("open").expect("lookup").expect("declared");
    let method = open.parameter("method").expect("param").default_value();
    assert_eq!(method, Ok(s("App\\Box::open")));
    let function = open.parameter("function").expect("param").default_value();
    assert_eq!(function, Ok(s("open")));

    let greets = reflector.reflect_class("App\\Greets").expect("declared");
    assert_eq!(greets.get_constant("NAME"), Ok(Some(s("App\\Greets"))));

    let helper = reflector.reflect_function("App\\helper").expect("declared");
    let method = helper.parameter("method").expect("param").default_value();
    assert_eq!(method, Ok(s("App\\helper")));
    let class = helper.parameter("class").expect("param").default_value();
    assert_eq!(class, Ok(s("")));
}

#[test]
fn test_class_magic_constant_in_trait_names_the_trait() {
    let source = r#"<?php
namespace App;

trait Stamps {
    public $origin = __CLASS__;
    public function tag($who = __CLASS__) {}
}

class Letter {
    use Stamps;
}
"#;
    let reflector = Reflector::new(NullLocator);
    load(&reflector, source);
    let letter = reflector.reflect_class("App\\Letter").expect("declared");

    // Trait members are shared by every using class, so the trait is the
    // class they are evaluated in.
    let origin = letter.get_property("origin").expect("lookup").expect("imported");
    assert_eq!(origin.default_value(), Ok(s("App\\Stamps")));
    let tag = letter.get_method("tag").expect("lookup").expect("imported");
    let who = tag.parameter("who").expect("param").default_value();
    assert_eq!(who, Ok(s("App\\Stamps")));
}

// =============================================================================
// Calls and unresolvable expressions
// =============================================================================

#[test]
fn test_allow_listed_calls() {
    assert_eq!(eval("strtoupper('abc')"), Ok(s("ABC")));
    assert_eq!(eval("\\strlen('abcd')"), Ok(ConstValue::Int(4)));
    assert_eq!(eval("STRLEN('ab')"), Ok(ConstValue::Int(2)));
    assert_eq!(eval("count([1, [2, 3]], COUNT_RECURSIVE)"), Ok(ConstValue::Int(4)));
    assert_eq!(
        constant_in("<?php namespace App; const X = basename('/a/b.php', '.php');", "App\\X"),
        Ok(s("b"))
    );
}

#[test]
fn test_named_and_spread_arguments() {
    assert_eq!(eval("str_repeat(times: 2, string: 'ab')"), Ok(s("abab")));
    assert_eq!(eval("implode(...[',', ['a', 'b']])"), Ok(s("a,b")));
    assert_eq!(eval("str_repeat(...['string' => 'x', 'times' => 3])"), Ok(s("xxx")));
    assert_eq!(
        eval("strlen(str: 'x')").map_err(message),
        Err("Unknown named parameter $str".to_string())
    );
    assert_eq!(
        eval("dirname(levels: 2)").map_err(message),
        Err("dirname(): Argument #1 ($path) not passed".to_string())
    );
    assert_eq!(
        eval("str_repeat('a', string: 'b')").map_err(message),
        Err("Named parameter $string overwrites previous argument".to_string())
    );
}

#[test]
fn test_constant_function() {
    let source = r#"<?php
namespace App;

const LOCAL = 'local';

class Box {
    const SIZE = 4;
    const VIA_SELF = constant('self::SIZE');
}

const A = constant('App\LOCAL');
const B = constant('PHP_INT_SIZE');
const C = constant('App\Box::SIZE');
const D = constant('LOCAL');
"#;
    assert_eq!(constant_in(source, "App\\A"), Ok(s("local")));
    assert_eq!(constant_in(source, "App\\B"), Ok(ConstValue::Int(8)));
    assert_eq!(constant_in(source, "App\\C"), Ok(ConstValue::Int(4)));
    assert_eq!(
        constant_in(source, "App\\D"),
        Err(ReflectionError::ConstantNotFound { name: "LOCAL".to_string() })
    );

    let reflector = Reflector::new(NullLocator);
    load(&reflector, source);
    let class = reflector.reflect_class("App\\Box").expect("declared");
    assert_eq!(class.get_constant("VIA_SELF"), Ok(Some(ConstValue::Int(4))));
}

#[test]
fn test_unresolvable_expressions() {
    assert_eq!(eval("time()").map_err(unresolvable_kind), Err("Call".to_string()));
    assert_eq!(eval("strlen(...)").map_err(unresolvable_kind), Err("Call".to_string()));
    assert_eq!(eval("(int) '5'").map_err(unresolvable_kind), Err("Cast".to_string()));

    let source = "<?php\nnamespace App;\nfunction strlen($s) { return 0; }\nconst X = strlen('abc');\n";
    assert_eq!(
        constant_in(source, "App\\X").map_err(unresolvable_kind),
        Err("Call".to_string())
    );
}

#[test]
fn test_new_in_parameter_default_is_unresolvable() {
    let reflector = Reflector::new(NullLocator);
    load(&reflector, "<?php\nclass Dep {}\nfunction make($dep = new Dep()) {}\n");
    let function = reflector.reflect_function("make").expect("declared");
    let param = function.parameter("dep").expect("param");
    assert!(param.is_default_value_available());

    let err = param.default_value().expect_err("cannot construct");
    match err {
        ReflectionError::UnresolvableConstantExpression { kind, file, line, .. } => {
            assert_eq!(kind, "New");
            assert_eq!(file, PathBuf::from(PATH));
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_case_properties() {
    let source = r#"<?php
enum Suit: string {
    case Hearts = 'H';
    case Spades = 'S';
}

enum Flag {
    case On;
}

const VALUE = Suit::Hearts->value;
const NAME = Suit::Spades->name;
const HEARTS = Suit::Hearts;
const PURE = Flag::On->value;
const NULLSAFE = Suit::Hearts?->value;
"#;
    assert_eq!(constant_in(source, "VALUE"), Ok(s("H")));
    assert_eq!(constant_in(source, "NAME"), Ok(s("Spades")));
    assert_eq!(
        constant_in(source, "HEARTS"),
        Ok(ConstValue::EnumCase { class: "Suit".into(), case: "Hearts".into() })
    );
    assert_eq!(
        constant_in(source, "PURE").map_err(message),
        Err("Undefined property: Flag::$value".to_string())
    );
    assert_eq!(constant_in(source, "NULLSAFE"), Ok(s("H")));
}

// =============================================================================
// Limits
// =============================================================================

#[test]
fn test_expression_depth_limit() {
    let reflector = Reflector::with_options(
        NullLocator,
        ReflectorOptions::default().with_max_expression_depth(5),
    );
    load(&reflector, "<?php const SHALLOW = 1 + 1; const DEEP = 1 + 1 + 1 + 1 + 1 + 1 + 1;");
    let shallow = reflector.reflect_constant("SHALLOW").expect("declared").value();
    assert_eq!(shallow, Ok(ConstValue::Int(2)));
    let deep = reflector.reflect_constant("DEEP").expect("declared").value();
    assert_eq!(
        deep,
        Err(ReflectionError::DepthLimitExceeded {
            what: "constant expression".to_string(),
            limit: 5,
        })
    );
}
