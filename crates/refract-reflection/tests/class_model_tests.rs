//! Tests for the class, method, parameter, property and constant handles.

use super::*;
use std::rc::Rc;

const ACCOUNT: &str = r#"<?php
namespace App\Model;

use App\Contracts\Entity;

/** An account. */
final class Account
{
    public const ROLE = 'user';
    protected const LIMIT = 10;
    private const SECRET = 'x';
    final public const FIXED = self::LIMIT + 1;

    public int $id;
    protected ?string $name = null;
    private static array $cache = [];
    public $untyped;
    public readonly string $email;
    var $legacy = 'old';

    public function __construct(
        private readonly int $age,
        public string $nick = 'anon',
    ) {}

    public static function create(
        string $name,
        int $limit = self::LIMIT,
        ?Entity $owner = null,
        int|string|null $tag = LIMIT_DEFAULT,
        string $eol = PHP_EOL,
        &...$rest
    ): static {
        static $calls = 0, $seen;
        static $label = self::ROLE . '!';
        return new static();
    }

    public function &reference(): array { return []; }

    private function hidden(int $a = 1, $b) {}

    protected function numbers(): iterable
    {
        yield 1;
    }
}

const LIMIT_DEFAULT = 3;

function helper(int $x = 1): ?string { return null; }
"#;

fn reflector_with(source: &str) -> Reflector {
    let reflector = Reflector::new(NullLocator);
    reflector
        .reflect_source("/virtual/model.php", source)
        .expect("valid source");
    reflector
}

fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|item| name(item).to_string()).collect()
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn test_class_identity_and_location() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("\\App\\Model\\Account").expect("declared");

    assert_eq!(class.name(), "App\\Model\\Account");
    assert_eq!(class.short_name(), "Account");
    assert_eq!(class.namespace_name(), "App\\Model");
    assert!(class.in_namespace());
    assert_eq!(class.kind(), ClassLikeKind::Class);
    assert!(class.doc_comment().is_some_and(|doc| doc.contains("An account.")));
    assert_eq!(class.file_name(), std::path::Path::new("/virtual/model.php"));
    assert_eq!(class.start_line(), 7);
    assert_eq!(class.end_line(), 47);
}

#[test]
fn test_repeated_lookups_share_descriptors() {
    let reflector = reflector_with(ACCOUNT);
    let first = reflector.reflect_class("App\\Model\\Account").expect("declared");
    let second = reflector.reflect_class("app\\model\\ACCOUNT").expect("case-insensitive");
    assert!(Rc::ptr_eq(first.descriptor(), second.descriptor()));

    let listed = reflector
        .reflect_namespace("/virtual/model.php", "App\\Model")
        .expect("namespace")
        .get_class("Account")
        .expect("listed");
    assert!(Rc::ptr_eq(first.descriptor(), listed.descriptor()));

    let method = first.get_method("create").expect("lookup").expect("declared");
    let again = second.get_method("CREATE").expect("lookup").expect("declared");
    assert!(Rc::ptr_eq(method.descriptor(), again.descriptor()));
    assert_eq!(again.name(), "create");
}

#[test]
fn test_class_modifiers() {
    let source = r#"<?php
final class Sealed {}
abstract class Shape { abstract protected function area(): float; }
abstract class Marker {}
class Open { private function __construct() {} private function __clone() {} }
interface Drawable { public function draw(): void; }
trait Helper {}
readonly class Point {
    public int $z;
    public static $count = 0;
    public function __construct(public int $x, protected int $y = 0) {}
}
enum Suit { case Hearts; }
"#;
    let reflector = reflector_with(source);
    let class = |name: &str| reflector.reflect_class(name).expect("declared");

    let sealed = class("Sealed");
    assert_eq!(sealed.modifiers(), Ok(ClassModifiers::IS_FINAL));
    assert!(sealed.is_final());
    assert_eq!(sealed.is_instantiable(), Ok(true));
    assert_eq!(sealed.is_cloneable(), Ok(true));

    let shape = class("Shape");
    assert_eq!(
        shape.modifiers(),
        Ok(ClassModifiers::IS_EXPLICIT_ABSTRACT | ClassModifiers::IS_IMPLICIT_ABSTRACT)
    );
    assert_eq!(shape.is_instantiable(), Ok(false));
    let area = shape.get_method("area").expect("lookup").expect("declared");
    assert!(area.is_abstract());
    assert!(area.is_protected());

    let marker = class("Marker");
    assert_eq!(marker.modifiers(), Ok(ClassModifiers::IS_EXPLICIT_ABSTRACT));
    assert_eq!(marker.is_abstract(), Ok(true));

    let open = class("Open");
    assert_eq!(open.modifiers(), Ok(ClassModifiers::empty()));
    assert_eq!(open.is_instantiable(), Ok(false));
    assert_eq!(open.is_cloneable(), Ok(false));

    let drawable = class("Drawable");
    assert!(drawable.is_interface());
    assert_eq!(drawable.modifiers(), Ok(ClassModifiers::IS_IMPLICIT_ABSTRACT));
    let draw = drawable.get_method("draw").expect("lookup").expect("declared");
    assert!(draw.is_abstract());
    assert_eq!(drawable.is_instantiable(), Ok(false));

    let helper = class("Helper");
    assert!(helper.is_trait());
    assert_eq!(helper.is_instantiable(), Ok(false));

    let point = class("Point");
    assert!(point.is_readonly());
    assert_eq!(point.modifiers(), Ok(ClassModifiers::IS_READONLY));
    for name in ["x", "y", "z"] {
        let property = point.get_property(name).expect("lookup").expect("declared");
        assert!(property.is_readonly(), "{name} should be readonly");
    }
    let count = point.get_property("count").expect("lookup").expect("declared");
    assert!(count.is_static());
    assert!(!count.is_readonly());

    let suit = class("Suit");
    assert!(suit.is_enum());
    assert!(suit.is_final());
    assert_eq!(suit.modifiers(), Ok(ClassModifiers::IS_FINAL));
    assert_eq!(suit.is_instantiable(), Ok(false));
}

// =============================================================================
// Constants
// =============================================================================

#[test]
fn test_class_constants() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("App\\Model\\Account").expect("declared");

    let constants = class.get_constants(None).expect("resolvable");
    let entries: Vec<(&str, &ConstValue)> = constants.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(
        entries,
        vec![
            ("ROLE", &ConstValue::from("user")),
            ("LIMIT", &ConstValue::Int(10)),
            ("SECRET", &ConstValue::from("x")),
            ("FIXED", &ConstValue::Int(11)),
        ]
    );

    let public = class.get_constants(Some(ConstantModifiers::IS_PUBLIC)).expect("resolvable");
    assert_eq!(public.keys().collect::<Vec<_>>(), vec!["ROLE", "FIXED"]);

    let fixed = class.get_reflection_constant("FIXED").expect("lookup").expect("declared");
    assert!(fixed.is_final());
    assert!(fixed.is_public());
    assert!(!fixed.is_enum_case());
    assert_eq!(fixed.declaring_class_name(), "App\\Model\\Account");
    assert_eq!(fixed.modifiers(), ConstantModifiers::IS_PUBLIC | ConstantModifiers::IS_FINAL);

    let secret = class.get_reflection_constant("SECRET").expect("lookup").expect("declared");
    assert!(secret.is_private());
    assert_eq!(secret.visibility().keyword(), "private");

    assert_eq!(class.has_constant("LIMIT"), Ok(true));
    assert_eq!(class.has_constant("limit"), Ok(false));
    assert_eq!(class.get_constant("NOPE"), Ok(None));
}

#[test]
fn test_typed_class_constant() {
    let reflector = reflector_with("<?php class Config { const string NAME = 'cfg'; }");
    let class = reflector.reflect_class("Config").expect("declared");
    let constant = class.get_reflection_constant("NAME").expect("lookup").expect("declared");
    assert_eq!(constant.type_().map(ToString::to_string), Some("string".to_string()));
    assert_eq!(constant.value(), Ok(ConstValue::from("cfg")));
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_properties() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("App\\Model\\Account").expect("declared");

    let properties = class.get_properties(None).expect("properties");
    assert_eq!(
        names(&properties, |p| p.name()),
        vec!["id", "name", "cache", "untyped", "email", "legacy", "age", "nick"]
    );

    let property = |name: &str| class.get_property(name).expect("lookup").expect("declared");

    let id = property("id");
    assert!(id.is_public());
    assert_eq!(id.type_().map(ToString::to_string), Some("int".to_string()));
    assert!(!id.has_default_value());
    assert_eq!(
        id.default_value(),
        Err(ReflectionError::NoDefaultValue {
            subject: "property App\\Model\\Account::$id".to_string()
        })
    );

    let name = property("name");
    assert!(name.is_protected());
    assert!(name.type_().is_some_and(ReflectionType::allows_null));
    assert_eq!(name.default_value(), Ok(ConstValue::Null));

    let cache = property("cache");
    assert!(cache.is_private());
    assert!(cache.is_static());
    assert_eq!(cache.default_value(), Ok(ConstValue::Array(PhpArray::new())));

    let untyped = property("untyped");
    assert!(!untyped.has_type());
    assert!(untyped.has_default_value());
    assert_eq!(untyped.default_value(), Ok(ConstValue::Null));

    assert!(property("email").is_readonly());
    assert!(property("legacy").is_public());

    let age = property("age");
    assert!(age.is_promoted());
    assert!(age.is_private());
    assert!(age.is_readonly());
    assert!(!age.has_default_value());

    let nick = property("nick");
    assert!(nick.is_promoted());
    assert!(!nick.has_default_value());

    let statics = class.get_properties(Some(PropertyModifiers::IS_STATIC)).expect("properties");
    assert_eq!(names(&statics, |p| p.name()), vec!["cache"]);

    let defaults = class.default_properties().expect("defaults");
    assert_eq!(defaults.keys().collect::<Vec<_>>(), vec!["name", "cache", "untyped", "legacy"]);
    assert_eq!(defaults["legacy"], ConstValue::from("old"));

    assert_eq!(class.has_property("ID"), Ok(false));
}

// =============================================================================
// Methods and parameters
// =============================================================================

#[test]
fn test_methods() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("App\\Model\\Account").expect("declared");

    let methods = class.get_methods(None).expect("methods");
    assert_eq!(
        names(&methods, |m| m.name()),
        vec!["__construct", "create", "reference", "hidden", "numbers"]
    );
    let statics = class.get_methods(Some(MethodModifiers::IS_STATIC)).expect("methods");
    assert_eq!(names(&statics, |m| m.name()), vec!["create"]);
    let non_public = class
        .get_methods(Some(MethodModifiers::IS_PROTECTED | MethodModifiers::IS_PRIVATE))
        .expect("methods");
    assert_eq!(names(&non_public, |m| m.name()), vec!["hidden", "numbers"]);

    let constructor = class.constructor().expect("lookup").expect("declared");
    assert!(constructor.is_constructor());
    assert_eq!(constructor.declaring_class_name(), "App\\Model\\Account");

    let create = class.get_method("create").expect("lookup").expect("declared");
    assert!(create.is_static());
    assert_eq!(create.modifiers(), MethodModifiers::IS_PUBLIC | MethodModifiers::IS_STATIC);
    assert_eq!(create.return_type().map(ToString::to_string), Some("static".to_string()));
    assert!(create.is_variadic());
    assert!(!create.is_generator());

    let reference = class.get_method("reference").expect("lookup").expect("declared");
    assert!(reference.returns_reference());

    let numbers = class.get_method("numbers").expect("lookup").expect("declared");
    assert!(numbers.is_generator());
    assert!(numbers.is_protected());

    assert_eq!(class.has_method("HIDDEN"), Ok(true));
    assert_eq!(class.get_method("missing").map(|m| m.is_none()), Ok(true));
}

#[test]
fn test_parameters() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("App\\Model\\Account").expect("declared");
    let create = class.get_method("create").expect("lookup").expect("declared");

    assert_eq!(create.number_of_parameters(), 6);
    assert_eq!(create.number_of_required_parameters(), 1);
    let param = |name: &str| create.parameter(name).expect("declared");

    let name = param("name");
    assert_eq!(name.position(), 0);
    assert!(!name.is_optional());
    assert!(!name.allows_null());
    assert_eq!(name.declaring_function(), "App\\Model\\Account::create()");

    let limit = param("limit");
    assert!(limit.is_optional());
    assert_eq!(limit.default_value(), Ok(ConstValue::Int(10)));
    assert!(limit.is_default_value_constant());
    assert_eq!(
        limit.default_value_constant_name().as_deref(),
        Some("App\\Model\\Account::LIMIT")
    );

    let owner = param("owner");
    let owner_type = owner.type_().expect("typed");
    assert_eq!(owner_type.name(), Some("App\\Contracts\\Entity"));
    assert!(!owner_type.is_builtin());
    assert_eq!(owner_type.to_string(), "?App\\Contracts\\Entity");
    assert!(owner.allows_null());
    assert_eq!(owner.default_value(), Ok(ConstValue::Null));
    assert_eq!(owner.default_value_constant_name(), None);

    let tag = param("tag");
    let tag_type = tag.type_().expect("typed");
    assert_eq!(tag_type.types().len(), 3);
    assert!(tag.allows_null());
    assert_eq!(tag.default_value(), Ok(ConstValue::Int(3)));
    assert_eq!(
        tag.default_value_constant_name().as_deref(),
        Some("App\\Model\\LIMIT_DEFAULT")
    );

    let eol = param("eol");
    assert_eq!(eol.default_value(), Ok(ConstValue::from("\n")));
    assert_eq!(eol.default_value_constant_name().as_deref(), Some("PHP_EOL"));

    let rest = param("rest");
    assert!(rest.is_variadic());
    assert!(rest.is_passed_by_reference());
    assert!(rest.is_optional());
    assert!(!rest.is_default_value_available());
    assert_eq!(
        rest.default_value(),
        Err(ReflectionError::NoDefaultValue {
            subject: "parameter $rest of App\\Model\\Account::create()".to_string()
        })
    );

    let hidden = class.get_method("hidden").expect("lookup").expect("declared");
    let a = hidden.parameter("a").expect("declared");
    assert!(a.is_default_value_available());
    assert!(!a.is_optional());
    assert_eq!(hidden.number_of_required_parameters(), 2);
}

#[test]
fn test_promoted_parameters() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("App\\Model\\Account").expect("declared");
    let constructor = class.constructor().expect("lookup").expect("declared");

    let age = constructor.parameter("age").expect("declared");
    assert!(age.is_promoted());
    assert_eq!(
        age.promoted_modifiers(),
        Some(PropertyModifiers::IS_PRIVATE | PropertyModifiers::IS_READONLY)
    );
    let nick = constructor.parameter("nick").expect("declared");
    assert_eq!(nick.default_value(), Ok(ConstValue::from("anon")));
    assert_eq!(nick.promoted_modifiers(), Some(PropertyModifiers::IS_PUBLIC));
}

#[test]
fn test_static_variables() {
    let reflector = reflector_with(ACCOUNT);
    let class = reflector.reflect_class("App\\Model\\Account").expect("declared");
    let create = class.get_method("create").expect("lookup").expect("declared");

    assert_eq!(create.static_variable_names(), vec!["calls", "seen", "label"]);
    let values = create.static_variables().expect("resolvable");
    let entries: Vec<(&str, &ConstValue)> = values.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(
        entries,
        vec![
            ("calls", &ConstValue::Int(0)),
            ("seen", &ConstValue::Null),
            ("label", &ConstValue::from("user!")),
        ]
    );
}

#[test]
fn test_functions() {
    let reflector = reflector_with(ACCOUNT);
    let helper = reflector.reflect_function("app\\model\\HELPER").expect("declared");
    assert_eq!(helper.name(), "App\\Model\\helper");
    assert_eq!(helper.short_name(), "helper");
    assert_eq!(helper.namespace_name(), "App\\Model");
    assert!(helper.return_type().is_some_and(ReflectionType::allows_null));
    assert_eq!(helper.number_of_required_parameters(), 0);
    assert_eq!(
        reflector.reflect_function("App\\Model\\missing").map(|f| f.name().to_string()),
        Err(ReflectionError::FunctionNotFound { name: "App\\Model\\missing".to_string() })
    );
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_backed_enum() {
    let source = r#"<?php
enum Status: int {
    case Active = 1;
    case Inactive = self::OFF;

    const OFF = 0;
    const FALLBACK = self::Active;

    public function label(): string { return 'x'; }
}

enum Pure { case One; }
"#;
    let reflector = reflector_with(source);
    let status = reflector.reflect_class("Status").expect("declared");
    assert!(status.is_backed_enum());
    assert_eq!(status.enum_backing_type().map(ToString::to_string), Some("int".to_string()));

    let cases = status.cases();
    assert_eq!(names(&cases, |c| c.name()), vec!["Active", "Inactive"]);
    assert!(cases.iter().all(ReflectionClassConstant::is_enum_case));
    assert_eq!(cases[1].backing_value(), Ok(ConstValue::Int(0)));
    assert_eq!(
        cases[0].value(),
        Ok(ConstValue::EnumCase { class: "Status".into(), case: "Active".into() })
    );

    let constants = status.get_constants(None).expect("resolvable");
    assert_eq!(constants.keys().collect::<Vec<_>>(), vec!["Active", "Inactive", "OFF", "FALLBACK"]);
    assert_eq!(
        constants["FALLBACK"],
        ConstValue::EnumCase { class: "Status".into(), case: "Active".into() }
    );

    let pure = reflector.reflect_class("Pure").expect("declared");
    assert!(pure.is_enum());
    assert!(!pure.is_backed_enum());
    assert_eq!(pure.cases()[0].backing_value(), Ok(ConstValue::Null));
}

// =============================================================================
// Files and namespaces
// =============================================================================

#[test]
fn test_file_and_namespace_listing() {
    let source = r#"<?php
namespace Alpha {
    /** Alpha things. */
    class One {}
    function run() {}
    const VALUE = 1;
    const BROKEN = 1 / 0;
}
namespace Beta {
    interface Two {}
}
"#;
    let reflector = Reflector::new(NullLocator);
    let file = reflector
        .reflect_source("/virtual/listing.php", source)
        .expect("valid source");

    let namespaces = file.namespaces();
    assert_eq!(names(&namespaces, |n| n.name()), vec!["Alpha", "Beta"]);
    assert_eq!(names(&file.classes(), |c| c.name()), vec!["Alpha\\One", "Beta\\Two"]);
    assert_eq!(names(&file.functions(), |f| f.name()), vec!["Alpha\\run"]);

    let alpha = file.namespace("\\Alpha").expect("declared");
    assert!(!alpha.is_global());
    assert!(alpha.get_class("One").is_some());
    assert!(alpha.get_class("Alpha\\One").is_some());
    assert!(alpha.get_class("Two").is_none());

    let constants = alpha.constants();
    assert_eq!(constants.keys().collect::<Vec<_>>(), vec!["Alpha\\VALUE"]);
    assert_eq!(alpha.reflection_constants().len(), 2);
    assert_eq!(alpha.get_constant("VALUE"), Ok(Some(ConstValue::Int(1))));
    assert!(alpha.get_constant("BROKEN").is_err());
    assert_eq!(alpha.get_constant("NOPE"), Ok(None));
    assert_eq!(file.constants().len(), 1);

    let err = file.namespace("Gamma").expect_err("not declared");
    assert!(matches!(err, ReflectionError::NamespaceNotFound(ref missing) if missing.namespace == "Gamma"));
}

#[test]
fn test_reflect_namespace_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("lib.php");
    std::fs::write(&path, "<?php namespace Lib; class Widget {} const SIZE = 2;").expect("write");

    let reflector = Reflector::new(NullLocator);
    let namespace = reflector.reflect_namespace(&path, "lib").expect("declared");
    assert_eq!(namespace.name(), "Lib");
    assert_eq!(namespace.file_name(), std::fs::canonicalize(&path).expect("canonical"));
    assert!(reflector.reflect_class("Lib\\Widget").is_ok());
    assert_eq!(
        reflector.reflect_constant("Lib\\SIZE").and_then(|c| c.value()),
        Ok(ConstValue::Int(2))
    );

    let missing = reflector.reflect_namespace(&path, "Other").expect_err("not declared");
    assert!(matches!(missing, ReflectionError::NamespaceNotFound(_)));
}
