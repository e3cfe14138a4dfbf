//! Tests for inheritance-aware lookup, hierarchy queries and cycle
//! detection.

use super::*;

const ZOO: &str = r#"<?php
namespace Zoo;

interface Named {
    const KIND = 'named';
    public function name(): string;
}

interface Pet extends Named {
    public function owner(): ?string;
}

trait Sleeps {
    public $hours = 8;
    private $dreams = [];
    private const NAP = 20;

    public function sleep() {}
    abstract public function bed(): string;
}

abstract class Animal implements Named {
    public const LEGS = 4;
    private const SECRET = 's';
    protected $age = 0;
    private $id = 1;

    public function name(): string { return 'animal'; }
    private function digest() {}
    public function speak() {}
}

class Dog extends Animal implements Pet {
    use Sleeps;

    public function speak() {}
    public function owner(): ?string { return null; }
    public function bed(): string { return 'mat'; }
}

class Cat extends Animal {
    use Sleeps;
}
"#;

fn zoo() -> Reflector {
    let reflector = Reflector::new(NullLocator);
    reflector.reflect_source("/virtual/zoo.php", ZOO).expect("valid source");
    reflector
}

fn load(source: &str) -> Reflector {
    let reflector = Reflector::new(NullLocator);
    reflector.reflect_source("/virtual/hierarchy.php", source).expect("valid source");
    reflector
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

// =============================================================================
// Member lookup
// =============================================================================

#[test]
fn test_method_lookup_order() {
    let reflector = zoo();
    let dog = reflector.reflect_class("Zoo\\Dog").expect("declared");
    let declaring = |name: &str| {
        dog.get_method(name)
            .expect("lookup")
            .map(|method| method.declaring_class_name().to_string())
    };

    assert_eq!(declaring("speak").as_deref(), Some("Zoo\\Dog"));
    assert_eq!(declaring("name").as_deref(), Some("Zoo\\Animal"));
    assert_eq!(declaring("SLEEP").as_deref(), Some("Zoo\\Sleeps"));
    assert_eq!(declaring("bed").as_deref(), Some("Zoo\\Dog"));
    assert_eq!(declaring("digest").as_deref(), Some("Zoo\\Animal"));
    assert_eq!(declaring("fly"), None);

    let methods = dog.get_methods(None).expect("methods");
    let names: Vec<&str> = methods.iter().map(|method| method.name()).collect();
    assert_eq!(names, vec!["speak", "owner", "bed", "name", "digest", "sleep"]);
}

#[test]
fn test_private_properties_and_constants_are_not_inherited() {
    let reflector = zoo();
    let dog = reflector.reflect_class("Zoo\\Dog").expect("declared");

    let properties = dog.get_properties(None).expect("properties");
    let names: Vec<&str> = properties.iter().map(|property| property.name()).collect();
    assert_eq!(names, vec!["age", "hours", "dreams"]);
    assert_eq!(dog.has_property("id"), Ok(false));

    let animal = reflector.reflect_class("Zoo\\Animal").expect("declared");
    assert_eq!(animal.has_property("id"), Ok(true));
    assert_eq!(animal.get_constant("SECRET"), Ok(Some(ConstValue::from("s"))));

    let constants = dog.get_constants(None).expect("resolvable");
    let entries: Vec<(&str, &ConstValue)> = constants.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(
        entries,
        vec![
            ("LEGS", &ConstValue::Int(4)),
            ("KIND", &ConstValue::from("named")),
            ("NAP", &ConstValue::Int(20)),
        ]
    );
    assert_eq!(dog.get_constant("SECRET"), Ok(None));

    let hours = dog.get_property("hours").expect("lookup").expect("from trait");
    assert_eq!(hours.declaring_class_name(), "Zoo\\Sleeps");
    assert_eq!(hours.default_value(), Ok(ConstValue::Int(8)));
}

#[test]
fn test_interface_constants_resolve_through_the_implementing_class() {
    let source = r#"<?php
interface HasLimit { const LIMIT = 5; }
class Base implements HasLimit {}
class Child extends Base {
    const DOUBLE = self::LIMIT * 2;
    const PARENT_LIMIT = parent::LIMIT;
}
"#;
    let reflector = load(source);
    let child = reflector.reflect_class("Child").expect("declared");
    assert_eq!(child.get_constant("DOUBLE"), Ok(Some(ConstValue::Int(10))));
    assert_eq!(child.get_constant("PARENT_LIMIT"), Ok(Some(ConstValue::Int(5))));
    let limit = child.get_reflection_constant("LIMIT").expect("lookup").expect("inherited");
    assert_eq!(limit.declaring_class_name(), "HasLimit");
}

// =============================================================================
// Hierarchy queries
// =============================================================================

#[test]
fn test_interface_names_are_transitive() {
    let reflector = zoo();
    let dog = reflector.reflect_class("Zoo\\Dog").expect("declared");
    assert_eq!(dog.interface_names(), Ok(strings(&["Zoo\\Named", "Zoo\\Pet"])));
    assert_eq!(dog.trait_names(), strings(&["Zoo\\Sleeps"]).as_slice());

    let pet = reflector.reflect_class("Zoo\\Pet").expect("declared");
    assert_eq!(pet.interface_names(), Ok(strings(&["Zoo\\Named"])));
    assert_eq!(pet.parent_class_name(), None);

    let interfaces = dog.interfaces().expect("interfaces");
    assert!(interfaces.iter().all(ReflectionClass::is_interface));
}

#[test]
fn test_subclass_and_interface_checks() {
    let reflector = zoo();
    let dog = reflector.reflect_class("Zoo\\Dog").expect("declared");

    assert_eq!(dog.is_subclass_of("Zoo\\Animal"), Ok(true));
    assert_eq!(dog.is_subclass_of("\\zoo\\named"), Ok(true));
    assert_eq!(dog.is_subclass_of("Zoo\\Pet"), Ok(true));
    assert_eq!(dog.is_subclass_of("Zoo\\Dog"), Ok(false));
    assert_eq!(dog.is_subclass_of("Zoo\\Sleeps"), Ok(false));
    assert_eq!(dog.implements_interface("Zoo\\Pet"), Ok(true));

    let pet = reflector.reflect_class("Zoo\\Pet").expect("declared");
    assert_eq!(pet.implements_interface("Zoo\\Pet"), Ok(true));
    assert_eq!(pet.is_subclass_of("Zoo\\Named"), Ok(true));

    let parent = dog.parent_class().expect("lookup").expect("has parent");
    assert_eq!(parent.name(), "Zoo\\Animal");
    assert_eq!(parent.parent_class().map(|p| p.is_none()), Ok(true));
}

#[test]
fn test_unimplemented_trait_method_makes_class_abstract() {
    let reflector = zoo();
    let cat = reflector.reflect_class("Zoo\\Cat").expect("declared");
    assert_eq!(cat.modifiers(), Ok(ClassModifiers::IS_IMPLICIT_ABSTRACT));
    assert_eq!(cat.is_instantiable(), Ok(false));

    let dog = reflector.reflect_class("Zoo\\Dog").expect("declared");
    assert_eq!(dog.modifiers(), Ok(ClassModifiers::empty()));
    assert_eq!(dog.is_instantiable(), Ok(true));

    let animal = reflector.reflect_class("Zoo\\Animal").expect("declared");
    assert_eq!(animal.modifiers(), Ok(ClassModifiers::IS_EXPLICIT_ABSTRACT));
}

#[test]
fn test_inherited_abstract_methods_make_class_abstract() {
    let source = r#"<?php
abstract class Base { abstract function f(); }
abstract class Middle extends Base {}
interface Shape { function area(); }
interface Solid extends Shape {}
interface Marker {}
abstract class Blob implements Shape {}
abstract class Tagged implements Marker {}
class Concrete extends Base { function f() {} }
"#;
    let reflector = load(source);
    let both = ClassModifiers::IS_EXPLICIT_ABSTRACT | ClassModifiers::IS_IMPLICIT_ABSTRACT;
    let modifiers = |name: &str| reflector.reflect_class(name).expect("declared").modifiers();

    assert_eq!(modifiers("Base"), Ok(both));
    assert_eq!(modifiers("Middle"), Ok(both));
    assert_eq!(modifiers("Blob"), Ok(both));
    assert_eq!(modifiers("Tagged"), Ok(ClassModifiers::IS_EXPLICIT_ABSTRACT));
    assert_eq!(modifiers("Shape"), Ok(ClassModifiers::IS_IMPLICIT_ABSTRACT));
    assert_eq!(modifiers("Solid"), Ok(ClassModifiers::IS_IMPLICIT_ABSTRACT));
    assert_eq!(modifiers("Marker"), Ok(ClassModifiers::empty()));
    assert_eq!(modifiers("Concrete"), Ok(ClassModifiers::empty()));

    assert_eq!(modifiers("Middle").map(|bits| bits.bits()), Ok(80));
    assert_eq!(modifiers("Marker").map(|bits| bits.bits()), Ok(0));
}

#[test]
fn test_diamond_interfaces_are_not_cycles() {
    let source = r#"<?php
interface Root {}
interface Left extends Root {}
interface Right extends Root {}
class Diamond implements Left, Right {}
"#;
    let reflector = load(source);
    let diamond = reflector.reflect_class("Diamond").expect("declared");
    assert_eq!(diamond.interface_names(), Ok(strings(&["Left", "Root", "Right"])));
    assert_eq!(diamond.is_subclass_of("Root"), Ok(true));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_inheritance_cycle_is_reported() {
    let source = r#"<?php
class A extends B {}
class B extends A {}
class Loop extends Loop {}
interface I extends J {}
interface J extends I {}
class Fine { public function ok() {} }
"#;
    let reflector = load(source);

    let a = reflector.reflect_class("A").expect("declared");
    assert_eq!(
        a.get_method("missing").map(|m| m.is_some()),
        Err(ReflectionError::InheritanceCycle { chain: strings(&["A", "B", "A"]) })
    );
    assert!(matches!(a.is_subclass_of("X"), Err(ReflectionError::InheritanceCycle { .. })));

    let looped = reflector.reflect_class("Loop").expect("declared");
    let err = looped.interface_names().expect_err("cycle");
    assert_eq!(err, ReflectionError::InheritanceCycle { chain: strings(&["Loop", "Loop"]) });
    assert_eq!(err.to_string(), "inheritance cycle: Loop -> Loop");

    let i = reflector.reflect_class("I").expect("declared");
    assert!(matches!(i.get_constants(None), Err(ReflectionError::InheritanceCycle { .. })));

    let fine = reflector.reflect_class("Fine").expect("declared");
    assert_eq!(fine.has_method("ok"), Ok(true));
    assert_eq!(fine.get_methods(None).map(|methods| methods.len()), Ok(1));
}

#[test]
fn test_own_members_do_not_need_ancestors() {
    let reflector = load("<?php class Orphan extends Nowhere { public function own() {} }");
    let orphan = reflector.reflect_class("Orphan").expect("declared");
    assert_eq!(orphan.has_method("own"), Ok(true));
    assert_eq!(
        orphan.has_method("inherited"),
        Err(ReflectionError::ClassNotFound { name: "Nowhere".to_string() })
    );
    assert_eq!(orphan.parent_class_name(), Some("Nowhere"));
    assert!(orphan.parent_class().is_err());
}

#[test]
fn test_inheritance_depth_limit() {
    let source = r#"<?php
class C0 {}
class C1 extends C0 {}
class C2 extends C1 {}
class C3 extends C2 {}
"#;
    let reflector = Reflector::with_options(
        NullLocator,
        ReflectorOptions::default().with_max_inheritance_depth(2),
    );
    reflector.reflect_source("/virtual/deep.php", source).expect("valid source");

    let c3 = reflector.reflect_class("C3").expect("declared");
    assert_eq!(
        c3.has_method("anything"),
        Err(ReflectionError::DepthLimitExceeded {
            what: "ancestor chain of C1".to_string(),
            limit: 2,
        })
    );
    let c1 = reflector.reflect_class("C1").expect("declared");
    assert_eq!(c1.has_method("anything"), Ok(false));
}
