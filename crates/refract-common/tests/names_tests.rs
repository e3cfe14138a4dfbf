//! Tests for qualified names and lookup keys.

use crate::names::*;

#[test]
fn test_parse_name_kinds() {
    let fq = QualifiedName::parse("\\Foo\\Bar");
    assert_eq!(fq.kind, NameKind::FullyQualified);
    assert_eq!(fq.joined(), "Foo\\Bar");
    assert_eq!(fq.to_string(), "\\Foo\\Bar");

    let q = QualifiedName::parse("Foo\\Bar\\Baz");
    assert_eq!(q.kind, NameKind::Qualified);
    assert_eq!(q.first(), "Foo");
    assert_eq!(q.last(), "Baz");
    assert_eq!(q.tail(), "Bar\\Baz");

    let rel = QualifiedName::parse("namespace\\Foo");
    assert_eq!(rel.kind, NameKind::Relative);
    assert_eq!(rel.joined(), "Foo");

    let unq = QualifiedName::parse("Foo");
    assert!(unq.is_unqualified());
}

#[test]
fn test_qualified_name_serializes() {
    let name = QualifiedName::parse("\\App\\Model");
    assert_eq!(
        serde_json::to_value(&name).expect("serializable"),
        serde_json::json!({ "kind": "FullyQualified", "parts": ["App", "Model"] })
    );
}

#[test]
fn test_split_and_join_namespace() {
    assert_eq!(split_namespace("\\A\\B\\C"), ("A\\B", "C"));
    assert_eq!(split_namespace("C"), ("", "C"));
    assert_eq!(join_namespace("", "C"), "C");
    assert_eq!(join_namespace("A\\B", "C"), "A\\B\\C");
}

#[test]
fn test_name_key_case_policy() {
    assert_eq!(NameKey::folded("\\App\\User"), NameKey::folded("app\\USER"));
    assert_ne!(NameKey::exact("FOO"), NameKey::exact("foo"));
    assert_eq!(NameKey::constant("App\\FOO"), NameKey::constant("\\APP\\FOO"));
    assert_ne!(NameKey::constant("App\\FOO"), NameKey::constant("App\\foo"));
}
