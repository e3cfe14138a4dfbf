//! Tests for type declaration parsing in the parser.
use crate::parser::{Node, NodeArena, NodeIndex, ParserState};

fn parse_function(source: &str) -> (ParserState, NodeIndex) {
    let mut parser = ParserState::new("test.php".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let function = parser.get_arena().get_source_file(root).expect("root").statements.nodes[0];
    (parser, function)
}

fn param_type(arena: &NodeArena, function: NodeIndex, index: usize) -> NodeIndex {
    let data = arena.get_function_like(function).expect("function");
    arena
        .get_parameter(data.parameters.nodes[index])
        .expect("parameter")
        .type_node
}

fn type_names(arena: &NodeArena, idx: NodeIndex) -> Vec<String> {
    match arena.get(idx) {
        Some(Node::UnionType(data) | Node::IntersectionType(data)) => data
            .types
            .iter()
            .flat_map(|t| type_names(arena, t))
            .collect(),
        Some(Node::NamedType(data)) => vec![data.name.clone()],
        Some(Node::NullableType(data)) => type_names(arena, data.inner),
        other => panic!("not a type node: {other:?}"),
    }
}

#[test]
fn parse_nullable_and_plain_types() {
    let (parser, function) = parse_function("<?php function f(?int $a, string $b, $c) {}");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    assert!(matches!(
        arena.get(param_type(arena, function, 0)),
        Some(Node::NullableType(_))
    ));
    assert_eq!(type_names(arena, param_type(arena, function, 1)), vec!["string"]);
    assert!(param_type(arena, function, 2).is_none());
}

#[test]
fn parse_union_and_intersection_types() {
    let (parser, function) =
        parse_function("<?php function f(int|string|null $a, Countable&Traversable $b) {}");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();

    let union = param_type(arena, function, 0);
    assert!(matches!(arena.get(union), Some(Node::UnionType(_))));
    assert_eq!(type_names(arena, union), vec!["int", "string", "null"]);

    let intersection = param_type(arena, function, 1);
    assert!(matches!(arena.get(intersection), Some(Node::IntersectionType(_))));
    assert_eq!(type_names(arena, intersection), vec!["Countable", "Traversable"]);
}

#[test]
fn parse_dnf_type() {
    let (parser, function) = parse_function("<?php function f((A&B)|null $a) {}");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", parser.get_diagnostics());
    let arena = parser.get_arena();
    let ty = param_type(arena, function, 0);
    let Some(Node::UnionType(data)) = arena.get(ty) else {
        panic!("expected union");
    };
    assert!(matches!(
        arena.get(data.types.nodes[0]),
        Some(Node::IntersectionType(_))
    ));
}

#[test]
fn parse_by_ref_parameter_is_not_intersection() {
    let (parser, function) = parse_function("<?php function f(array &$a, Foo &...$rest) {}");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let data = arena.get_function_like(function).expect("function");
    let first = arena.get_parameter(data.parameters.nodes[0]).expect("param");
    assert!(first.by_ref);
    assert_eq!(type_names(arena, first.type_node), vec!["array"]);
    let rest = arena.get_parameter(data.parameters.nodes[1]).expect("param");
    assert!(rest.by_ref);
    assert!(rest.variadic);
}

#[test]
fn parse_return_types() {
    let (parser, function) = parse_function("<?php function f(): ?\\Foo\\Bar {}");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let data = arena.get_function_like(function).expect("function");
    assert_eq!(type_names(arena, data.return_type), vec!["\\Foo\\Bar"]);

    let (parser, function) = parse_function("<?php function g() {}");
    let data = parser.get_arena().get_function_like(function).expect("function");
    assert!(data.return_type.is_none());
}

#[test]
fn parse_invalid_type_reports_diagnostic() {
    let (parser, _function) = parse_function("<?php function f(): { }");
    assert!(!parser.get_diagnostics().is_empty());
}
