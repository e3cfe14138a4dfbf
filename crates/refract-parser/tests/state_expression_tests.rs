//! Tests for expression parsing in the parser.
use crate::parser::{Node, NodeArena, NodeIndex, ParserState};
use refract_scanner::SyntaxKind;

/// Parse `const X = <expr>;` and return the parser plus the value node.
fn parse_const_value(expr: &str) -> (ParserState, NodeIndex) {
    let source = format!("<?php const X = {expr};");
    let mut parser = ParserState::new("test.php".to_string(), source);
    let root = parser.parse_source_file();
    let arena = parser.get_arena();
    let statement = arena.get_source_file(root).expect("root").statements.nodes[0];
    let Some(Node::ConstStatement(data)) = arena.get(statement) else {
        panic!("expected const statement");
    };
    let Some(Node::ConstDeclarator(decl)) = arena.get(data.declarators.nodes[0]) else {
        panic!("expected declarator");
    };
    let value = decl.value;
    (parser, value)
}

fn binary(arena: &NodeArena, idx: NodeIndex) -> (SyntaxKind, NodeIndex, NodeIndex) {
    match arena.get(idx) {
        Some(Node::Binary(data)) => (data.op, data.left, data.right),
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn parse_multiplication_binds_tighter_than_addition() {
    let (parser, value) = parse_const_value("1 + 2 * 3");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let (op, left, right) = binary(arena, value);
    assert_eq!(op, SyntaxKind::PlusToken);
    assert_eq!(arena.get(left), Some(&Node::IntLiteral(1)));
    assert_eq!(binary(arena, right).0, SyntaxKind::AsteriskToken);
}

#[test]
fn parse_subtraction_is_left_associative() {
    let (parser, value) = parse_const_value("10 - 4 - 3");
    let arena = parser.get_arena();
    let (op, left, right) = binary(arena, value);
    assert_eq!(op, SyntaxKind::MinusToken);
    assert_eq!(binary(arena, left).0, SyntaxKind::MinusToken);
    assert_eq!(arena.get(right), Some(&Node::IntLiteral(3)));
}

#[test]
fn parse_power_is_right_associative_and_binds_over_unary_minus() {
    let (parser, value) = parse_const_value("2 ** 3 ** 2");
    let arena = parser.get_arena();
    let (op, left, right) = binary(arena, value);
    assert_eq!(op, SyntaxKind::AsteriskAsteriskToken);
    assert_eq!(arena.get(left), Some(&Node::IntLiteral(2)));
    assert_eq!(binary(arena, right).0, SyntaxKind::AsteriskAsteriskToken);

    let (parser, value) = parse_const_value("-2 ** 2");
    let arena = parser.get_arena();
    let Some(Node::Unary(unary)) = arena.get(value) else {
        panic!("expected unary minus");
    };
    assert_eq!(unary.op, SyntaxKind::MinusToken);
    assert_eq!(binary(arena, unary.operand).0, SyntaxKind::AsteriskAsteriskToken);
}

#[test]
fn parse_concatenation_binds_looser_than_addition() {
    let (parser, value) = parse_const_value("'a' . 1 + 2");
    let arena = parser.get_arena();
    let (op, _, right) = binary(arena, value);
    assert_eq!(op, SyntaxKind::DotToken);
    assert_eq!(binary(arena, right).0, SyntaxKind::PlusToken);
}

#[test]
fn parse_logical_operator_precedence() {
    let (parser, value) = parse_const_value("true && false || true");
    let arena = parser.get_arena();
    let (op, left, _) = binary(arena, value);
    assert_eq!(op, SyntaxKind::BarBarToken);
    assert_eq!(binary(arena, left).0, SyntaxKind::AmpersandAmpersandToken);

    let (parser, value) = parse_const_value("1 == 2 | 3");
    let arena = parser.get_arena();
    let (op, left, _) = binary(arena, value);
    assert_eq!(op, SyntaxKind::BarToken);
    assert_eq!(binary(arena, left).0, SyntaxKind::EqualsEqualsToken);
}

#[test]
fn parse_coalesce_is_right_associative() {
    let (parser, value) = parse_const_value("A ?? B ?? C");
    let arena = parser.get_arena();
    let (op, left, right) = binary(arena, value);
    assert_eq!(op, SyntaxKind::QuestionQuestionToken);
    assert!(matches!(arena.get(left), Some(Node::ConstFetch(c)) if c.name == "A"));
    assert_eq!(binary(arena, right).0, SyntaxKind::QuestionQuestionToken);
}

#[test]
fn parse_ternary_and_short_ternary() {
    let (parser, value) = parse_const_value("A ? 1 : 2");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let Some(Node::Ternary(ternary)) = arena.get(value) else {
        panic!("expected ternary");
    };
    assert!(ternary.when_true.is_some());

    let (parser, value) = parse_const_value("A ?: 'fallback'");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let Some(Node::Ternary(ternary)) = arena.get(value) else {
        panic!("expected short ternary");
    };
    assert!(ternary.when_true.is_none());
    assert!(matches!(arena.get(ternary.when_false), Some(Node::StringLiteral(s)) if s == b"fallback"));
}

#[test]
fn parse_ternary_binds_looser_than_coalesce() {
    let (parser, value) = parse_const_value("A ?? B ? 1 : 2");
    let arena = parser.get_arena();
    let Some(Node::Ternary(ternary)) = arena.get(value) else {
        panic!("expected ternary");
    };
    assert_eq!(binary(arena, ternary.condition).0, SyntaxKind::QuestionQuestionToken);
}

#[test]
fn parse_class_constant_fetches() {
    let (parser, value) = parse_const_value("self::BASE");
    let arena = parser.get_arena();
    let Some(Node::ClassConstFetch(fetch)) = arena.get(value) else {
        panic!("expected class constant fetch");
    };
    assert_eq!(fetch.name, "BASE");
    assert!(matches!(arena.get(fetch.class), Some(Node::Name(n)) if n.name == "self"));

    let (parser, value) = parse_const_value("\\App\\Model::class");
    let arena = parser.get_arena();
    let Some(Node::ClassConstFetch(fetch)) = arena.get(value) else {
        panic!("expected ::class fetch");
    };
    assert_eq!(fetch.name, "class");
    assert!(matches!(arena.get(fetch.class), Some(Node::Name(n)) if n.name == "\\App\\Model"));

    let (parser, value) = parse_const_value("static::X");
    let arena = parser.get_arena();
    let Some(Node::ClassConstFetch(fetch)) = arena.get(value) else {
        panic!("expected static fetch");
    };
    assert!(matches!(arena.get(fetch.class), Some(Node::Name(n)) if n.name == "static"));
}

#[test]
fn parse_keyword_named_class_constant() {
    let (parser, value) = parse_const_value("Foo::DEFAULT");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    assert!(matches!(arena.get(value), Some(Node::ClassConstFetch(f)) if f.name == "DEFAULT"));
}

#[test]
fn parse_constant_and_magic_constant() {
    let (parser, value) = parse_const_value("\\PHP_EOL");
    let arena = parser.get_arena();
    assert!(matches!(arena.get(value), Some(Node::ConstFetch(c)) if c.name == "\\PHP_EOL"));

    let (parser, value) = parse_const_value("__DIR__");
    let arena = parser.get_arena();
    assert!(matches!(
        arena.get(value),
        Some(Node::MagicConst(m)) if m.kind == SyntaxKind::DirMagicConst
    ));
}

#[test]
fn parse_array_literals() {
    let (parser, value) = parse_const_value("[1, 'k' => 2, ...OTHER, ]");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let Some(Node::ArrayLiteral(array)) = arena.get(value) else {
        panic!("expected array");
    };
    assert!(array.short_syntax);
    assert_eq!(array.items.len(), 3);

    let items: Vec<_> = array
        .items
        .iter()
        .map(|i| match arena.get(i) {
            Some(Node::ArrayItem(item)) => item.clone(),
            other => panic!("expected item, got {other:?}"),
        })
        .collect();
    assert!(items[0].key.is_none());
    assert!(matches!(arena.get(items[1].key), Some(Node::StringLiteral(s)) if s == b"k"));
    assert!(items[2].spread);

    let (parser, value) = parse_const_value("array(1, array(2))");
    let arena = parser.get_arena();
    let Some(Node::ArrayLiteral(array)) = arena.get(value) else {
        panic!("expected long array");
    };
    assert!(!array.short_syntax);
    assert_eq!(array.items.len(), 2);
}

#[test]
fn parse_dim_fetch_and_enum_value_access() {
    let (parser, value) = parse_const_value("self::MAP['a'][0]");
    let arena = parser.get_arena();
    let Some(Node::DimFetch(outer)) = arena.get(value) else {
        panic!("expected dim fetch");
    };
    assert_eq!(arena.get(outer.dim), Some(&Node::IntLiteral(0)));
    assert!(matches!(arena.get(outer.object), Some(Node::DimFetch(_))));

    let (parser, value) = parse_const_value("Suit::Hearts->value");
    let arena = parser.get_arena();
    let Some(Node::PropertyFetch(fetch)) = arena.get(value) else {
        panic!("expected property fetch");
    };
    assert!(!fetch.nullsafe);
    assert!(matches!(arena.get(fetch.name), Some(Node::Name(n)) if n.name == "value"));
    assert!(matches!(arena.get(fetch.object), Some(Node::ClassConstFetch(_))));
}

#[test]
fn parse_calls_with_named_and_spread_arguments() {
    let (parser, value) = parse_const_value("dirname(__FILE__, levels: 2)");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let Some(Node::Call(call)) = arena.get(value) else {
        panic!("expected call");
    };
    assert!(!call.callable_syntax);
    assert_eq!(call.arguments.len(), 2);
    let Some(Node::Argument(named)) = arena.get(call.arguments.nodes[1]) else {
        panic!("expected argument");
    };
    assert_eq!(named.name.as_deref(), Some("levels"));

    let (parser, value) = parse_const_value("implode(',', ...PARTS)");
    let arena = parser.get_arena();
    let Some(Node::Call(call)) = arena.get(value) else {
        panic!("expected call");
    };
    let Some(Node::Argument(spread)) = arena.get(call.arguments.nodes[1]) else {
        panic!("expected argument");
    };
    assert!(spread.spread);

    let (parser, value) = parse_const_value("strlen(...)");
    let arena = parser.get_arena();
    let Some(Node::Call(call)) = arena.get(value) else {
        panic!("expected call");
    };
    assert!(call.callable_syntax);
}

#[test]
fn parse_new_expression() {
    let (parser, value) = parse_const_value("new Foo\\Bar(1, 2)");
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let Some(Node::New(new)) = arena.get(value) else {
        panic!("expected new");
    };
    assert_eq!(new.arguments.len(), 2);
    assert!(matches!(arena.get(new.class), Some(Node::Name(n)) if n.name == "Foo\\Bar"));
}

#[test]
fn parse_anonymous_class() {
    let (parser, value) = parse_const_value("new class(1) extends Base { public $x = 1; }");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", parser.get_diagnostics());
    let arena = parser.get_arena();
    let Some(Node::New(new)) = arena.get(value) else {
        panic!("expected new");
    };
    let class = arena.get_class_like(new.class).expect("anonymous class");
    assert_eq!(class.extends, vec!["Base".to_string()]);
    assert_eq!(new.arguments.len(), 1);
}

#[test]
fn parse_casts_and_unary_not() {
    let (parser, value) = parse_const_value("(int) '5'");
    let arena = parser.get_arena();
    let Some(Node::Cast(cast)) = arena.get(value) else {
        panic!("expected cast");
    };
    assert_eq!(cast.cast_type, "int");

    let (parser, value) = parse_const_value("!A instanceof B");
    let arena = parser.get_arena();
    let Some(Node::Unary(not)) = arena.get(value) else {
        panic!("expected unary not");
    };
    assert_eq!(not.op, SyntaxKind::ExclamationToken);
    assert_eq!(binary(arena, not.operand).0, SyntaxKind::InstanceofKeyword);
}

#[test]
fn parse_integer_overflow_becomes_float() {
    let (parser, value) = parse_const_value("9223372036854775808");
    let arena = parser.get_arena();
    assert_eq!(arena.get(value), Some(&Node::FloatLiteral(9.223_372_036_854_776e18)));

    let (parser, value) = parse_const_value("0x1F");
    assert_eq!(parser.get_arena().get(value), Some(&Node::IntLiteral(31)));
}

#[test]
fn parse_interpolated_string_is_kept_raw() {
    let (parser, value) = parse_const_value("\"Hello $name\"");
    let arena = parser.get_arena();
    assert!(matches!(arena.get(value), Some(Node::InterpolatedString(_))));
}

#[test]
fn parse_match_and_arrow_function() {
    let (parser, value) = parse_const_value("match (A) { 1, 2 => 'low', default => 'high', }");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", parser.get_diagnostics());
    let arena = parser.get_arena();
    let Some(Node::Match(data)) = arena.get(value) else {
        panic!("expected match");
    };
    assert_eq!(data.arms.len(), 2);
    let Some(Node::MatchArm(first)) = arena.get(data.arms.nodes[0]) else {
        panic!("expected arm");
    };
    assert_eq!(first.conditions.len(), 2);
    let Some(Node::MatchArm(default)) = arena.get(data.arms.nodes[1]) else {
        panic!("expected arm");
    };
    assert!(default.conditions.is_empty());

    let (parser, value) = parse_const_value("static fn(int $x): int => $x * 2");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", parser.get_diagnostics());
    let arena = parser.get_arena();
    let Some(Node::Closure(closure)) = arena.get(value) else {
        panic!("expected closure");
    };
    assert!(closure.is_arrow);
    assert!(closure.is_static);
    assert_eq!(closure.parameters.len(), 1);
}

#[test]
fn parse_assignment_in_define_value() {
    let mut parser = ParserState::new(
        "test.php".to_string(),
        "<?php define('X', $a = &$b);".to_string(),
    );
    let root = parser.parse_source_file();
    assert!(parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let stmt = arena.get_source_file(root).expect("root").statements.nodes[0];
    let Some(Node::ExpressionStatement(expr)) = arena.get(stmt) else {
        panic!("expected expression statement");
    };
    let Some(Node::Call(call)) = arena.get(expr.expression) else {
        panic!("expected call");
    };
    let Some(Node::Argument(arg)) = arena.get(call.arguments.nodes[1]) else {
        panic!("expected argument");
    };
    assert!(matches!(arena.get(arg.value), Some(Node::Assign(a)) if a.by_ref));
}

#[test]
fn parse_missing_expression_reports_diagnostic() {
    let (parser, value) = parse_const_value("");
    assert!(!parser.get_diagnostics().is_empty());
    assert_eq!(parser.get_arena().get(value), Some(&Node::Missing));
}

#[test]
fn parse_expression_ranges_cover_source() {
    let (parser, value) = parse_const_value("1 + 22");
    let range = parser.get_arena().range(value).expect("range");
    let source = parser.source_text();
    assert_eq!(&source[range.pos as usize..range.end as usize], "1 + 22");
}

#[test]
fn parse_deep_nesting_is_bounded() {
    // Debug builds use large frames; give the parser room to reach the limit
    let handle = std::thread::Builder::new()
        .stack_size(32 * 1024 * 1024)
        .spawn(|| {
            let depth = 5000;
            let expr = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
            let (parser, _value) = parse_const_value(&expr);
            parser
                .get_diagnostics()
                .iter()
                .any(|d| d.message.contains("nesting"))
        })
        .expect("spawn parser thread");
    assert!(handle.join().expect("parser thread"));
}
