//! Parser state - expression parsing.
//!
//! Precedence climbing over PHP 8 binary operator precedence. Unary
//! operators, casts and keyword expressions are handled in
//! [`ParserState::parse_unary_expression`]; assignment binds where the
//! assignable operand is parsed.

use super::base::{NodeIndex, NodeList};
use super::node::{
    ArgumentData, ArrayItemData, ArrayLiteralData, AssignData, BinaryData, CallData, CastData,
    ClassConstFetchData, ClassLikeKind, ClosureData, ConstFetchData, DimFetchData,
    KeywordExpressionData, MagicConstData, MatchArmData, MatchData, MethodCallData, NameData,
    NewData, Node, PropertyFetchData, StaticCallData, StaticPropertyFetchData, TernaryData,
    UnaryData, VariableData, modifier_flags,
};
use super::state::ParserState;
use refract_scanner::{NumericLiteral, SyntaxKind, parse_float_literal, parse_integer_literal};

/// Assignment, `yield`, `throw`, `include` right-hand sides.
const ASSIGNMENT_PRECEDENCE: u8 = 4;
const TERNARY_PRECEDENCE: u8 = 5;
/// `!` binds looser than `instanceof`.
const NOT_PRECEDENCE: u8 = 19;
/// Arithmetic unary operators and casts bind looser than `**` only.
const UNARY_PRECEDENCE: u8 = 20;
/// No binary operator binds this tightly.
const PRIMARY_PRECEDENCE: u8 = 21;

/// Binary operator precedence and right-associativity.
fn binary_precedence(kind: SyntaxKind) -> Option<(u8, bool)> {
    let entry = match kind {
        SyntaxKind::OrKeyword => (1, false),
        SyntaxKind::XorKeyword => (2, false),
        SyntaxKind::AndKeyword => (3, false),
        SyntaxKind::QuestionQuestionToken => (6, true),
        SyntaxKind::BarBarToken => (7, false),
        SyntaxKind::AmpersandAmpersandToken => (8, false),
        SyntaxKind::BarToken => (9, false),
        SyntaxKind::CaretToken => (10, false),
        SyntaxKind::AmpersandToken => (11, false),
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken
        | SyntaxKind::SpaceshipToken => (12, false),
        SyntaxKind::LessThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::GreaterThanEqualsToken => (13, false),
        SyntaxKind::DotToken => (14, false),
        SyntaxKind::LessThanLessThanToken | SyntaxKind::GreaterThanGreaterThanToken => (15, false),
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => (16, false),
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            (17, false)
        }
        SyntaxKind::InstanceofKeyword => (NOT_PRECEDENCE, false),
        SyntaxKind::AsteriskAsteriskToken => (UNARY_PRECEDENCE, true),
        _ => return None,
    };
    Some(entry)
}

impl ParserState {
    // =========================================================================
    // Binary / ternary
    // =========================================================================

    pub fn parse_expression(&mut self) -> NodeIndex {
        self.parse_binary_expression(0)
    }

    pub(crate) fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        if !self.enter_recursion() {
            let missing = self.missing_node();
            if !self.is_token(SyntaxKind::EndOfFileToken) {
                self.next_token();
            }
            return missing;
        }

        let pos = self.token_pos();
        let mut left = self.parse_unary_expression();

        loop {
            let op = self.token();

            if op == SyntaxKind::QuestionToken {
                if TERNARY_PRECEDENCE < min_precedence {
                    break;
                }
                self.next_token();
                let when_true = if self.is_token(SyntaxKind::ColonToken) {
                    NodeIndex::NONE
                } else {
                    self.parse_expression()
                };
                self.parse_expected(SyntaxKind::ColonToken);
                let when_false = self.parse_binary_expression(TERNARY_PRECEDENCE + 1);
                left = self.add_node(
                    Node::Ternary(TernaryData {
                        condition: left,
                        when_true,
                        when_false,
                    }),
                    pos,
                );
                continue;
            }

            let Some((precedence, right_assoc)) = binary_precedence(op) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.next_token();

            let right = if op == SyntaxKind::InstanceofKeyword {
                self.parse_class_reference()
            } else if right_assoc {
                self.parse_binary_expression(precedence)
            } else {
                self.parse_binary_expression(precedence + 1)
            };
            left = self.add_node(Node::Binary(BinaryData { op, left, right }), pos);
        }

        self.exit_recursion();
        left
    }

    /// Right operand of `instanceof` and `new`: a bare class name or an
    /// expression.
    fn parse_class_reference(&mut self) -> NodeIndex {
        if self.is_name_token() || self.is_token(SyntaxKind::StaticKeyword) {
            let pos = self.token_pos();
            let name = self.token_value().to_string();
            self.next_token();
            return self.add_node(Node::Name(NameData { name }), pos);
        }
        self.parse_binary_expression(PRIMARY_PRECEDENCE)
    }

    // =========================================================================
    // Unary
    // =========================================================================

    pub(crate) fn parse_unary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let op = self.token();

        match op {
            SyntaxKind::ExclamationToken => {
                self.next_token();
                let operand = self.parse_binary_expression(NOT_PRECEDENCE);
                self.add_node(Node::Unary(UnaryData { op, operand }), pos)
            }
            SyntaxKind::MinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::AtToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                self.next_token();
                let operand = self.parse_binary_expression(UNARY_PRECEDENCE);
                self.add_node(Node::Unary(UnaryData { op, operand }), pos)
            }
            SyntaxKind::CastToken => {
                let cast_type = self.token_value().to_string();
                self.next_token();
                let operand = self.parse_binary_expression(UNARY_PRECEDENCE);
                self.add_node(Node::Cast(CastData { cast_type, operand }), pos)
            }
            SyntaxKind::CloneKeyword => {
                self.next_token();
                let operand = self.parse_binary_expression(PRIMARY_PRECEDENCE);
                self.keyword_expression(op, operand, pos)
            }
            SyntaxKind::PrintKeyword => {
                self.next_token();
                let operand = self.parse_binary_expression(TERNARY_PRECEDENCE);
                self.keyword_expression(op, operand, pos)
            }
            SyntaxKind::ThrowKeyword
            | SyntaxKind::IncludeKeyword
            | SyntaxKind::IncludeOnceKeyword
            | SyntaxKind::RequireKeyword
            | SyntaxKind::RequireOnceKeyword => {
                self.next_token();
                let operand = self.parse_binary_expression(ASSIGNMENT_PRECEDENCE);
                self.keyword_expression(op, operand, pos)
            }
            SyntaxKind::YieldKeyword => self.parse_yield_expression(),
            SyntaxKind::ExitKeyword => {
                self.next_token();
                let operand = if self.parse_optional(SyntaxKind::OpenParenToken) {
                    let operand = if self.is_token(SyntaxKind::CloseParenToken) {
                        NodeIndex::NONE
                    } else {
                        self.parse_expression()
                    };
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    operand
                } else {
                    NodeIndex::NONE
                };
                self.keyword_expression(op, operand, pos)
            }
            SyntaxKind::NewKeyword => {
                let new_expr = self.parse_new_expression();
                let expr = self.parse_postfix_expression(new_expr, pos);
                self.parse_assignment_tail(expr, pos)
            }
            SyntaxKind::FunctionKeyword | SyntaxKind::FnKeyword => self.parse_closure(),
            SyntaxKind::StaticKeyword
                if matches!(
                    self.peek_token(),
                    SyntaxKind::FunctionKeyword | SyntaxKind::FnKeyword
                ) =>
            {
                self.parse_closure()
            }
            SyntaxKind::AttributeStart => {
                self.skip_attributes();
                self.parse_unary_expression()
            }
            SyntaxKind::MatchKeyword => {
                let match_expr = self.parse_match_expression();
                self.parse_postfix_expression(match_expr, pos)
            }
            _ => {
                let primary = self.parse_primary_expression();
                let expr = self.parse_postfix_expression(primary, pos);
                self.parse_assignment_tail(expr, pos)
            }
        }
    }

    fn keyword_expression(&mut self, keyword: SyntaxKind, operand: NodeIndex, pos: u32) -> NodeIndex {
        self.add_node(
            Node::KeywordExpression(KeywordExpressionData {
                keyword,
                operand,
                key: NodeIndex::NONE,
            }),
            pos,
        )
    }

    /// `yield`, `yield $v`, `yield $k => $v`, `yield from $it`
    fn parse_yield_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        if self.is_token(SyntaxKind::Identifier) && self.token_value().eq_ignore_ascii_case("from")
        {
            self.next_token();
            let operand = self.parse_binary_expression(ASSIGNMENT_PRECEDENCE);
            return self.keyword_expression(SyntaxKind::YieldKeyword, operand, pos);
        }

        let ends_expression = matches!(
            self.token(),
            SyntaxKind::SemicolonToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CommaToken
                | SyntaxKind::EndOfFileToken
        );
        if ends_expression {
            return self.keyword_expression(SyntaxKind::YieldKeyword, NodeIndex::NONE, pos);
        }

        let first = self.parse_binary_expression(ASSIGNMENT_PRECEDENCE);
        let (key, operand) = if self.parse_optional(SyntaxKind::FatArrowToken) {
            (first, self.parse_binary_expression(ASSIGNMENT_PRECEDENCE))
        } else {
            (NodeIndex::NONE, first)
        };
        self.add_node(
            Node::KeywordExpression(KeywordExpressionData {
                keyword: SyntaxKind::YieldKeyword,
                operand,
                key,
            }),
            pos,
        )
    }

    /// `= expr`, `=& expr` and compound assignment after an assignable
    /// operand.
    fn parse_assignment_tail(&mut self, target: NodeIndex, pos: u32) -> NodeIndex {
        let op = self.token();
        if op != SyntaxKind::EqualsToken && !op.is_compound_assignment() {
            return target;
        }
        if !self.arena.get(target).is_some_and(Node::is_assignable) {
            return target;
        }
        self.next_token();
        let by_ref = op == SyntaxKind::EqualsToken && self.parse_optional(SyntaxKind::AmpersandToken);
        let value = self.parse_binary_expression(ASSIGNMENT_PRECEDENCE);
        self.add_node(
            Node::Assign(AssignData {
                op,
                target,
                value,
                by_ref,
            }),
            pos,
        )
    }

    // =========================================================================
    // Primary
    // =========================================================================

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();

        match self.token() {
            SyntaxKind::Variable => {
                let name = self.token_value().to_string();
                self.next_token();
                self.add_node(Node::Variable(VariableData { name }), pos)
            }
            SyntaxKind::DollarToken => {
                self.next_token();
                let operand = if self.parse_optional(SyntaxKind::OpenBraceToken) {
                    let inner = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBraceToken);
                    inner
                } else {
                    self.parse_primary_expression()
                };
                self.add_node(
                    Node::Unary(UnaryData {
                        op: SyntaxKind::DollarToken,
                        operand,
                    }),
                    pos,
                )
            }
            SyntaxKind::IntegerLiteral => {
                let node = match parse_integer_literal(self.token_value()) {
                    NumericLiteral::Int(value) => Node::IntLiteral(value),
                    NumericLiteral::Float(value) => Node::FloatLiteral(value),
                };
                self.next_token();
                self.add_node(node, pos)
            }
            SyntaxKind::FloatLiteral => {
                let value = parse_float_literal(self.token_value());
                self.next_token();
                self.add_node(Node::FloatLiteral(value), pos)
            }
            SyntaxKind::StringLiteral => {
                let value = self.scanner.token_bytes().to_vec();
                self.next_token();
                self.add_node(Node::StringLiteral(value), pos)
            }
            SyntaxKind::InterpolatedString => {
                let value = self.token_value().to_string();
                self.next_token();
                self.add_node(Node::InterpolatedString(value), pos)
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                self.parse_array_items(pos, SyntaxKind::CloseBracketToken, true)
            }
            SyntaxKind::ArrayKeyword | SyntaxKind::ListKeyword
                if self.peek_token() == SyntaxKind::OpenParenToken =>
            {
                self.next_token();
                self.next_token();
                self.parse_array_items(pos, SyntaxKind::CloseParenToken, false)
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                inner
            }
            SyntaxKind::IssetKeyword | SyntaxKind::EmptyKeyword | SyntaxKind::EvalKeyword => {
                let name = self.token_value().to_ascii_lowercase();
                self.next_token();
                let callee = self.add_node(Node::Name(NameData { name }), pos);
                self.parse_call(callee, pos)
            }
            SyntaxKind::Identifier
            | SyntaxKind::QualifiedName
            | SyntaxKind::StaticKeyword
            | SyntaxKind::EnumKeyword
            | SyntaxKind::ReadonlyKeyword => {
                let name = self.token_value().to_string();
                self.next_token();
                match self.token() {
                    SyntaxKind::OpenParenToken => {
                        let callee = self.add_node(Node::Name(NameData { name }), pos);
                        self.parse_call(callee, pos)
                    }
                    SyntaxKind::ColonColonToken => {
                        self.add_node(Node::Name(NameData { name }), pos)
                    }
                    _ => self.add_node(Node::ConstFetch(ConstFetchData { name }), pos),
                }
            }
            kind if kind.is_magic_constant() => {
                self.next_token();
                self.add_node(Node::MagicConst(MagicConstData { kind }), pos)
            }
            _ => {
                let message = format!("Expression expected, found {}", self.current_token_display());
                self.parse_error_at_current_token(&message);
                let closes = matches!(
                    self.token(),
                    SyntaxKind::CloseParenToken
                        | SyntaxKind::CloseBracketToken
                        | SyntaxKind::CloseBraceToken
                        | SyntaxKind::SemicolonToken
                        | SyntaxKind::CommaToken
                        | SyntaxKind::EndOfFileToken
                );
                let missing = self.missing_node();
                if !closes {
                    self.next_token();
                }
                missing
            }
        }
    }

    /// Array elements after the opening token, through `close`.
    fn parse_array_items(&mut self, pos: u32, close: SyntaxKind, short_syntax: bool) -> NodeIndex {
        let mut items = Vec::new();

        loop {
            if self.is_token(close) || self.is_token(SyntaxKind::EndOfFileToken) {
                break;
            }
            if self.parse_optional(SyntaxKind::CommaToken) {
                // Skipped slot in list() destructuring
                items.push(NodeIndex::NONE);
                continue;
            }

            let item_pos = self.token_pos();
            let item = if self.parse_optional(SyntaxKind::DotDotDotToken) {
                let value = self.parse_expression();
                ArrayItemData {
                    key: NodeIndex::NONE,
                    value,
                    by_ref: false,
                    spread: true,
                }
            } else if self.parse_optional(SyntaxKind::AmpersandToken) {
                let value = self.parse_expression();
                ArrayItemData {
                    key: NodeIndex::NONE,
                    value,
                    by_ref: true,
                    spread: false,
                }
            } else {
                let first = self.parse_expression();
                if self.parse_optional(SyntaxKind::FatArrowToken) {
                    let by_ref = self.parse_optional(SyntaxKind::AmpersandToken);
                    let value = self.parse_expression();
                    ArrayItemData {
                        key: first,
                        value,
                        by_ref,
                        spread: false,
                    }
                } else {
                    ArrayItemData {
                        key: NodeIndex::NONE,
                        value: first,
                        by_ref: false,
                        spread: false,
                    }
                }
            };
            items.push(self.add_node(Node::ArrayItem(item), item_pos));

            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        self.parse_expected(close);
        self.add_node(
            Node::ArrayLiteral(ArrayLiteralData {
                items: NodeList::with_nodes(items),
                short_syntax,
            }),
            pos,
        )
    }

    // =========================================================================
    // Postfix: calls, member access, dim fetch
    // =========================================================================

    fn parse_postfix_expression(&mut self, mut expr: NodeIndex, pos: u32) -> NodeIndex {
        loop {
            match self.token() {
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let dim = if self.is_token(SyntaxKind::CloseBracketToken) {
                        NodeIndex::NONE
                    } else {
                        self.parse_expression()
                    };
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expr = self.add_node(Node::DimFetch(DimFetchData { object: expr, dim }), pos);
                }
                SyntaxKind::ArrowToken | SyntaxKind::QuestionArrowToken => {
                    let nullsafe = self.is_token(SyntaxKind::QuestionArrowToken);
                    self.next_token();
                    let name = self.parse_member_name();
                    if self.is_token(SyntaxKind::OpenParenToken) {
                        let (arguments, _) = self.parse_arguments();
                        expr = self.add_node(
                            Node::MethodCall(MethodCallData {
                                object: expr,
                                name,
                                arguments,
                                nullsafe,
                            }),
                            pos,
                        );
                    } else {
                        expr = self.add_node(
                            Node::PropertyFetch(PropertyFetchData {
                                object: expr,
                                name,
                                nullsafe,
                            }),
                            pos,
                        );
                    }
                }
                SyntaxKind::ColonColonToken => {
                    self.next_token();
                    expr = self.parse_static_member(expr, pos);
                }
                SyntaxKind::OpenParenToken => {
                    expr = self.parse_call(expr, pos);
                }
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                    let op = self.token();
                    self.next_token();
                    expr = self.add_node(
                        Node::PostfixUnary(UnaryData { op, operand: expr }),
                        pos,
                    );
                }
                _ => break,
            }
        }
        expr
    }

    /// Member after `::`.
    fn parse_static_member(&mut self, class: NodeIndex, pos: u32) -> NodeIndex {
        match self.token() {
            SyntaxKind::Variable => {
                let name = self.token_value().to_string();
                self.next_token();
                self.add_node(
                    Node::StaticPropertyFetch(StaticPropertyFetchData { class, name }),
                    pos,
                )
            }
            SyntaxKind::ClassKeyword => {
                self.next_token();
                self.add_node(
                    Node::ClassConstFetch(ClassConstFetchData {
                        class,
                        name: "class".to_string(),
                    }),
                    pos,
                )
            }
            SyntaxKind::OpenBraceToken => {
                self.next_token();
                let name = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseBraceToken);
                let (arguments, _) = self.parse_arguments();
                self.add_node(
                    Node::StaticCall(StaticCallData {
                        class,
                        name,
                        arguments,
                    }),
                    pos,
                )
            }
            _ if self.is_identifier_or_keyword() => {
                let name_pos = self.token_pos();
                let name = self.token_value().to_string();
                self.next_token();
                if self.is_token(SyntaxKind::OpenParenToken) {
                    let name = self.add_node(Node::Name(NameData { name }), name_pos);
                    let (arguments, _) = self.parse_arguments();
                    self.add_node(
                        Node::StaticCall(StaticCallData {
                            class,
                            name,
                            arguments,
                        }),
                        pos,
                    )
                } else {
                    self.add_node(
                        Node::ClassConstFetch(ClassConstFetchData { class, name }),
                        pos,
                    )
                }
            }
            _ => {
                let message = format!(
                    "Expected member name after '::', found {}",
                    self.current_token_display()
                );
                self.parse_error_at_current_token(&message);
                self.missing_node()
            }
        }
    }

    /// Member name after `->` / `?->`: identifier, variable or `{expr}`.
    fn parse_member_name(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::Variable => self.parse_primary_expression(),
            SyntaxKind::OpenBraceToken => {
                self.next_token();
                let inner = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseBraceToken);
                inner
            }
            _ => match self.parse_identifier_or_keyword() {
                Some(name) => self.add_node(Node::Name(NameData { name }), pos),
                None => self.missing_node(),
            },
        }
    }

    fn parse_call(&mut self, callee: NodeIndex, pos: u32) -> NodeIndex {
        let (arguments, callable_syntax) = self.parse_arguments();
        self.add_node(
            Node::Call(CallData {
                callee,
                arguments,
                callable_syntax,
            }),
            pos,
        )
    }

    /// `( [arg {, arg}] [,] )`; returns the arguments and whether this was
    /// first-class callable syntax `(...)`.
    fn parse_arguments(&mut self) -> (NodeList, bool) {
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return (NodeList::new(), false);
        }

        if self.is_token(SyntaxKind::DotDotDotToken)
            && self.peek_token() == SyntaxKind::CloseParenToken
        {
            self.next_token();
            self.next_token();
            return (NodeList::new(), true);
        }

        let mut arguments = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos = self.token_pos();
            let spread = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = if !spread
                && self.is_identifier_or_keyword()
                && self.peek_token() == SyntaxKind::ColonToken
            {
                let name = self.token_value().to_string();
                self.next_token();
                self.next_token();
                Some(name)
            } else {
                None
            };
            let value = self.parse_expression();
            arguments.push(self.add_node(Node::Argument(ArgumentData { name, value, spread }), pos));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        self.parse_expected(SyntaxKind::CloseParenToken);
        (NodeList::with_nodes(arguments), false)
    }

    // =========================================================================
    // new / closures / match
    // =========================================================================

    fn parse_new_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        let class = match self.token() {
            SyntaxKind::ClassKeyword => {
                // Anonymous class: `new class(args) extends A implements B { ... }`
                let class_pos = self.token_pos();
                self.next_token();
                let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
                    self.parse_arguments().0
                } else {
                    NodeList::new()
                };
                let data = self.parse_class_like_tail(
                    ClassLikeKind::Class,
                    "class@anonymous".to_string(),
                    modifier_flags::NONE,
                    None,
                );
                let class = self.add_node(Node::ClassLike(data), class_pos);
                return self.add_node(Node::New(NewData { class, arguments }), pos);
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                inner
            }
            SyntaxKind::Variable => self.parse_new_class_variable(),
            _ => self.parse_class_reference(),
        };

        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_arguments().0
        } else {
            NodeList::new()
        };
        self.add_node(Node::New(NewData { class, arguments }), pos)
    }

    /// `new $a->b['c']` names a class through variable access without calls.
    fn parse_new_class_variable(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut expr = self.parse_primary_expression();
        loop {
            match self.token() {
                SyntaxKind::ArrowToken | SyntaxKind::QuestionArrowToken => {
                    let nullsafe = self.is_token(SyntaxKind::QuestionArrowToken);
                    self.next_token();
                    let name = self.parse_member_name();
                    expr = self.add_node(
                        Node::PropertyFetch(PropertyFetchData {
                            object: expr,
                            name,
                            nullsafe,
                        }),
                        pos,
                    );
                }
                SyntaxKind::ColonColonToken if self.peek_token() == SyntaxKind::Variable => {
                    self.next_token();
                    let name = self.token_value().to_string();
                    self.next_token();
                    expr = self.add_node(
                        Node::StaticPropertyFetch(StaticPropertyFetchData { class: expr, name }),
                        pos,
                    );
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let dim = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expr = self.add_node(Node::DimFetch(DimFetchData { object: expr, dim }), pos);
                }
                _ => break,
            }
        }
        expr
    }

    /// `[static] function (...) [use (...)] [: T] { ... }` or
    /// `[static] fn (...) [: T] => expr`.
    fn parse_closure(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let is_static = self.parse_optional(SyntaxKind::StaticKeyword);
        let is_arrow = self.is_token(SyntaxKind::FnKeyword);
        self.next_token();
        self.parse_optional(SyntaxKind::AmpersandToken);
        let parameters = self.parse_parameter_list();

        if !is_arrow && self.parse_optional(SyntaxKind::UseKeyword) {
            self.parse_expected(SyntaxKind::OpenParenToken);
            while !self.is_token(SyntaxKind::CloseParenToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                self.parse_optional(SyntaxKind::AmpersandToken);
                self.parse_expected(SyntaxKind::Variable);
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
        }

        let return_type = if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };

        if is_arrow {
            self.parse_expected(SyntaxKind::FatArrowToken);
            self.parse_binary_expression(ASSIGNMENT_PRECEDENCE);
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            self.skip_function_body();
        } else {
            self.parse_expected(SyntaxKind::OpenBraceToken);
        }

        self.add_node(
            Node::Closure(ClosureData {
                is_arrow,
                is_static,
                parameters,
                return_type,
            }),
            pos,
        )
    }

    /// `match (subject) { a, b => x, default => y }`
    fn parse_match_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let subject = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.parse_expected(SyntaxKind::OpenBraceToken);

        let mut arms = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let arm_pos = self.token_pos();
            let mut conditions = Vec::new();
            if self.parse_optional(SyntaxKind::DefaultKeyword) {
                // default arm: no conditions
            } else {
                loop {
                    conditions.push(self.parse_expression());
                    if !self.parse_optional(SyntaxKind::CommaToken)
                        || self.is_token(SyntaxKind::FatArrowToken)
                    {
                        break;
                    }
                }
            }
            self.parse_expected(SyntaxKind::FatArrowToken);
            let body = self.parse_expression();
            arms.push(self.add_node(
                Node::MatchArm(MatchArmData {
                    conditions: NodeList::with_nodes(conditions),
                    body,
                }),
                arm_pos,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);

        self.add_node(
            Node::Match(MatchData {
                subject,
                arms: NodeList::with_nodes(arms),
            }),
            pos,
        )
    }
}
