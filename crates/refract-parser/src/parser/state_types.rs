//! Parser state - type declarations.
//!
//! Grammar: `?T`, `T`, `A|B`, `A&B` and DNF types such as `(A&B)|null`.

use super::base::{NodeIndex, NodeList};
use super::node::{CompositeTypeData, NamedTypeData, Node, NullableTypeData};
use super::state::ParserState;
use refract_scanner::SyntaxKind;

impl ParserState {
    pub(crate) fn is_type_start(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::Identifier
                | SyntaxKind::QualifiedName
                | SyntaxKind::ArrayKeyword
                | SyntaxKind::CallableKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::QuestionToken
                | SyntaxKind::OpenParenToken
        )
    }

    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();

        if self.parse_optional(SyntaxKind::QuestionToken) {
            let inner = self.parse_named_type();
            return self.add_node(Node::NullableType(NullableTypeData { inner }), pos);
        }

        let first = self.parse_intersection_or_atom();
        if !self.is_token(SyntaxKind::BarToken) {
            return first;
        }

        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::BarToken) {
            types.push(self.parse_intersection_or_atom());
        }
        self.add_node(
            Node::UnionType(CompositeTypeData {
                types: NodeList::with_nodes(types),
            }),
            pos,
        )
    }

    /// A named type, an intersection, or a parenthesized intersection.
    fn parse_intersection_or_atom(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        if self.parse_optional(SyntaxKind::OpenParenToken) {
            let inner = self.parse_intersection_or_atom();
            self.parse_expected(SyntaxKind::CloseParenToken);
            return inner;
        }

        let first = self.parse_named_type();
        if !self.is_intersection_ampersand() {
            return first;
        }

        let mut types = vec![first];
        while self.is_intersection_ampersand() {
            self.next_token();
            types.push(self.parse_named_type());
        }
        self.add_node(
            Node::IntersectionType(CompositeTypeData {
                types: NodeList::with_nodes(types),
            }),
            pos,
        )
    }

    /// `&` continues an intersection unless it marks a by-reference
    /// parameter (`A &$x`, `A &...$xs`).
    fn is_intersection_ampersand(&mut self) -> bool {
        if !self.is_token(SyntaxKind::AmpersandToken) {
            return false;
        }
        !matches!(
            self.peek_token(),
            SyntaxKind::Variable | SyntaxKind::DotDotDotToken
        )
    }

    fn parse_named_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let is_type_name = matches!(
            self.token(),
            SyntaxKind::Identifier
                | SyntaxKind::QualifiedName
                | SyntaxKind::ArrayKeyword
                | SyntaxKind::CallableKeyword
                | SyntaxKind::StaticKeyword
        );
        if !is_type_name {
            let message = format!("Expected type, found {}", self.current_token_display());
            self.parse_error_at_current_token(&message);
            return self.missing_node();
        }
        let name = self.token_value().to_string();
        self.next_token();
        self.add_node(Node::NamedType(NamedTypeData { name }), pos)
    }
}
