//! Parser state - class member parsing.

use super::base::{NodeIndex, NodeList};
use super::node::{
    ClassConstData, EnumCaseData, Node, ParameterData, PropertyData, PropertyDeclaratorData,
    TraitUseData, modifier_flags,
};
use super::state::ParserState;
use refract_scanner::SyntaxKind;

impl ParserState {
    /// Parse class members up to (not including) the closing `}`.
    pub(crate) fn parse_class_members(&mut self) -> NodeList {
        let mut members = Vec::new();

        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }

            let mut doc_comment = self.token_doc_comment();
            if self.is_token(SyntaxKind::AttributeStart) {
                self.skip_attributes();
                doc_comment = doc_comment.or_else(|| self.token_doc_comment());
            }

            let member = match self.token() {
                SyntaxKind::UseKeyword => self.parse_trait_use(),
                SyntaxKind::CaseKeyword => self.parse_enum_case(doc_comment),
                _ => self.parse_modified_member(doc_comment),
            };
            if let Some(member) = member {
                members.push(member);
            }
        }

        NodeList::with_nodes(members)
    }

    /// Parse member modifiers (`public`, `static`, `abstract`, `final`,
    /// `readonly`, `var`). Asymmetric visibility (`private(set)`) is
    /// accepted and ignored.
    pub(crate) fn parse_member_modifiers(&mut self) -> u32 {
        let mut modifiers = modifier_flags::NONE;
        loop {
            let flag = match self.token() {
                SyntaxKind::PublicKeyword => modifier_flags::PUBLIC,
                SyntaxKind::ProtectedKeyword => modifier_flags::PROTECTED,
                SyntaxKind::PrivateKeyword => modifier_flags::PRIVATE,
                SyntaxKind::StaticKeyword => modifier_flags::STATIC,
                SyntaxKind::AbstractKeyword => modifier_flags::ABSTRACT,
                SyntaxKind::FinalKeyword => modifier_flags::FINAL,
                SyntaxKind::ReadonlyKeyword => modifier_flags::READONLY,
                SyntaxKind::VarKeyword => modifier_flags::VAR,
                _ => break,
            };
            if modifiers & flag != 0 {
                self.parse_error_at_current_token("Duplicate modifier");
            }
            modifiers |= flag;
            self.next_token();

            if flag & modifier_flags::VISIBILITY != 0
                && self.is_token(SyntaxKind::OpenParenToken)
                && self.look_ahead_is_set_visibility()
            {
                for _ in 0..3 {
                    self.next_token();
                }
            }
        }
        modifiers
    }

    /// `(set)` after a visibility keyword.
    fn look_ahead_is_set_visibility(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            let is_set = p.is_token(SyntaxKind::Identifier) && p.token_value().eq_ignore_ascii_case("set");
            p.next_token();
            is_set && p.is_token(SyntaxKind::CloseParenToken)
        })
    }

    fn parse_modified_member(&mut self, doc_comment: Option<String>) -> Option<NodeIndex> {
        let pos = self.token_pos();
        let modifiers = self.parse_member_modifiers();

        match self.token() {
            SyntaxKind::ConstKeyword => Some(self.parse_class_const(pos, modifiers, doc_comment)),
            SyntaxKind::FunctionKeyword => {
                // Methods start at the `function` keyword
                let function_pos = self.token_pos();
                let doc_comment = doc_comment.or_else(|| self.token_doc_comment());
                let data = self.parse_function_like(modifiers, doc_comment);
                Some(self.add_node(Node::Method(data), function_pos))
            }
            _ if modifiers != modifier_flags::NONE || self.is_token(SyntaxKind::Variable) => {
                Some(self.parse_property(pos, modifiers, doc_comment))
            }
            _ if self.is_type_start() => Some(self.parse_property(pos, modifiers, doc_comment)),
            _ => {
                let message = format!(
                    "Unexpected {} in class body",
                    self.current_token_display()
                );
                self.parse_error_at_current_token(&message);
                self.next_token();
                None
            }
        }
    }

    /// `[final] [visibility] const [type] A = 1, B = 2;`
    fn parse_class_const(
        &mut self,
        pos: u32,
        modifiers: u32,
        doc_comment: Option<String>,
    ) -> NodeIndex {
        self.next_token();
        let has_type = !self.look_ahead(|p| {
            p.is_identifier_or_keyword() && {
                p.next_token();
                p.is_token(SyntaxKind::EqualsToken)
            }
        });
        let type_node = if has_type {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        let declarators = self.parse_const_declarators();
        self.parse_expected(SyntaxKind::SemicolonToken);

        self.add_node(
            Node::ClassConst(ClassConstData {
                modifiers,
                type_node,
                declarators,
                doc_comment,
            }),
            pos,
        )
    }

    /// `[modifiers] [type] $a = 1, $b;` with optional property hooks.
    fn parse_property(&mut self, pos: u32, modifiers: u32, doc_comment: Option<String>) -> NodeIndex {
        let type_node = if self.is_token(SyntaxKind::Variable) {
            NodeIndex::NONE
        } else {
            self.parse_type()
        };

        let mut declarators = Vec::new();
        loop {
            let declarator_pos = self.token_pos();
            if !self.is_token(SyntaxKind::Variable) {
                self.parse_expected(SyntaxKind::Variable);
                break;
            }
            let name = self.token_value().to_string();
            self.next_token();
            let default = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_expression()
            } else {
                NodeIndex::NONE
            };
            declarators.push(self.add_node(
                Node::PropertyDeclarator(PropertyDeclaratorData { name, default }),
                declarator_pos,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.skip_braced_block();
        } else {
            self.parse_expected(SyntaxKind::SemicolonToken);
        }

        self.add_node(
            Node::Property(PropertyData {
                modifiers,
                type_node,
                declarators: NodeList::with_nodes(declarators),
                doc_comment,
            }),
            pos,
        )
    }

    /// `use A, B;` or `use A, B { ... }` (adaptations skipped).
    fn parse_trait_use(&mut self) -> Option<NodeIndex> {
        let pos = self.token_pos();
        self.next_token();
        let traits = self.parse_name_list();
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.skip_braced_block();
        } else {
            self.parse_expected(SyntaxKind::SemicolonToken);
        }
        Some(self.add_node(Node::TraitUse(TraitUseData { traits }), pos))
    }

    /// `case Hearts;` or `case Hearts = 'H';`
    fn parse_enum_case(&mut self, doc_comment: Option<String>) -> Option<NodeIndex> {
        let pos = self.token_pos();
        self.next_token();
        let name = self.parse_identifier_or_keyword()?;
        let value = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        Some(self.add_node(
            Node::EnumCase(EnumCaseData {
                name,
                value,
                doc_comment,
            }),
            pos,
        ))
    }

    /// Skip a balanced `{ ... }` block.
    pub(crate) fn skip_braced_block(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => {
                    self.parse_error_at_current_token("Unexpected end of file, expected '}'");
                    return;
                }
                SyntaxKind::OpenBraceToken => depth += 1,
                SyntaxKind::CloseBraceToken => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.next_token();
                        return;
                    }
                }
                _ => {}
            }
            self.next_token();
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// `( [param {, param}] [,] )`
    pub(crate) fn parse_parameter_list(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::new();
        }

        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            parameters.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == before {
                break;
            }
        }

        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::with_nodes(parameters)
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        let mut doc_comment = self.token_doc_comment();
        if self.is_token(SyntaxKind::AttributeStart) {
            self.skip_attributes();
            doc_comment = doc_comment.or_else(|| self.token_doc_comment());
        }
        let pos = self.token_pos();
        let modifiers = self.parse_member_modifiers();

        let type_node = if matches!(
            self.token(),
            SyntaxKind::Variable | SyntaxKind::AmpersandToken | SyntaxKind::DotDotDotToken
        ) {
            NodeIndex::NONE
        } else {
            self.parse_type()
        };
        let by_ref = self.parse_optional(SyntaxKind::AmpersandToken);
        let variadic = self.parse_optional(SyntaxKind::DotDotDotToken);

        let name = if self.is_token(SyntaxKind::Variable) {
            let name = self.token_value().to_string();
            self.next_token();
            name
        } else {
            self.parse_expected(SyntaxKind::Variable);
            String::new()
        };

        let default = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        };

        // Promoted properties may carry hooks
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.skip_braced_block();
        }

        self.add_node(
            Node::Parameter(ParameterData {
                name,
                modifiers,
                type_node,
                default,
                by_ref,
                variadic,
                doc_comment,
            }),
            pos,
        )
    }
}
