//! Parser state - statement and declaration parsing methods.
//!
//! Only declarations are parsed structurally. Any other statement is
//! skipped token-wise into an [`Node::Opaque`] node, and function bodies are
//! skipped while recording `static` variables and `yield`.

use super::base::{NodeIndex, NodeList};
use super::node::{
    ClassLikeData, ClassLikeKind, ConstDeclaratorData, ConstStatementData, ExpressionStatementData,
    FunctionData, NamespaceData, Node, OpaqueData, SourceFileData, StaticVar, UseData, UseItem,
    UseKind, modifier_flags,
};
use super::state::ParserState;
use refract_common::names::strip_leading_separator;
use refract_scanner::SyntaxKind;
use tracing::debug;

impl ParserState {
    // =========================================================================
    // Source file and namespaces
    // =========================================================================

    /// Parse a source file
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();

        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) && !self.halted {
            if self.is_token(SyntaxKind::NamespaceKeyword) {
                statements.push(self.parse_namespace_declaration());
                continue;
            }
            if self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_error_at_current_token("Unexpected '}'");
                self.next_token();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }

        self.finish_diagnostics();
        let end = self.source_text().len() as u32;
        debug!(
            file = %self.file_name,
            nodes = self.arena.len(),
            diagnostics = self.parse_diagnostics.len(),
            "parsed source file"
        );
        self.arena.add(
            Node::SourceFile(SourceFileData {
                file_name: self.file_name.clone(),
                statements: NodeList::with_nodes(statements),
            }),
            0,
            end,
        )
    }

    /// `namespace Foo;` or `namespace Foo { ... }`
    fn parse_namespace_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let doc_comment = self.token_doc_comment();
        self.next_token();

        let name = if self.is_name_token() {
            let name = strip_leading_separator(self.token_value()).to_string();
            self.next_token();
            name
        } else {
            String::new()
        };

        let mut statements = Vec::new();
        let braced = self.parse_optional(SyntaxKind::OpenBraceToken);
        if braced {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
                && !self.halted
            {
                if let Some(statement) = self.parse_statement() {
                    statements.push(statement);
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        } else {
            if name.is_empty() {
                self.parse_error_at_current_token("Expected namespace name");
            }
            self.parse_expected(SyntaxKind::SemicolonToken);
            while !self.is_token(SyntaxKind::NamespaceKeyword)
                && !self.is_token(SyntaxKind::EndOfFileToken)
                && !self.halted
            {
                if self.is_token(SyntaxKind::CloseBraceToken) {
                    self.parse_error_at_current_token("Unexpected '}'");
                    self.next_token();
                    continue;
                }
                if let Some(statement) = self.parse_statement() {
                    statements.push(statement);
                }
            }
        }

        self.add_node(
            Node::Namespace(NamespaceData {
                name,
                braced,
                statements: NodeList::with_nodes(statements),
                doc_comment,
            }),
            pos,
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse one statement inside a namespace. Returns `None` for empty
    /// statements and `__halt_compiler()`.
    pub(crate) fn parse_statement(&mut self) -> Option<NodeIndex> {
        let doc_comment = self.token_doc_comment();
        let start_pos = self.token_pos();

        if self.is_token(SyntaxKind::AttributeStart) {
            self.skip_attributes();
            let doc_comment = doc_comment.or_else(|| self.token_doc_comment());
            return self.parse_declaration_or_statement(doc_comment, start_pos);
        }
        self.parse_declaration_or_statement(doc_comment, start_pos)
    }

    fn parse_declaration_or_statement(
        &mut self,
        doc_comment: Option<String>,
        start_pos: u32,
    ) -> Option<NodeIndex> {
        match self.token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                None
            }
            SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => None,
            SyntaxKind::UseKeyword => Some(self.parse_use_statement()),
            SyntaxKind::ConstKeyword => Some(self.parse_const_statement(doc_comment)),
            SyntaxKind::FunctionKeyword if self.look_ahead_is_function_declaration() => {
                Some(self.parse_function_declaration(doc_comment))
            }
            SyntaxKind::AbstractKeyword
            | SyntaxKind::FinalKeyword
            | SyntaxKind::ReadonlyKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::InterfaceKeyword
            | SyntaxKind::TraitKeyword
            | SyntaxKind::EnumKeyword
                if self.look_ahead_is_class_declaration() =>
            {
                Some(self.parse_class_declaration(doc_comment))
            }
            SyntaxKind::NamespaceKeyword => {
                self.parse_error_at_current_token("Namespace declarations cannot be nested");
                Some(self.parse_opaque_statement(start_pos))
            }
            SyntaxKind::Identifier
                if self.token_value().eq_ignore_ascii_case("__halt_compiler") =>
            {
                self.halted = true;
                None
            }
            SyntaxKind::Identifier | SyntaxKind::QualifiedName if self.look_ahead_is_define_call() => {
                Some(self.parse_expression_statement())
            }
            _ => Some(self.parse_opaque_statement(start_pos)),
        }
    }

    /// Skip one or more `#[...]` attribute groups.
    pub(crate) fn skip_attributes(&mut self) {
        while self.is_token(SyntaxKind::AttributeStart) {
            let mut depth = 1u32;
            self.next_token();
            while depth > 0 && !self.is_token(SyntaxKind::EndOfFileToken) {
                match self.token() {
                    SyntaxKind::OpenBracketToken | SyntaxKind::AttributeStart => depth += 1,
                    SyntaxKind::CloseBracketToken => depth -= 1,
                    _ => {}
                }
                self.next_token();
            }
        }
    }

    /// Skip a statement the reflection layer does not inspect.
    ///
    /// Ends at a `;` outside brackets, or after a `{...}` block opened at
    /// statement level. A `}` that closes an enclosing block is left alone.
    fn parse_opaque_statement(&mut self, pos: u32) -> NodeIndex {
        let first_token = self.token();
        let mut depth = 0u32;

        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::SemicolonToken if depth == 0 => {
                    self.next_token();
                    break;
                }
                SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::AttributeStart
                | SyntaxKind::OpenBraceToken => {
                    depth += 1;
                    self.next_token();
                }
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken => {
                    depth = depth.saturating_sub(1);
                    self.next_token();
                }
                SyntaxKind::CloseBraceToken => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.next_token();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.next_token();
                }
            }
        }

        self.add_node(Node::Opaque(OpaqueData { first_token }), pos)
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = self.parse_expression();
        if !self.is_token(SyntaxKind::EndOfFileToken) {
            self.parse_expected(SyntaxKind::SemicolonToken);
        }
        self.add_node(
            Node::ExpressionStatement(ExpressionStatementData { expression }),
            pos,
        )
    }

    fn look_ahead_is_define_call(&mut self) -> bool {
        let name = strip_leading_separator(self.token_value());
        if !name.eq_ignore_ascii_case("define") {
            return false;
        }
        self.peek_token() == SyntaxKind::OpenParenToken
    }

    fn look_ahead_is_function_declaration(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::AmpersandToken) {
                p.next_token();
            }
            p.is_identifier_or_keyword()
        })
    }

    /// `[abstract|final|readonly]* (class|interface|trait|enum) Name`
    fn look_ahead_is_class_declaration(&mut self) -> bool {
        self.look_ahead(|p| {
            while matches!(
                p.token(),
                SyntaxKind::AbstractKeyword | SyntaxKind::FinalKeyword | SyntaxKind::ReadonlyKeyword
            ) {
                p.next_token();
            }
            let is_class_keyword = matches!(
                p.token(),
                SyntaxKind::ClassKeyword
                    | SyntaxKind::InterfaceKeyword
                    | SyntaxKind::TraitKeyword
                    | SyntaxKind::EnumKeyword
            );
            if !is_class_keyword {
                return false;
            }
            p.next_token();
            p.is_identifier_or_keyword()
        })
    }

    // =========================================================================
    // use / const / function
    // =========================================================================

    /// `use A\B as C, D;`, `use function f;`, `use const X;`, and group use
    /// `use A\{B, function c, const D as E};`.
    fn parse_use_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        let statement_kind = self.parse_use_kind().unwrap_or(UseKind::Class);
        let mut items = Vec::new();

        loop {
            if !self.is_name_token() {
                let message = format!("Expected name, found {}", self.current_token_display());
                self.parse_error_at_current_token(&message);
                break;
            }
            let name = strip_leading_separator(self.token_value()).to_string();
            self.next_token();

            if name.ends_with('\\') && self.is_token(SyntaxKind::OpenBraceToken) {
                let prefix = name.trim_end_matches('\\').to_string();
                self.next_token();
                while !self.is_token(SyntaxKind::CloseBraceToken)
                    && !self.is_token(SyntaxKind::EndOfFileToken)
                {
                    let kind = self.parse_use_kind().unwrap_or(statement_kind);
                    if !self.is_name_token() {
                        self.parse_error_at_current_token("Expected name in group use");
                        break;
                    }
                    let suffix = self.token_value().to_string();
                    self.next_token();
                    let alias = self.parse_use_alias();
                    items.push(UseItem {
                        kind,
                        name: format!("{prefix}\\{suffix}"),
                        alias,
                    });
                    if !self.parse_optional(SyntaxKind::CommaToken) {
                        break;
                    }
                }
                self.parse_expected(SyntaxKind::CloseBraceToken);
            } else {
                let alias = self.parse_use_alias();
                items.push(UseItem {
                    kind: statement_kind,
                    name,
                    alias,
                });
            }

            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        self.parse_expected(SyntaxKind::SemicolonToken);
        self.add_node(Node::Use(UseData { items }), pos)
    }

    fn parse_use_kind(&mut self) -> Option<UseKind> {
        let kind = match self.token() {
            SyntaxKind::FunctionKeyword => UseKind::Function,
            SyntaxKind::ConstKeyword => UseKind::Constant,
            _ => return None,
        };
        self.next_token();
        Some(kind)
    }

    fn parse_use_alias(&mut self) -> Option<String> {
        if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_identifier_or_keyword()
        } else {
            None
        }
    }

    /// `const A = 1, B = A + 1;`
    fn parse_const_statement(&mut self, doc_comment: Option<String>) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let declarators = self.parse_const_declarators();
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.add_node(
            Node::ConstStatement(ConstStatementData {
                declarators,
                doc_comment,
            }),
            pos,
        )
    }

    /// `NAME = expr {, NAME = expr}`
    pub(crate) fn parse_const_declarators(&mut self) -> NodeList {
        let mut declarators = Vec::new();
        loop {
            let pos = self.token_pos();
            let Some(name) = self.parse_identifier_or_keyword() else {
                break;
            };
            let value = if self.parse_expected(SyntaxKind::EqualsToken) {
                self.parse_expression()
            } else {
                self.missing_node()
            };
            declarators.push(self.add_node(
                Node::ConstDeclarator(ConstDeclaratorData { name, value }),
                pos,
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        NodeList::with_nodes(declarators)
    }

    fn parse_function_declaration(&mut self, doc_comment: Option<String>) -> NodeIndex {
        let pos = self.token_pos();
        let data = self.parse_function_like(modifier_flags::NONE, doc_comment);
        self.add_node(Node::Function(data), pos)
    }

    /// Parse from the `function` keyword through the body (or `;`).
    pub(crate) fn parse_function_like(
        &mut self,
        modifiers: u32,
        doc_comment: Option<String>,
    ) -> FunctionData {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let returns_ref = self.parse_optional(SyntaxKind::AmpersandToken);
        let name = self.parse_identifier_or_keyword().unwrap_or_default();
        let parameters = self.parse_parameter_list();
        let return_type = if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };

        let (has_body, static_vars, is_generator) = if self.is_token(SyntaxKind::OpenBraceToken)
        {
            let (static_vars, is_generator) = self.skip_function_body();
            (true, static_vars, is_generator)
        } else {
            self.parse_expected(SyntaxKind::SemicolonToken);
            (false, Vec::new(), false)
        };

        FunctionData {
            name,
            modifiers,
            parameters,
            return_type,
            returns_ref,
            has_body,
            static_vars,
            is_generator,
            doc_comment,
        }
    }

    /// Skip a `{...}` function body, recording `static $x = expr;`
    /// declarations and `yield` that belong to this function (not to nested
    /// closures or anonymous classes).
    pub(crate) fn skip_function_body(&mut self) -> (Vec<StaticVar>, bool) {
        let mut static_vars = Vec::new();
        let mut is_generator = false;
        let mut depth = 0u32;
        // Brace depths at which nested function/class bodies start
        let mut nested: Vec<u32> = Vec::new();
        let mut pending_nested = false;
        let mut previous = SyntaxKind::Unknown;

        loop {
            let current = self.token();
            match current {
                SyntaxKind::EndOfFileToken => {
                    self.parse_error_at_current_token("Unexpected end of file, expected '}'");
                    break;
                }
                SyntaxKind::OpenBraceToken => {
                    depth += 1;
                    if pending_nested {
                        nested.push(depth);
                        pending_nested = false;
                    }
                    self.next_token();
                }
                SyntaxKind::CloseBraceToken => {
                    if nested.last() == Some(&depth) {
                        nested.pop();
                    }
                    depth = depth.saturating_sub(1);
                    self.next_token();
                    if depth == 0 {
                        break;
                    }
                }
                SyntaxKind::FunctionKeyword | SyntaxKind::ClassKeyword
                    if !matches!(
                        previous,
                        SyntaxKind::ColonColonToken
                            | SyntaxKind::ArrowToken
                            | SyntaxKind::QuestionArrowToken
                    ) =>
                {
                    pending_nested = true;
                    self.next_token();
                }
                SyntaxKind::StaticKeyword
                    if nested.is_empty()
                        && depth > 0
                        && self.peek_token() == SyntaxKind::Variable =>
                {
                    self.next_token();
                    self.parse_static_variables(&mut static_vars);
                    previous = SyntaxKind::SemicolonToken;
                    continue;
                }
                SyntaxKind::YieldKeyword => {
                    if nested.is_empty() && !pending_nested {
                        is_generator = true;
                    }
                    self.next_token();
                }
                _ => {
                    self.next_token();
                }
            }
            previous = current;
        }

        (static_vars, is_generator)
    }

    /// `$a = 1, $b;` after `static`.
    fn parse_static_variables(&mut self, out: &mut Vec<StaticVar>) {
        while self.is_token(SyntaxKind::Variable) {
            let name = self.token_value().to_string();
            self.next_token();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_expression()
            } else {
                NodeIndex::NONE
            };
            out.push(StaticVar { name, initializer });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_optional(SyntaxKind::SemicolonToken);
    }

    // =========================================================================
    // Class-like declarations
    // =========================================================================

    fn parse_class_declaration(&mut self, doc_comment: Option<String>) -> NodeIndex {
        let mut modifiers = modifier_flags::NONE;
        loop {
            let flag = match self.token() {
                SyntaxKind::AbstractKeyword => modifier_flags::ABSTRACT,
                SyntaxKind::FinalKeyword => modifier_flags::FINAL,
                SyntaxKind::ReadonlyKeyword => modifier_flags::READONLY,
                _ => break,
            };
            modifiers |= flag;
            self.next_token();
        }
        // Positions start at the class keyword so start lines match the
        // native reflection API
        let pos = self.token_pos();
        let doc_comment = doc_comment.or_else(|| self.token_doc_comment());
        let kind = match self.token() {
            SyntaxKind::InterfaceKeyword => ClassLikeKind::Interface,
            SyntaxKind::TraitKeyword => ClassLikeKind::Trait,
            SyntaxKind::EnumKeyword => ClassLikeKind::Enum,
            _ => ClassLikeKind::Class,
        };
        self.next_token();
        let name = self.parse_identifier_or_keyword().unwrap_or_default();
        let data = self.parse_class_like_tail(kind, name, modifiers, doc_comment);
        self.add_node(Node::ClassLike(data), pos)
    }

    /// Everything after the class name: backing type, `extends`,
    /// `implements` and the member list.
    pub(crate) fn parse_class_like_tail(
        &mut self,
        kind: ClassLikeKind,
        name: String,
        modifiers: u32,
        doc_comment: Option<String>,
    ) -> ClassLikeData {
        let backing_type = if kind == ClassLikeKind::Enum
            && self.parse_optional(SyntaxKind::ColonToken)
        {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };

        let extends = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_name_list()
        } else {
            Vec::new()
        };
        if kind == ClassLikeKind::Class && extends.len() > 1 {
            self.parse_error_at_current_token("A class can only extend one class");
        }
        let implements = if self.parse_optional(SyntaxKind::ImplementsKeyword) {
            self.parse_name_list()
        } else {
            Vec::new()
        };

        self.parse_expected(SyntaxKind::OpenBraceToken);
        let members = self.parse_class_members();
        self.parse_expected(SyntaxKind::CloseBraceToken);

        ClassLikeData {
            kind,
            name,
            modifiers,
            extends,
            implements,
            backing_type,
            members,
            doc_comment,
        }
    }

    /// Comma-separated class names as written.
    pub(crate) fn parse_name_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        loop {
            if self.is_name_token() || self.is_token(SyntaxKind::EnumKeyword) {
                names.push(self.token_value().to_string());
                self.next_token();
            } else {
                let message = format!("Expected class name, found {}", self.current_token_display());
                self.parse_error_at_current_token(&message);
                break;
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        names
    }
}
