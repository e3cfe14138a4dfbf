//! Parser state: token cursor, diagnostics and recursion guard.

use super::base::NodeIndex;
use super::node::Node;
use super::node_arena::NodeArena;
use refract_common::LineMap;
use refract_common::limits::MAX_PARSER_DEPTH;
use refract_scanner::{ScannerSnapshot, ScannerState, SyntaxKind};
use serde::Serialize;

/// A syntax error found while parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub message: String,
    /// Byte offset of the offending token.
    pub start: u32,
    /// 1-based line of `start`.
    pub line: u32,
}

/// Recursive-descent PHP parser.
///
/// ```ignore
/// let mut parser = ParserState::new("a.php".to_string(), source);
/// let root = parser.parse_source_file();
/// let diagnostics = parser.get_diagnostics();
/// let arena = parser.into_arena();
/// ```
pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) current_token: SyntaxKind,
    /// End offset of the previously consumed token.
    pub(crate) last_token_end: u32,
    pub(crate) parse_diagnostics: Vec<ParseDiagnostic>,
    pub(crate) recursion_depth: u32,
    /// Set after `__halt_compiler();`.
    pub(crate) halted: bool,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> ParserState {
        let estimated_nodes = source_text.len() / 16;
        ParserState {
            scanner: ScannerState::new(source_text),
            arena: NodeArena::with_capacity(estimated_nodes),
            file_name,
            current_token: SyntaxKind::Unknown,
            last_token_end: 0,
            parse_diagnostics: Vec::new(),
            recursion_depth: 0,
            halted: false,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    /// Consume the parser, returning the arena and the source text.
    pub fn into_parts(self) -> (NodeArena, String) {
        (self.arena, self.scanner.into_text())
    }

    pub fn get_diagnostics(&self) -> &[ParseDiagnostic] {
        &self.parse_diagnostics
    }

    pub fn source_text(&self) -> &str {
        self.scanner.text()
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    pub(crate) fn token(&self) -> SyntaxKind {
        self.current_token
    }

    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    pub(crate) fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.scanner.token_end();
        self.current_token = self.scanner.scan();
        self.current_token
    }

    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    /// Consume the current token if it matches.
    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume the expected token or report it missing.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let message = format!(
            "Expected {}, found {}",
            token_display(kind),
            self.current_token_display()
        );
        self.parse_error_at_current_token(&message);
        false
    }

    /// Member names after `->`, `::`, `function` and `const` may be reserved
    /// words.
    pub(crate) fn is_identifier_or_keyword(&self) -> bool {
        self.is_token(SyntaxKind::Identifier) || self.current_token.is_keyword()
    }

    pub(crate) fn parse_identifier_or_keyword(&mut self) -> Option<String> {
        if self.is_identifier_or_keyword() {
            let name = if self.is_token(SyntaxKind::Identifier) {
                self.token_value().to_string()
            } else {
                self.scanner.token_text().to_string()
            };
            self.next_token();
            Some(name)
        } else {
            let message = format!("Expected identifier, found {}", self.current_token_display());
            self.parse_error_at_current_token(&message);
            None
        }
    }

    pub(crate) fn is_name_token(&self) -> bool {
        matches!(
            self.current_token,
            SyntaxKind::Identifier | SyntaxKind::QualifiedName
        )
    }

    /// Doc comment attached to the current token.
    pub(crate) fn token_doc_comment(&self) -> Option<String> {
        let (start, end) = self.scanner.token_doc_comment_range()?;
        self.scanner
            .text()
            .get(start as usize..end as usize)
            .map(str::to_string)
    }

    pub(crate) fn save_state(&self) -> (ScannerSnapshot, SyntaxKind, u32) {
        (
            self.scanner.save_state(),
            self.current_token,
            self.last_token_end,
        )
    }

    pub(crate) fn restore_state(&mut self, state: (ScannerSnapshot, SyntaxKind, u32)) {
        let (snapshot, token, last_end) = state;
        self.scanner.restore_state(snapshot);
        self.current_token = token;
        self.last_token_end = last_end;
    }

    /// Run `f` and rewind the cursor afterwards.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut ParserState) -> T) -> T {
        let saved = self.save_state();
        let diagnostics_len = self.parse_diagnostics.len();
        let result = f(self);
        self.restore_state(saved);
        self.parse_diagnostics.truncate(diagnostics_len);
        result
    }

    /// Kind of the token after the current one.
    pub(crate) fn peek_token(&mut self) -> SyntaxKind {
        self.look_ahead(|p| p.next_token())
    }

    // =========================================================================
    // Diagnostics and recursion
    // =========================================================================

    pub(crate) fn parse_error_at_current_token(&mut self, message: &str) {
        let start = self.token_pos();
        // One diagnostic per position keeps recovery loops from flooding
        if self
            .parse_diagnostics
            .last()
            .is_some_and(|last| last.start == start)
        {
            return;
        }
        self.parse_diagnostics.push(ParseDiagnostic {
            message: message.to_string(),
            start,
            line: 0,
        });
    }

    pub(crate) fn current_token_display(&self) -> String {
        match self.current_token {
            SyntaxKind::EndOfFileToken => "end of file".to_string(),
            _ => format!("'{}'", self.scanner.token_text()),
        }
    }

    /// Enter a recursive production. Returns false (after reporting) when
    /// the nesting limit is exceeded.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_DEPTH {
            self.parse_error_at_current_token("Maximum nesting depth exceeded");
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    pub(crate) fn add_node(&mut self, node: Node, pos: u32) -> NodeIndex {
        let end = self.last_token_end.max(pos);
        self.arena.add(node, pos, end)
    }

    pub(crate) fn missing_node(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.arena.add(Node::Missing, pos, pos)
    }

    /// Merge scanner diagnostics and assign line numbers.
    pub(crate) fn finish_diagnostics(&mut self) {
        for diag in self.scanner.take_diagnostics() {
            self.parse_diagnostics.push(ParseDiagnostic {
                message: diag.message,
                start: diag.pos,
                line: 0,
            });
        }
        self.parse_diagnostics.sort_by_key(|d| d.start);
        self.parse_diagnostics.dedup_by_key(|d| d.start);

        if self.parse_diagnostics.is_empty() {
            return;
        }
        let line_map = LineMap::build(self.scanner.text());
        for diag in &mut self.parse_diagnostics {
            diag.line = line_map.line_of(diag.start);
        }
    }
}

/// Human-readable token description for "expected" diagnostics.
pub(crate) fn token_display(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::OpenBraceToken => "'{'",
        SyntaxKind::CloseBraceToken => "'}'",
        SyntaxKind::OpenParenToken => "'('",
        SyntaxKind::CloseParenToken => "')'",
        SyntaxKind::OpenBracketToken => "'['",
        SyntaxKind::CloseBracketToken => "']'",
        SyntaxKind::SemicolonToken => "';'",
        SyntaxKind::CommaToken => "','",
        SyntaxKind::ColonToken => "':'",
        SyntaxKind::EqualsToken => "'='",
        SyntaxKind::FatArrowToken => "'=>'",
        SyntaxKind::Variable => "variable",
        SyntaxKind::Identifier => "identifier",
        _ => "token",
    }
}
