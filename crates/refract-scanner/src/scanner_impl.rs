//! PHP scanner.
//!
//! A hand-written, on-demand tokenizer. The parser pulls one token at a time
//! with [`ScannerState::scan`] and uses [`ScannerState::save_state`] /
//! [`ScannerState::restore_state`] for lookahead.

use crate::syntax_kind::{SyntaxKind, keyword_kind};
use memchr::memmem;
use serde::Serialize;

/// Token flag bits.
pub mod token_flags {
    pub const NONE: u32 = 0;
    /// String literal or comment ran to end of file.
    pub const UNTERMINATED: u32 = 1 << 0;
    /// Heredoc (including nowdoc) string.
    pub const HEREDOC: u32 = 1 << 1;
    /// Integer literal too large for i64.
    pub const OVERFLOW: u32 = 1 << 2;
}

/// A problem found while scanning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanDiagnostic {
    pub message: String,
    pub pos: u32,
}

/// Snapshot of the scanner used for lookahead.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    in_php: bool,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    token_bytes: Vec<u8>,
    token_flags: u32,
    token_doc_comment: Option<(u32, u32)>,
    pending_doc_comment: Option<(u32, u32)>,
    diagnostics_len: usize,
}

/// How inline HTML ended.
enum OpenTag {
    None,
    Php,
    Echo(usize),
}

pub struct ScannerState {
    text: String,
    pos: usize,
    in_php: bool,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    token_bytes: Vec<u8>,
    token_flags: u32,
    token_doc_comment: Option<(u32, u32)>,
    pending_doc_comment: Option<(u32, u32)>,
    diagnostics: Vec<ScanDiagnostic>,
}

impl ScannerState {
    /// Create a scanner over a whole PHP file. Text before the first
    /// `<?php` tag is inline HTML and produces no tokens.
    pub fn new(text: String) -> ScannerState {
        ScannerState {
            text,
            pos: 0,
            in_php: false,
            token: SyntaxKind::Unknown,
            token_start: 0,
            token_value: String::new(),
            token_bytes: Vec::new(),
            token_flags: token_flags::NONE,
            token_doc_comment: None,
            pending_doc_comment: None,
            diagnostics: Vec::new(),
        }
    }

    /// Create a scanner that starts directly in PHP mode (no open tag).
    pub fn new_in_php(text: String) -> ScannerState {
        let mut scanner = ScannerState::new(text);
        scanner.in_php = true;
        scanner
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Decoded token value: identifier text, variable name without `$`,
    /// decoded string contents, canonical cast type, numeric text without
    /// `_` separators.
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Bytes of a string literal after escape decoding. `token_value` holds
    /// the same contents, lossily converted to UTF-8.
    pub fn token_bytes(&self) -> &[u8] {
        &self.token_bytes
    }

    /// Raw source text of the current token.
    pub fn token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    pub fn token_flags(&self) -> u32 {
        self.token_flags
    }

    /// Byte range of the doc comment directly preceding the current token.
    pub fn token_doc_comment_range(&self) -> Option<(u32, u32)> {
        self.token_doc_comment
    }

    pub fn diagnostics(&self) -> &[ScanDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScanDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            in_php: self.in_php,
            token: self.token,
            token_start: self.token_start,
            token_value: self.token_value.clone(),
            token_bytes: self.token_bytes.clone(),
            token_flags: self.token_flags,
            token_doc_comment: self.token_doc_comment,
            pending_doc_comment: self.pending_doc_comment,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.in_php = snapshot.in_php;
        self.token = snapshot.token;
        self.token_start = snapshot.token_start;
        self.token_value = snapshot.token_value;
        self.token_bytes = snapshot.token_bytes;
        self.token_flags = snapshot.token_flags;
        self.token_doc_comment = snapshot.token_doc_comment;
        self.pending_doc_comment = snapshot.pending_doc_comment;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Scan the next token, skipping trivia.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value.clear();
        self.token_bytes.clear();
        self.token_flags = token_flags::NONE;

        loop {
            if !self.in_php {
                match self.skip_inline_html() {
                    OpenTag::None => {
                        self.token_start = self.pos;
                        self.token_doc_comment = None;
                        return self.finish(SyntaxKind::EndOfFileToken);
                    }
                    OpenTag::Php => {
                        self.in_php = true;
                    }
                    OpenTag::Echo(start) => {
                        // `<?=` behaves like `echo`
                        self.in_php = true;
                        self.token_start = start;
                        self.token_doc_comment = None;
                        self.token_value.push_str("echo");
                        return self.finish(SyntaxKind::EchoKeyword);
                    }
                }
            }

            let Some(&ch) = self.bytes().get(self.pos) else {
                self.token_start = self.pos;
                self.token_doc_comment = None;
                return self.finish(SyntaxKind::EndOfFileToken);
            };

            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => {
                    self.pos += 1;
                }
                b'#' if self.peek_at(1) == Some(b'[') => break,
                b'#' => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
                b'?' if self.peek_at(1) == Some(b'>') => {
                    // A closing tag acts as a statement terminator
                    self.token_start = self.pos;
                    self.pos += 2;
                    if self.peek_at(0) == Some(b'\n') {
                        self.pos += 1;
                    } else if self.peek_at(0) == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
                        self.pos += 2;
                    }
                    self.in_php = false;
                    self.token_doc_comment = None;
                    return self.finish(SyntaxKind::SemicolonToken);
                }
                _ => break,
            }
        }

        self.token_start = self.pos;
        self.token_doc_comment = self.pending_doc_comment.take();
        let kind = self.scan_token();
        self.finish(kind)
    }

    fn finish(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.token = kind;
        kind
    }

    fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn error(&mut self, message: impl Into<String>, pos: usize) {
        self.diagnostics.push(ScanDiagnostic {
            message: message.into(),
            pos: pos as u32,
        });
    }

    /// Skip text outside PHP tags up to and including the next open tag.
    fn skip_inline_html(&mut self) -> OpenTag {
        let finder = memmem::Finder::new(b"<?");
        loop {
            let Some(offset) = finder.find(&self.bytes()[self.pos..]) else {
                self.pos = self.text.len();
                return OpenTag::None;
            };
            let tag_start = self.pos + offset;
            let after = tag_start + 2;
            let bytes = self.bytes();
            if bytes.get(after) == Some(&b'=') {
                self.pos = after + 1;
                return OpenTag::Echo(tag_start);
            }
            if bytes.len() >= after + 3 && bytes[after..after + 3].eq_ignore_ascii_case(b"php") {
                let next = bytes.get(after + 3).copied();
                if next.is_none() || next.is_some_and(|b| b.is_ascii_whitespace()) {
                    self.pos = (after + 4).min(self.text.len());
                    return OpenTag::Php;
                }
            }
            self.pos = after;
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek_at(0) {
            if b == b'\n' || b == b'\r' {
                break;
            }
            if b == b'?' && self.peek_at(1) == Some(b'>') {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        let is_doc = self.peek_at(2) == Some(b'*')
            && self
                .peek_at(3)
                .is_some_and(|b| b.is_ascii_whitespace());
        match memmem::find(&self.bytes()[start + 2..], b"*/") {
            Some(offset) => {
                self.pos = start + 2 + offset + 2;
            }
            None => {
                self.pos = self.text.len();
                self.error("Unterminated comment", start);
            }
        }
        if is_doc {
            self.pending_doc_comment = Some((start as u32, self.pos as u32));
        }
    }

    fn scan_token(&mut self) -> SyntaxKind {
        let start = self.pos;
        let ch = self.bytes()[start];

        match ch {
            b'$' => {
                if self.peek_at(1).is_some_and(is_identifier_start) {
                    self.pos += 1;
                    let name_start = self.pos;
                    self.consume_identifier_chars();
                    self.token_value = self.text[name_start..self.pos].to_string();
                    SyntaxKind::Variable
                } else {
                    self.pos += 1;
                    SyntaxKind::DollarToken
                }
            }
            b'\\' if self.peek_at(1).is_some_and(is_identifier_start) => self.scan_name(),
            b if is_identifier_start(b) => self.scan_name(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.scan_number(),
            b'\'' => self.scan_single_quoted(),
            b'"' => self.scan_double_quoted(),
            b'`' => self.scan_backtick(),
            b'#' => {
                self.pos += 2;
                SyntaxKind::AttributeStart
            }
            b'<' if self.text[start..].starts_with("<<<") => {
                if let Some(kind) = self.try_scan_heredoc() {
                    kind
                } else {
                    self.pos += 2;
                    self.scan_operator_tail(SyntaxKind::LessThanLessThanToken)
                }
            }
            b'(' => {
                if let Some(cast) = self.try_scan_cast() {
                    cast
                } else {
                    self.pos += 1;
                    SyntaxKind::OpenParenToken
                }
            }
            _ => self.scan_punctuation(),
        }
    }

    fn consume_identifier_chars(&mut self) {
        while self.peek_at(0).is_some_and(is_identifier_part) {
            self.pos += 1;
        }
    }

    /// Scan an identifier, keyword or namespaced name.
    fn scan_name(&mut self) -> SyntaxKind {
        let start = self.pos;
        let mut qualified = self.peek_at(0) == Some(b'\\');
        if qualified {
            self.pos += 1;
        }
        self.consume_identifier_chars();
        while self.peek_at(0) == Some(b'\\') && self.peek_at(1).is_some_and(is_identifier_start) {
            self.pos += 1;
            self.consume_identifier_chars();
            qualified = true;
        }
        // Group use prefix: `use Foo\{Bar, Baz};`
        if self.peek_at(0) == Some(b'\\') && self.peek_at(1) == Some(b'{') {
            self.pos += 1;
            qualified = true;
        }

        self.token_value = self.text[start..self.pos].to_string();
        if qualified {
            return SyntaxKind::QualifiedName;
        }
        keyword_kind(&self.token_value).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let bytes = self.bytes();
        let mut kind = SyntaxKind::IntegerLiteral;

        let radix_prefix = if bytes[start] == b'0' {
            match bytes.get(start + 1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                Some(b'o' | b'O') => Some(8),
                _ => None,
            }
        } else {
            None
        };

        if let Some(radix) = radix_prefix {
            self.pos += 2;
            while self
                .peek_at(0)
                .is_some_and(|b| b == b'_' || (b as char).is_digit(radix))
            {
                self.pos += 1;
            }
        } else {
            self.consume_decimal_digits();
            if self.peek_at(0) == Some(b'.') && self.peek_at(1) != Some(b'.') {
                kind = SyntaxKind::FloatLiteral;
                self.pos += 1;
                self.consume_decimal_digits();
            }
            if matches!(self.peek_at(0), Some(b'e' | b'E')) {
                let exponent_digits_at = if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                    2
                } else {
                    1
                };
                if self.peek_at(exponent_digits_at).is_some_and(|b| b.is_ascii_digit()) {
                    kind = SyntaxKind::FloatLiteral;
                    self.pos += exponent_digits_at;
                    self.consume_decimal_digits();
                }
            }
        }

        self.token_value = self.text[start..self.pos].replace('_', "");
        if kind == SyntaxKind::IntegerLiteral
            && matches!(
                crate::numeric::parse_integer_literal(&self.token_value),
                crate::numeric::NumericLiteral::Float(_)
            )
        {
            self.token_flags |= token_flags::OVERFLOW;
        }
        kind
    }

    fn consume_decimal_digits(&mut self) {
        while self
            .peek_at(0)
            .is_some_and(|b| b.is_ascii_digit() || b == b'_')
        {
            self.pos += 1;
        }
    }

    fn scan_single_quoted(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(b) = self.peek_at(0) else {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error("Unterminated string literal", start);
                break;
            };
            match b {
                b'\'' => {
                    self.pos += 1;
                    break;
                }
                b'\\' if matches!(self.peek_at(1), Some(b'\'' | b'\\')) => {
                    value.push(self.bytes()[self.pos + 1] as char);
                    self.pos += 2;
                }
                _ => {
                    let ch = self.text[self.pos..].chars().next().unwrap_or('\0');
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.set_string_literal(value.into_bytes());
        SyntaxKind::StringLiteral
    }

    fn set_string_literal(&mut self, bytes: Vec<u8>) {
        self.token_value = String::from_utf8_lossy(&bytes).into_owned();
        self.token_bytes = bytes;
    }

    fn scan_double_quoted(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let body_start = self.pos;
        let mut interpolated = false;
        loop {
            let Some(b) = self.peek_at(0) else {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error("Unterminated string literal", start);
                break;
            };
            match b {
                b'"' => break,
                b'\\' => self.pos += 2,
                b'$' if self
                    .peek_at(1)
                    .is_some_and(|n| is_identifier_start(n) || n == b'{') =>
                {
                    interpolated = true;
                    self.pos += 1;
                }
                b'{' if self.peek_at(1) == Some(b'$') => {
                    interpolated = true;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        let body_end = self.pos.min(self.text.len());
        if self.peek_at(0) == Some(b'"') {
            self.pos += 1;
        } else {
            self.pos = self.text.len();
        }

        let raw = &self.text[body_start..body_end];
        if interpolated {
            self.token_value = raw.to_string();
            SyntaxKind::InterpolatedString
        } else {
            let decoded = decode_escapes(raw, Some(b'"'));
            self.set_string_literal(decoded);
            SyntaxKind::StringLiteral
        }
    }

    fn scan_backtick(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                None => {
                    self.token_flags |= token_flags::UNTERMINATED;
                    self.error("Unterminated shell command", start);
                    break;
                }
                Some(b'\\') => self.pos += 2,
                Some(b'`') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.text.len());
        self.token_value = self.text[start..self.pos].to_string();
        SyntaxKind::InterpolatedString
    }

    /// Scan `<<<ID`, `<<<"ID"` or `<<<'ID'` with flexible closing marker
    /// indentation (PHP 7.3+).
    fn try_scan_heredoc(&mut self) -> Option<SyntaxKind> {
        let start = self.pos;
        let bytes = self.bytes();
        let mut i = start + 3;
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let quote = match bytes.get(i) {
            Some(&q @ (b'\'' | b'"')) => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        let label_start = i;
        if !bytes.get(i).copied().is_some_and(is_identifier_start) {
            return None;
        }
        while bytes.get(i).copied().is_some_and(is_identifier_part) {
            i += 1;
        }
        let label = self.text[label_start..i].to_string();
        if let Some(q) = quote {
            if bytes.get(i) != Some(&q) {
                return None;
            }
            i += 1;
        }
        match bytes.get(i) {
            Some(b'\n') => i += 1,
            Some(b'\r') if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            Some(b'\r') => i += 1,
            _ => return None,
        }

        let body_start = i;
        let mut line_start = body_start;
        let mut lines: Vec<&str> = Vec::new();
        let closing = loop {
            if line_start > bytes.len() {
                break None;
            }
            let line_end = memchr::memchr(b'\n', &bytes[line_start..])
                .map(|o| line_start + o)
                .unwrap_or(bytes.len());
            let line = &self.text[line_start..line_end];
            let trimmed = line.trim_start_matches([' ', '\t']);
            if let Some(rest) = trimmed.strip_prefix(label.as_str())
                && !rest.bytes().next().is_some_and(is_identifier_part)
            {
                let indent = line.len() - trimmed.len();
                break Some((line_start, indent, line_start + indent + label.len()));
            }
            lines.push(line.strip_suffix('\r').unwrap_or(line));
            if line_end >= bytes.len() {
                break None;
            }
            line_start = line_end + 1;
        };

        let Some((_closing_line, indent, end)) = closing else {
            self.pos = self.text.len();
            self.token_flags |= token_flags::UNTERMINATED | token_flags::HEREDOC;
            self.error("Unterminated heredoc", start);
            self.token_value.clear();
            return Some(SyntaxKind::StringLiteral);
        };

        let body = lines
            .iter()
            .map(|line| {
                let strip = line
                    .bytes()
                    .take(indent)
                    .take_while(|b| *b == b' ' || *b == b'\t')
                    .count();
                &line[strip..]
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.pos = end;
        self.token_flags |= token_flags::HEREDOC;

        if quote == Some(b'\'') {
            self.set_string_literal(body.into_bytes());
            return Some(SyntaxKind::StringLiteral);
        }
        if has_interpolation(&body) {
            self.token_value = body;
            return Some(SyntaxKind::InterpolatedString);
        }
        self.set_string_literal(decode_escapes(&body, None));
        Some(SyntaxKind::StringLiteral)
    }

    /// Scan `(int)`, `( string )` and the other cast tokens.
    fn try_scan_cast(&mut self) -> Option<SyntaxKind> {
        let bytes = self.bytes();
        let mut i = self.pos + 1;
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let word_start = i;
        while bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic()) {
            i += 1;
        }
        let word = self.text[word_start..i].to_ascii_lowercase();
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        if bytes.get(i) != Some(&b')') {
            return None;
        }
        let canonical = match word.as_str() {
            "int" | "integer" => "int",
            "bool" | "boolean" => "bool",
            "float" | "double" | "real" => "float",
            "string" | "binary" => "string",
            "array" => "array",
            "object" => "object",
            "unset" => "unset",
            _ => return None,
        };
        self.pos = i + 1;
        self.token_value = canonical.to_string();
        Some(SyntaxKind::CastToken)
    }

    fn scan_punctuation(&mut self) -> SyntaxKind {
        let start = self.pos;
        let ch = self.bytes()[start];
        let next = self.peek_at(1);
        let next2 = self.peek_at(2);

        let (kind, len) = match ch {
            b'{' => (SyntaxKind::OpenBraceToken, 1),
            b'}' => (SyntaxKind::CloseBraceToken, 1),
            b')' => (SyntaxKind::CloseParenToken, 1),
            b'[' => (SyntaxKind::OpenBracketToken, 1),
            b']' => (SyntaxKind::CloseBracketToken, 1),
            b';' => (SyntaxKind::SemicolonToken, 1),
            b',' => (SyntaxKind::CommaToken, 1),
            b'@' => (SyntaxKind::AtToken, 1),
            b'~' => (SyntaxKind::TildeToken, 1),
            b'.' => match (next, next2) {
                (Some(b'.'), Some(b'.')) => (SyntaxKind::DotDotDotToken, 3),
                (Some(b'='), _) => (SyntaxKind::DotEqualsToken, 2),
                _ => (SyntaxKind::DotToken, 1),
            },
            b':' => match next {
                Some(b':') => (SyntaxKind::ColonColonToken, 2),
                _ => (SyntaxKind::ColonToken, 1),
            },
            b'?' => match (next, next2) {
                (Some(b'?'), Some(b'=')) => (SyntaxKind::QuestionQuestionEqualsToken, 3),
                (Some(b'?'), _) => (SyntaxKind::QuestionQuestionToken, 2),
                (Some(b'-'), Some(b'>')) => (SyntaxKind::QuestionArrowToken, 3),
                _ => (SyntaxKind::QuestionToken, 1),
            },
            b'-' => match next {
                Some(b'>') => (SyntaxKind::ArrowToken, 2),
                Some(b'-') => (SyntaxKind::MinusMinusToken, 2),
                Some(b'=') => (SyntaxKind::MinusEqualsToken, 2),
                _ => (SyntaxKind::MinusToken, 1),
            },
            b'+' => match next {
                Some(b'+') => (SyntaxKind::PlusPlusToken, 2),
                Some(b'=') => (SyntaxKind::PlusEqualsToken, 2),
                _ => (SyntaxKind::PlusToken, 1),
            },
            b'*' => match (next, next2) {
                (Some(b'*'), Some(b'=')) => (SyntaxKind::AsteriskAsteriskEqualsToken, 3),
                (Some(b'*'), _) => (SyntaxKind::AsteriskAsteriskToken, 2),
                (Some(b'='), _) => (SyntaxKind::AsteriskEqualsToken, 2),
                _ => (SyntaxKind::AsteriskToken, 1),
            },
            b'/' => match next {
                Some(b'=') => (SyntaxKind::SlashEqualsToken, 2),
                _ => (SyntaxKind::SlashToken, 1),
            },
            b'%' => match next {
                Some(b'=') => (SyntaxKind::PercentEqualsToken, 2),
                _ => (SyntaxKind::PercentToken, 1),
            },
            b'=' => match (next, next2) {
                (Some(b'='), Some(b'=')) => (SyntaxKind::EqualsEqualsEqualsToken, 3),
                (Some(b'='), _) => (SyntaxKind::EqualsEqualsToken, 2),
                (Some(b'>'), _) => (SyntaxKind::FatArrowToken, 2),
                _ => (SyntaxKind::EqualsToken, 1),
            },
            b'!' => match (next, next2) {
                (Some(b'='), Some(b'=')) => (SyntaxKind::ExclamationEqualsEqualsToken, 3),
                (Some(b'='), _) => (SyntaxKind::ExclamationEqualsToken, 2),
                _ => (SyntaxKind::ExclamationToken, 1),
            },
            b'<' => match (next, next2) {
                (Some(b'='), Some(b'>')) => (SyntaxKind::SpaceshipToken, 3),
                (Some(b'<'), Some(b'=')) => (SyntaxKind::LessThanLessThanEqualsToken, 3),
                (Some(b'<'), _) => (SyntaxKind::LessThanLessThanToken, 2),
                (Some(b'='), _) => (SyntaxKind::LessThanEqualsToken, 2),
                (Some(b'>'), _) => (SyntaxKind::ExclamationEqualsToken, 2),
                _ => (SyntaxKind::LessThanToken, 1),
            },
            b'>' => match (next, next2) {
                (Some(b'>'), Some(b'=')) => (SyntaxKind::GreaterThanGreaterThanEqualsToken, 3),
                (Some(b'>'), _) => (SyntaxKind::GreaterThanGreaterThanToken, 2),
                (Some(b'='), _) => (SyntaxKind::GreaterThanEqualsToken, 2),
                _ => (SyntaxKind::GreaterThanToken, 1),
            },
            b'&' => match next {
                Some(b'&') => (SyntaxKind::AmpersandAmpersandToken, 2),
                Some(b'=') => (SyntaxKind::AmpersandEqualsToken, 2),
                _ => (SyntaxKind::AmpersandToken, 1),
            },
            b'|' => match next {
                Some(b'|') => (SyntaxKind::BarBarToken, 2),
                Some(b'=') => (SyntaxKind::BarEqualsToken, 2),
                _ => (SyntaxKind::BarToken, 1),
            },
            b'^' => match next {
                Some(b'=') => (SyntaxKind::CaretEqualsToken, 2),
                _ => (SyntaxKind::CaretToken, 1),
            },
            _ => {
                let ch = self.text[start..].chars().next().unwrap_or('\0');
                self.pos += ch.len_utf8().max(1);
                self.error(format!("Unexpected character '{ch}'"), start);
                return SyntaxKind::Unknown;
            }
        };

        self.pos += len;
        kind
    }

    /// Finish a `<<` that turned out not to start a heredoc.
    fn scan_operator_tail(&mut self, kind: SyntaxKind) -> SyntaxKind {
        if kind == SyntaxKind::LessThanLessThanToken && self.peek_at(0) == Some(b'=') {
            self.pos += 1;
            return SyntaxKind::LessThanLessThanEqualsToken;
        }
        kind
    }
}

// =============================================================================
// Character classes and string helpers
// =============================================================================

pub fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

pub fn is_identifier_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Whether a double-quoted or heredoc body interpolates variables.
fn has_interpolation(body: &str) -> bool {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes
                .get(i + 1)
                .is_some_and(|&n| is_identifier_start(n) || n == b'{') =>
            {
                return true;
            }
            b'{' if bytes.get(i + 1) == Some(&b'$') => return true,
            _ => i += 1,
        }
    }
    false
}

/// Decode double-quoted/heredoc escape sequences into the bytes of the
/// string. `quote` is the delimiting quote (`"` for double-quoted strings,
/// `None` for heredocs); a backslash before any other quote character is
/// kept.
///
/// Octal and hex escapes produce a single raw byte, so `"\xc3\xa9"` and
/// `"\u{e9}"` decode to the same two bytes.
pub fn decode_escapes(raw: &str, quote: Option<u8>) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let Some(&next) = bytes.get(i + 1) else {
            out.push(b'\\');
            break;
        };
        let simple = match next {
            b'n' => Some(b'\n'),
            b't' => Some(b'\t'),
            b'r' => Some(b'\r'),
            b'v' => Some(0x0b),
            b'e' => Some(0x1b),
            b'f' => Some(0x0c),
            b'\\' => Some(b'\\'),
            b'$' => Some(b'$'),
            b'"' if quote == Some(b'"') => Some(b'"'),
            _ => None,
        };
        if let Some(decoded) = simple {
            out.push(decoded);
            i += 2;
            continue;
        }

        match next {
            b'0'..=b'7' => {
                let digits = octal_digits(&bytes[i + 1..]);
                let value = bytes[i + 1..i + 1 + digits]
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                // `\400` and above wrap to a byte.
                out.push((value & 0xff) as u8);
                i += 1 + digits;
            }
            b'x' if bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit) => {
                let digits = bytes[i + 2..]
                    .iter()
                    .take(2)
                    .take_while(|d| d.is_ascii_hexdigit())
                    .count();
                let value = bytes[i + 2..i + 2 + digits]
                    .iter()
                    .fold(0u8, |acc, d| acc.wrapping_mul(16).wrapping_add(hex_value(*d)));
                out.push(value);
                i += 2 + digits;
            }
            b'u' if bytes.get(i + 2) == Some(&b'{') => {
                let digits = bytes[i + 3..]
                    .iter()
                    .take_while(|d| d.is_ascii_hexdigit())
                    .count();
                let decoded = (digits > 0 && bytes.get(i + 3 + digits) == Some(&b'}'))
                    .then(|| std::str::from_utf8(&bytes[i + 3..i + 3 + digits]).ok())
                    .flatten()
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
                        i += 4 + digits;
                    }
                    None => {
                        out.push(b'\\');
                        i += 1;
                    }
                }
            }
            _ => {
                out.push(b'\\');
                i += 1;
            }
        }
    }

    out
}

fn octal_digits(bytes: &[u8]) -> usize {
    bytes.iter().take(3).take_while(|b| (b'0'..=b'7').contains(*b)).count()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}
