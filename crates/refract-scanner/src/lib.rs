//! PHP scanner/tokenizer for the refract static reflection library.
//!
//! This crate provides:
//! - `SyntaxKind` - token kinds (punctuation, operators, keywords, literals)
//! - `ScannerState` - the on-demand tokenizer used by the parser
//! - numeric literal parsing with PHP integer-overflow semantics

pub mod syntax_kind;
pub use syntax_kind::{SyntaxKind, keyword_kind};

pub mod scanner_impl;
pub use scanner_impl::{ScanDiagnostic, ScannerSnapshot, ScannerState, decode_escapes, token_flags};

pub mod numeric;
pub use numeric::{NumericLiteral, parse_float_literal, parse_integer_literal};

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod scanner_tests;
