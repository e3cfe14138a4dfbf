//! Error types for loading source files and namespaces.

use refract_parser::ParseDiagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// A file could not be read, or its source is not valid PHP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The file could not be read
    #[error("cannot read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// The parser reported syntax errors
    #[error("syntax error in {} on line {}: {}", .path.display(), first_line(.diagnostics), first_message(.diagnostics))]
    Syntax {
        path: PathBuf,
        /// All diagnostics, ordered by position
        diagnostics: Vec<ParseDiagnostic>,
    },
}

impl ParseError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::Io { path, .. } | ParseError::Syntax { path, .. } => path,
        }
    }
}

fn first_line(diagnostics: &[ParseDiagnostic]) -> u32 {
    diagnostics.first().map_or(0, |d| d.line)
}

fn first_message(diagnostics: &[ParseDiagnostic]) -> &str {
    diagnostics.first().map_or("", |d| d.message.as_str())
}

/// The requested namespace is not declared in the file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("namespace '{namespace}' not found in {}", .path.display())]
pub struct NamespaceNotFoundError {
    pub path: PathBuf,
    pub namespace: String,
}

/// Errors from [`SourceCache::parse_namespace_block`](crate::SourceCache::parse_namespace_block).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    NamespaceNotFound(#[from] NamespaceNotFoundError),
}
