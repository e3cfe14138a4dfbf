//! Errors raised by reflection queries and constant evaluation.
//!
//! Every variant is `Clone` so a failed constant resolution can be cached
//! and replayed to later callers unchanged.

use refract_binder::{BinderError, NamespaceNotFoundError, ParseError};
use refract_parser::NodeIndex;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectionError {
    /// Source could not be read or parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A requested namespace is not declared in the file.
    #[error(transparent)]
    NamespaceNotFound(#[from] NamespaceNotFoundError),

    /// No declaration was found for a class name, including names the
    /// locator could not map to a file.
    #[error("class '{name}' not found")]
    ClassNotFound { name: String },

    #[error("function '{name}' not found")]
    FunctionNotFound { name: String },

    /// A constant fetch names a constant that is not declared anywhere.
    #[error("undefined constant {name}")]
    ConstantNotFound { name: String },

    /// A class is (transitively) its own ancestor.
    #[error("inheritance cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    /// A constant's value depends on itself.
    #[error("circular constant reference: {}", .cycle.join(" -> "))]
    CircularConstant { cycle: Vec<String> },

    /// The expression cannot be evaluated without executing code.
    #[error("cannot statically evaluate {kind} expression in {} on line {line}", .file.display())]
    UnresolvableConstantExpression {
        kind: String,
        file: PathBuf,
        line: u32,
        node: NodeIndex,
    },

    /// Evaluation reached a runtime error (division by zero, bad operand
    /// types, missing array key).
    #[error("{message} in {} on line {line}", .file.display())]
    Evaluation {
        message: String,
        file: PathBuf,
        line: u32,
    },

    /// A recursion bound was hit.
    #[error("{what} exceeds the maximum depth of {limit}")]
    DepthLimitExceeded { what: String, limit: u32 },

    /// `default_value()` on a parameter or property without a default.
    #[error("{subject} has no default value")]
    NoDefaultValue { subject: String },
}

impl From<BinderError> for ReflectionError {
    fn from(err: BinderError) -> ReflectionError {
        match err {
            BinderError::Parse(err) => ReflectionError::Parse(err),
            BinderError::NamespaceNotFound(err) => ReflectionError::NamespaceNotFound(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReflectionError>;
