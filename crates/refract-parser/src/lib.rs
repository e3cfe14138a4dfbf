//! Parser and AST for the refract static reflection library.
//!
//! This crate provides:
//! - `ParserState` - recursive-descent PHP parser producing a `NodeArena`
//! - `Node` - the AST node enum, one variant per syntactic form
//! - `NodeIndex` / `NodeList` - arena handles

pub mod parser;
pub use parser::*;

#[cfg(test)]
#[path = "../tests/tests.rs"]
mod tests;

#[cfg(test)]
#[path = "../tests/state_statement_tests.rs"]
mod state_statement_tests;

#[cfg(test)]
#[path = "../tests/state_expression_tests.rs"]
mod state_expression_tests;

#[cfg(test)]
#[path = "../tests/state_type_tests.rs"]
mod state_type_tests;
