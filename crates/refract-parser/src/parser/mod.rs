//! PHP parser: recursive descent over the scanner's token stream into a
//! flat [`NodeArena`].

pub mod base;
pub mod node;
pub mod node_arena;
pub mod state;
mod state_class_members;
mod state_expressions;
mod state_statements;
mod state_types;

pub use base::{NodeIndex, NodeList, TextRange};
pub use node::*;
pub use node_arena::NodeArena;
pub use state::{ParseDiagnostic, ParserState};
