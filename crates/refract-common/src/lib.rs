//! Common types and utilities for the refract static reflection library.
//!
//! This crate provides foundational types used across all refract crates:
//! - Centralized limits and thresholds
//! - Line maps for turning byte offsets into line numbers
//! - Name helpers implementing the case-sensitivity policy for PHP names

// Centralized limits and thresholds
pub mod limits;

// Line/offset mapping for source locations
pub mod position;
pub use position::LineMap;

// Qualified-name helpers and lookup keys
pub mod names;
pub use names::{NameKey, QualifiedName};

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod position_tests;

#[cfg(test)]
#[path = "../tests/names_tests.rs"]
mod names_tests;
