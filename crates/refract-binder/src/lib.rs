//! Source cache, namespace discovery and name resolution for the refract
//! static reflection library.
//!
//! This crate provides:
//! - `SourceCache` - canonical-path keyed cache of parsed files
//! - `SourceFile` / `NamespaceBlock` - parsed files and their namespaces
//! - `NamespaceEntities` - classes, functions, constants and imports
//!   declared at the top level of a namespace block
//! - `NameResolver` - PHP name resolution against imports

pub mod error;
pub use error::{BinderError, NamespaceNotFoundError, ParseError};

pub mod source_file;
pub use source_file::{FileIdentity, NamespaceBlock, SourceFile};

pub mod cache;
pub use cache::SourceCache;

pub mod discovery;
pub use discovery::{
    ClassEntry, ConstantEntry, ConstantOrigin, FunctionEntry, NamespaceEntities, SkippedEntity,
};

pub mod resolver;
pub use resolver::{ImportTable, NameResolver, is_special_class_name};

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod cache_tests;

#[cfg(test)]
#[path = "../tests/discovery_tests.rs"]
mod discovery_tests;

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod resolver_tests;
