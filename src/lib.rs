//! refract: static reflection for PHP source code.
//!
//! Classes, interfaces, traits, enums, functions and constants are described
//! by reading source text. Nothing is executed, included or autoloaded;
//! constant expressions (class constants, parameter and property defaults,
//! `const` and `define()` values) are evaluated by a small interpreter that
//! only understands what PHP allows in constant context.
//!
//! ```no_run
//! use refract::{ClassMapLocator, Reflector};
//! use std::path::Path;
//!
//! let locator = ClassMapLocator::scan(Path::new("src"));
//! let reflector = Reflector::new(locator);
//! let class = reflector.reflect_class("App\\Model\\User").expect("class exists");
//! for method in class.get_methods(None).expect("hierarchy resolves") {
//!     println!("{}::{}", method.declaring_class_name(), method.name());
//! }
//! ```
//!
//! The workspace is split the same way the pipeline runs:
//! - `refract-scanner` tokenizes PHP source
//! - `refract-parser` builds the node arena
//! - `refract-binder` caches parsed files and discovers namespace entities
//! - `refract-reflection` evaluates constant expressions and serves the
//!   `Reflection*` object model

// Lower layers, for callers that need the AST or discovery results directly.
pub use refract_binder as binder;
pub use refract_common as common;
pub use refract_parser as parser;
pub use refract_scanner as scanner;

pub use refract_binder::{NamespaceNotFoundError, ParseError, SourceCache, SourceFile};
pub use refract_reflection::*;

// Subscriber setup for REFRACT_LOG / RUST_LOG.
pub mod tracing_config;
