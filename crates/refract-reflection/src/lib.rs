//! Reflection object model and constant-expression resolver for the refract
//! static reflection library.
//!
//! This crate provides:
//! - `Reflector` - entry point owning caches, the entity index and the
//!   recursion guards
//! - `ReflectionClass`, `ReflectionMethod`, `ReflectionFunction`,
//!   `ReflectionParameter`, `ReflectionProperty`, `ReflectionClassConstant`,
//!   `ReflectionConstant`, `ReflectionNamespace`, `ReflectionFile` - handles
//!   mirroring PHP's `Reflection*` classes
//! - `ConstValue` / `PhpArray` / `PhpString` - values of evaluated constant expressions
//! - `Locator` - class-name to file lookup supplied by the caller

pub mod error;
pub use error::{ReflectionError, Result};

pub mod value;
pub use value::{ArrayKey, ConstValue, PhpArray, PhpString};

pub mod ops;
pub mod builtins;

pub mod modifiers;
pub use modifiers::{ClassModifiers, ConstantModifiers, MethodModifiers, PropertyModifiers, Visibility};

pub mod locator;
pub use locator::{ClassMapLocator, FnLocator, Locator, NullLocator};

pub mod reflection_type;
pub use reflection_type::ReflectionType;

pub mod descriptor;
pub use descriptor::{
    ClassDescriptor, ConstantDescriptor, ConstantOwner, FunctionDescriptor, FunctionLikeDescriptor,
    MethodDescriptor, ParameterDescriptor, PropertyDescriptor, ResolutionState,
};

mod evaluator;
mod inheritance;

pub mod reflector;
pub use reflector::{Reflector, ReflectorOptions};

pub mod reflection_class;
pub use reflection_class::ReflectionClass;

pub mod reflection_function;
pub use reflection_function::{ReflectionFunction, ReflectionMethod, ReflectionParameter};

pub mod reflection_property;
pub use reflection_property::ReflectionProperty;

pub mod reflection_constant;
pub use reflection_constant::{ReflectionClassConstant, ReflectionConstant};

pub mod reflection_namespace;
pub use reflection_namespace::{ReflectionFile, ReflectionNamespace};

pub use refract_parser::ClassLikeKind;

#[cfg(test)]
#[path = "../tests/value_tests.rs"]
mod value_tests;

#[cfg(test)]
#[path = "../tests/ops_tests.rs"]
mod ops_tests;

#[cfg(test)]
#[path = "../tests/builtins_tests.rs"]
mod builtins_tests;

#[cfg(test)]
#[path = "../tests/locator_tests.rs"]
mod locator_tests;

#[cfg(test)]
#[path = "../tests/evaluator_tests.rs"]
mod evaluator_tests;

#[cfg(test)]
#[path = "../tests/class_model_tests.rs"]
mod class_model_tests;

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod inheritance_tests;

#[cfg(test)]
#[path = "../tests/constant_resolution_tests.rs"]
mod constant_resolution_tests;
