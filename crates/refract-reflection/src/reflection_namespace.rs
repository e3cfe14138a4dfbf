//! `ReflectionNamespace` and `ReflectionFile`: the entities declared in one
//! namespace block or one whole file.

use crate::error::{ReflectionError, Result};
use crate::reflection_class::ReflectionClass;
use crate::reflection_constant::ReflectionConstant;
use crate::reflection_function::ReflectionFunction;
use crate::reflector::Reflector;
use crate::value::ConstValue;
use indexmap::IndexMap;
use refract_binder::{NamespaceBlock, NamespaceNotFoundError, SkippedEntity, SourceFile};
use refract_common::names::{NameKey, join_namespace, strip_leading_separator};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

#[derive(Clone)]
pub struct ReflectionNamespace<'r> {
    reflector: &'r Reflector,
    block: NamespaceBlock,
}

impl<'r> ReflectionNamespace<'r> {
    pub(crate) fn new(reflector: &'r Reflector, block: NamespaceBlock) -> ReflectionNamespace<'r> {
        ReflectionNamespace { reflector, block }
    }

    /// Empty for the global namespace.
    pub fn name(&self) -> &str {
        self.block.name()
    }

    pub fn is_global(&self) -> bool {
        self.block.is_global()
    }

    pub fn file_name(&self) -> &Path {
        self.block.file().path()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.block.doc_comment()
    }

    /// Class-likes declared in this block, in source order.
    pub fn classes(&self) -> Vec<ReflectionClass<'r>> {
        self.block
            .entities()
            .classes
            .values()
            .filter_map(|entry| self.reflector.block_class(&self.block, entry))
            .map(|class| ReflectionClass::new(self.reflector, class))
            .collect()
    }

    /// A class declared in this block, by short or fully-qualified name.
    pub fn get_class(&self, name: &str) -> Option<ReflectionClass<'r>> {
        let entities = self.block.entities();
        let entry = entities
            .classes
            .get(&NameKey::folded(&join_namespace(self.block.name(), name)))
            .or_else(|| entities.classes.get(&NameKey::folded(strip_leading_separator(name))))?;
        let class = self.reflector.block_class(&self.block, entry)?;
        Some(ReflectionClass::new(self.reflector, class))
    }

    pub fn functions(&self) -> Vec<ReflectionFunction<'r>> {
        self.block
            .entities()
            .functions
            .values()
            .filter_map(|entry| self.reflector.block_function(&self.block, entry))
            .map(|function| ReflectionFunction::new(self.reflector, function))
            .collect()
    }

    /// `const` and `define()` constants of this block, resolved or not.
    pub fn reflection_constants(&self) -> Vec<ReflectionConstant<'r>> {
        self.block
            .entities()
            .constants
            .values()
            .map(|entry| ReflectionConstant::new(self.reflector, self.reflector.block_constant(&self.block, entry)))
            .collect()
    }

    /// Fully-qualified name to value. Constants that cannot be resolved are
    /// left out; query them through [`ReflectionNamespace::reflection_constants`]
    /// to see why.
    pub fn constants(&self) -> IndexMap<String, ConstValue> {
        let mut values = IndexMap::new();
        for constant in self.reflection_constants() {
            match constant.value() {
                Ok(value) => {
                    values.insert(constant.name().to_string(), value);
                }
                Err(err) => {
                    debug!(constant = constant.name(), error = %err, "skipping unresolvable constant");
                }
            }
        }
        values
    }

    /// Value of one constant of this block, by short or fully-qualified
    /// name. Errors surface to the caller.
    pub fn get_constant(&self, name: &str) -> Result<Option<ConstValue>> {
        let entities = self.block.entities();
        let entry = entities
            .constants
            .get(&NameKey::constant(&join_namespace(self.block.name(), name)))
            .or_else(|| entities.constants.get(&NameKey::constant(name)));
        let Some(entry) = entry else {
            return Ok(None);
        };
        let constant = self.reflector.block_constant(&self.block, entry);
        self.reflector.constant_value(&constant).map(Some)
    }

    /// Declarations discovery could not register.
    pub fn skipped(&self) -> &[SkippedEntity] {
        &self.block.entities().skipped
    }
}

impl fmt::Debug for ReflectionNamespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionNamespace")
            .field("name", &self.block.name())
            .field("file", &self.block.file().path())
            .finish()
    }
}

#[derive(Clone)]
pub struct ReflectionFile<'r> {
    reflector: &'r Reflector,
    file: Rc<SourceFile>,
}

impl<'r> ReflectionFile<'r> {
    pub(crate) fn new(reflector: &'r Reflector, file: Rc<SourceFile>) -> ReflectionFile<'r> {
        ReflectionFile { reflector, file }
    }

    pub fn source(&self) -> &Rc<SourceFile> {
        &self.file
    }

    /// Canonical path.
    pub fn file_name(&self) -> &Path {
        self.file.path()
    }

    /// Namespace blocks in source order. A file without namespace
    /// statements has one global block.
    pub fn namespaces(&self) -> Vec<ReflectionNamespace<'r>> {
        self.file
            .namespaces()
            .into_iter()
            .map(|block| ReflectionNamespace::new(self.reflector, block))
            .collect()
    }

    pub fn namespace(&self, name: &str) -> Result<ReflectionNamespace<'r>> {
        let name = strip_leading_separator(name);
        let block = self.file.namespace(name).ok_or_else(|| {
            ReflectionError::NamespaceNotFound(NamespaceNotFoundError {
                path: self.file.path().to_path_buf(),
                namespace: name.to_string(),
            })
        })?;
        Ok(ReflectionNamespace::new(self.reflector, block))
    }

    pub fn classes(&self) -> Vec<ReflectionClass<'r>> {
        self.namespaces()
            .iter()
            .flat_map(ReflectionNamespace::classes)
            .collect()
    }

    pub fn functions(&self) -> Vec<ReflectionFunction<'r>> {
        self.namespaces()
            .iter()
            .flat_map(ReflectionNamespace::functions)
            .collect()
    }

    /// Resolvable constants of every block.
    pub fn constants(&self) -> IndexMap<String, ConstValue> {
        self.namespaces()
            .iter()
            .flat_map(ReflectionNamespace::constants)
            .collect()
    }
}

impl fmt::Debug for ReflectionFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReflectionFile").field(&self.file.path()).finish()
    }
}
