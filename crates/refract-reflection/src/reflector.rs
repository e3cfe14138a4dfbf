//! The `Reflector` facade: entry point for all reflection queries.
//!
//! A `Reflector` owns the source cache, the index of entities declared in
//! every file it has parsed, memoized descriptors, and the in-progress
//! stacks that turn inheritance and constant cycles into errors.

use crate::descriptor::{ClassDescriptor, ConstantDescriptor, FunctionDescriptor, ResolutionState, Scope};
use crate::error::{ReflectionError, Result};
use crate::evaluator::Evaluator;
use crate::locator::Locator;
use crate::reflection_class::ReflectionClass;
use crate::reflection_constant::ReflectionConstant;
use crate::reflection_function::ReflectionFunction;
use crate::reflection_namespace::{ReflectionFile, ReflectionNamespace};
use crate::value::ConstValue;
use refract_binder::{ClassEntry, ConstantEntry, FunctionEntry, NamespaceBlock, SourceCache, SourceFile};
use refract_common::limits::{MAX_CONSTANT_CHAIN, MAX_CONST_EXPR_DEPTH, MAX_INHERITANCE_DEPTH};
use refract_common::names::{NameKey, strip_leading_separator};
use refract_parser::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, trace};

/// Reflector configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReflectorOptions {
    /// Bound on nested sub-expressions plus cross-constant hops.
    pub max_expression_depth: u32,
    /// Bound on the number of constants resolving at once.
    pub max_constant_chain: u32,
    /// Bound on the length of an ancestor chain.
    pub max_inheritance_depth: u32,
    /// Resolve predefined constants such as `PHP_EOL` and `E_ALL`.
    pub builtin_constants: bool,
    /// Used for `DIRECTORY_SEPARATOR`, `dirname()` and `basename()`.
    pub directory_separator: char,
}

impl Default for ReflectorOptions {
    fn default() -> Self {
        ReflectorOptions {
            max_expression_depth: MAX_CONST_EXPR_DEPTH,
            max_constant_chain: MAX_CONSTANT_CHAIN,
            max_inheritance_depth: MAX_INHERITANCE_DEPTH,
            builtin_constants: true,
            directory_separator: std::path::MAIN_SEPARATOR,
        }
    }
}

impl ReflectorOptions {
    pub fn with_max_expression_depth(mut self, depth: u32) -> Self {
        self.max_expression_depth = depth;
        self
    }

    pub fn with_max_constant_chain(mut self, length: u32) -> Self {
        self.max_constant_chain = length;
        self
    }

    pub fn with_max_inheritance_depth(mut self, depth: u32) -> Self {
        self.max_inheritance_depth = depth;
        self
    }

    pub fn with_builtin_constants(mut self, enabled: bool) -> Self {
        self.builtin_constants = enabled;
        self
    }

    pub fn with_directory_separator(mut self, separator: char) -> Self {
        self.directory_separator = separator;
        self
    }
}

/// Entities declared in parsed files, first declaration wins.
#[derive(Default)]
struct EntityIndex {
    files: FxHashSet<PathBuf>,
    classes: FxHashMap<NameKey, (NamespaceBlock, ClassEntry)>,
    functions: FxHashMap<NameKey, (NamespaceBlock, FunctionEntry)>,
    constants: FxHashMap<NameKey, (NamespaceBlock, ConstantEntry)>,
}

/// Pops an in-progress stack when dropped.
pub(crate) struct StackGuard<'a> {
    stack: &'a RefCell<Vec<String>>,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

/// Decrements the expression depth when dropped.
pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<u32>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

pub struct Reflector {
    options: ReflectorOptions,
    locator: Box<dyn Locator>,
    sources: Rc<SourceCache>,
    index: RefCell<EntityIndex>,
    classes: RefCell<FxHashMap<NameKey, Rc<ClassDescriptor>>>,
    functions: RefCell<FxHashMap<NameKey, Rc<FunctionDescriptor>>>,
    constants: RefCell<FxHashMap<NameKey, Rc<ConstantDescriptor>>>,
    /// Classes whose ancestors are being walked.
    class_stack: RefCell<Vec<String>>,
    /// Constants being resolved, outermost first.
    constant_stack: RefCell<Vec<String>>,
    expression_depth: Cell<u32>,
}

impl Reflector {
    pub fn new(locator: impl Locator + 'static) -> Reflector {
        Reflector::with_options(locator, ReflectorOptions::default())
    }

    pub fn with_options(locator: impl Locator + 'static, options: ReflectorOptions) -> Reflector {
        Reflector::with_source_cache(locator, options, Rc::new(SourceCache::new()))
    }

    /// Share a source cache with other reflectors.
    pub fn with_source_cache(
        locator: impl Locator + 'static,
        options: ReflectorOptions,
        sources: Rc<SourceCache>,
    ) -> Reflector {
        Reflector {
            options,
            locator: Box::new(locator),
            sources,
            index: RefCell::new(EntityIndex::default()),
            classes: RefCell::new(FxHashMap::default()),
            functions: RefCell::new(FxHashMap::default()),
            constants: RefCell::new(FxHashMap::default()),
            class_stack: RefCell::new(Vec::new()),
            constant_stack: RefCell::new(Vec::new()),
            expression_depth: Cell::new(0),
        }
    }

    pub fn options(&self) -> &ReflectorOptions {
        &self.options
    }

    pub fn sources(&self) -> &SourceCache {
        &self.sources
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Parse a file and make its declarations visible to lookups.
    pub fn reflect_file(&self, path: impl AsRef<Path>) -> Result<ReflectionFile<'_>> {
        let file = self.sources.parse_file(path.as_ref())?;
        self.index_file(&file);
        Ok(ReflectionFile::new(self, file))
    }

    /// Like [`Reflector::reflect_file`] for in-memory source.
    pub fn reflect_source(
        &self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Result<ReflectionFile<'_>> {
        let file = self.sources.parse_source(path.as_ref(), text)?;
        self.index_file(&file);
        Ok(ReflectionFile::new(self, file))
    }

    /// One namespace of a file. The whole file is indexed.
    pub fn reflect_namespace(
        &self,
        path: impl AsRef<Path>,
        namespace: &str,
    ) -> Result<ReflectionNamespace<'_>> {
        let block = self.sources.parse_namespace_block(path.as_ref(), namespace)?;
        self.index_file(block.file());
        Ok(ReflectionNamespace::new(self, block))
    }

    /// Class, interface, trait or enum by fully-qualified name. Files
    /// already parsed are searched first, then the locator.
    pub fn reflect_class(&self, name: &str) -> Result<ReflectionClass<'_>> {
        let class = self.class_descriptor(name)?;
        Ok(ReflectionClass::new(self, class))
    }

    /// Function by fully-qualified name, from files already parsed.
    pub fn reflect_function(&self, name: &str) -> Result<ReflectionFunction<'_>> {
        let function = self
            .function_descriptor(name)
            .ok_or_else(|| ReflectionError::FunctionNotFound {
                name: strip_leading_separator(name).to_string(),
            })?;
        Ok(ReflectionFunction::new(self, function))
    }

    /// Namespace-level constant (`const` or `define`) by fully-qualified
    /// name, from files already parsed.
    pub fn reflect_constant(&self, name: &str) -> Result<ReflectionConstant<'_>> {
        let constant = self
            .namespace_constant(name)
            .ok_or_else(|| ReflectionError::ConstantNotFound {
                name: strip_leading_separator(name).to_string(),
            })?;
        Ok(ReflectionConstant::new(self, constant))
    }

    // =========================================================================
    // Index and descriptor caches
    // =========================================================================

    fn index_file(&self, file: &Rc<SourceFile>) {
        let mut index = self.index.borrow_mut();
        if !index.files.insert(file.path().to_path_buf()) {
            return;
        }
        for block in file.namespaces() {
            let entities = block.entities();
            for (key, class) in &entities.classes {
                index
                    .classes
                    .entry(key.clone())
                    .or_insert_with(|| (block.clone(), class.clone()));
            }
            for (key, function) in &entities.functions {
                index
                    .functions
                    .entry(key.clone())
                    .or_insert_with(|| (block.clone(), function.clone()));
            }
            for (key, constant) in &entities.constants {
                index
                    .constants
                    .entry(key.clone())
                    .or_insert_with(|| (block.clone(), constant.clone()));
            }
        }
        debug!(
            path = %file.path().display(),
            classes = index.classes.len(),
            functions = index.functions.len(),
            constants = index.constants.len(),
            "indexed file"
        );
    }

    pub(crate) fn class_descriptor(&self, name: &str) -> Result<Rc<ClassDescriptor>> {
        let name = strip_leading_separator(name);
        let key = NameKey::folded(name);
        if let Some(class) = self.classes.borrow().get(&key) {
            return Ok(Rc::clone(class));
        }

        let indexed = self.index.borrow().classes.get(&key).cloned();
        let (block, entry) = match indexed {
            Some(found) => found,
            None => self.locate_class(name, &key)?,
        };
        let class = ClassDescriptor::new(&block, &entry)
            .map(Rc::new)
            .ok_or_else(|| ReflectionError::ClassNotFound {
                name: name.to_string(),
            })?;
        self.classes.borrow_mut().insert(key, Rc::clone(&class));
        Ok(class)
    }

    fn locate_class(&self, name: &str, key: &NameKey) -> Result<(NamespaceBlock, ClassEntry)> {
        let not_found = || ReflectionError::ClassNotFound {
            name: name.to_string(),
        };
        let Some(path) = self.locator.locate(name) else {
            debug!(class = name, "locator has no file for class");
            return Err(not_found());
        };
        debug!(class = name, path = %path.display(), "locator resolved class");

        let file = self.sources.parse_file(&path)?;
        self.index_file(&file);
        self.index.borrow().classes.get(key).cloned().ok_or_else(not_found)
    }

    pub(crate) fn function_descriptor(&self, name: &str) -> Option<Rc<FunctionDescriptor>> {
        let key = NameKey::folded(name);
        if let Some(function) = self.functions.borrow().get(&key) {
            return Some(Rc::clone(function));
        }
        let (block, entry) = self.index.borrow().functions.get(&key).cloned()?;
        let function = Rc::new(FunctionDescriptor::from_entry(&block, &entry)?);
        self.functions.borrow_mut().insert(key, Rc::clone(&function));
        Some(function)
    }

    pub(crate) fn has_function(&self, name: &str) -> bool {
        self.index
            .borrow()
            .functions
            .contains_key(&NameKey::folded(name))
    }

    pub(crate) fn namespace_constant(&self, name: &str) -> Option<Rc<ConstantDescriptor>> {
        let key = NameKey::constant(name);
        if let Some(constant) = self.constants.borrow().get(&key) {
            return Some(Rc::clone(constant));
        }
        let (block, entry) = self.index.borrow().constants.get(&key).cloned()?;
        let constant = Rc::new(ConstantDescriptor::from_entry(&block, &entry));
        self.constants.borrow_mut().insert(key, Rc::clone(&constant));
        Some(constant)
    }

    /// Descriptor for a namespace constant discovered in `block`, shared
    /// with name lookups.
    pub(crate) fn block_constant(&self, block: &NamespaceBlock, entry: &ConstantEntry) -> Rc<ConstantDescriptor> {
        match self.namespace_constant(&entry.name) {
            Some(constant) if constant.scope.block == *block => constant,
            _ => Rc::new(ConstantDescriptor::from_entry(block, entry)),
        }
    }

    /// Descriptor for a class discovered in `block`. Shared with name
    /// lookups unless another file declared the name first.
    pub(crate) fn block_class(&self, block: &NamespaceBlock, entry: &ClassEntry) -> Option<Rc<ClassDescriptor>> {
        match self.class_descriptor(&entry.name) {
            Ok(class) if class.scope.block == *block && class.node == entry.node => Some(class),
            _ => ClassDescriptor::new(block, entry).map(Rc::new),
        }
    }

    pub(crate) fn block_function(&self, block: &NamespaceBlock, entry: &FunctionEntry) -> Option<Rc<FunctionDescriptor>> {
        match self.function_descriptor(&entry.name) {
            Some(function) if function.scope.block == *block && function.node == entry.node => Some(function),
            _ => FunctionDescriptor::from_entry(block, entry).map(Rc::new),
        }
    }

    // =========================================================================
    // Recursion guards
    // =========================================================================

    /// Push a class onto the in-progress stack, failing on a cycle.
    pub(crate) fn enter_class(&self, name: &str) -> Result<StackGuard<'_>> {
        let mut stack = self.class_stack.borrow_mut();
        let key = NameKey::folded(name);
        if let Some(start) = stack.iter().position(|entry| NameKey::folded(entry) == key) {
            let mut chain = stack[start..].to_vec();
            chain.push(name.to_string());
            debug!(chain = %chain.join(" -> "), "inheritance cycle");
            return Err(ReflectionError::InheritanceCycle { chain });
        }
        if stack.len() as u32 >= self.options.max_inheritance_depth {
            return Err(ReflectionError::DepthLimitExceeded {
                what: format!("ancestor chain of {name}"),
                limit: self.options.max_inheritance_depth,
            });
        }
        stack.push(name.to_string());
        Ok(StackGuard {
            stack: &self.class_stack,
        })
    }

    pub(crate) fn enter_expression(&self) -> Result<DepthGuard<'_>> {
        let depth = self.expression_depth.get();
        if depth >= self.options.max_expression_depth {
            return Err(ReflectionError::DepthLimitExceeded {
                what: "constant expression".to_string(),
                limit: self.options.max_expression_depth,
            });
        }
        self.expression_depth.set(depth + 1);
        Ok(DepthGuard {
            depth: &self.expression_depth,
        })
    }

    // =========================================================================
    // Constant resolution
    // =========================================================================

    /// Value of a constant. Enum cases evaluate to their case object.
    pub(crate) fn constant_value(&self, constant: &ConstantDescriptor) -> Result<ConstValue> {
        if constant.enum_case {
            if let crate::descriptor::ConstantOwner::Class(class) = &constant.owner {
                return Ok(ConstValue::EnumCase {
                    class: class.clone(),
                    case: constant.name.clone(),
                });
            }
        }
        self.resolve_constant(constant)
    }

    /// Backing value of an enum case; `Null` for pure enums.
    pub(crate) fn enum_backing_value(&self, case: &ConstantDescriptor) -> Result<ConstValue> {
        if case.expr.is_none() {
            return Ok(ConstValue::Null);
        }
        self.resolve_constant(case)
    }

    /// Evaluate a constant's initializer at most once. Re-entering a
    /// constant that is still resolving is a cycle.
    ///
    /// A depth bound hit below the outermost constant depends on where the
    /// query started, so the inner constants on the way go back to
    /// `Unresolved` and can still be resolved by a shallower query.
    #[tracing::instrument(level = "debug", skip_all, fields(constant = %constant.identity()))]
    pub(crate) fn resolve_constant(&self, constant: &ConstantDescriptor) -> Result<ConstValue> {
        let identity = constant.identity();
        match &*constant.state.borrow() {
            ResolutionState::Resolved(value) => return Ok(value.clone()),
            ResolutionState::Failed(err) => return Err(err.clone()),
            ResolutionState::Resolving => {
                let stack = self.constant_stack.borrow();
                let start = stack.iter().position(|entry| *entry == identity).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(identity);
                return Err(ReflectionError::CircularConstant { cycle });
            }
            ResolutionState::Unresolved => {}
        }

        let chain = self.constant_stack.borrow().len() as u32;
        if chain >= self.options.max_constant_chain {
            debug!(constant = %identity, chain, "constant chain too long");
            return Err(ReflectionError::DepthLimitExceeded {
                what: "constant chain".to_string(),
                limit: self.options.max_constant_chain,
            });
        }

        constant.state.replace(ResolutionState::Resolving);
        let outcome = {
            self.constant_stack.borrow_mut().push(identity);
            let _guard = StackGuard {
                stack: &self.constant_stack,
            };
            self.evaluate(&constant.scope, constant.expr)
        };

        let outermost = self.constant_stack.borrow().is_empty();
        constant.state.replace(match &outcome {
            Ok(value) => ResolutionState::Resolved(value.clone()),
            Err(ReflectionError::DepthLimitExceeded { .. }) if !outermost => ResolutionState::Unresolved,
            Err(err) => ResolutionState::Failed(err.clone()),
        });
        trace!(ok = outcome.is_ok(), "constant resolved");
        outcome
    }

    pub(crate) fn evaluate(&self, scope: &Scope, node: NodeIndex) -> Result<ConstValue> {
        Evaluator::new(self, scope).evaluate(node)
    }
}
