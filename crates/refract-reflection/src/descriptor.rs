//! Descriptors: immutable views of declarations built from AST nodes.
//!
//! A descriptor holds names already resolved against its namespace, the
//! node it was built from, and a [`Scope`] used when one of its expressions
//! (default values, constant initializers) is evaluated. Class members are
//! built on first access and then shared, so repeated queries hand out the
//! same `Rc`.

use crate::error::ReflectionError;
use crate::modifiers::{
    ClassModifiers, ConstantModifiers, MethodModifiers, PropertyModifiers,
};
use crate::reflection_type::ReflectionType;
use crate::value::ConstValue;
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use refract_binder::{ClassEntry, ConstantEntry, FunctionEntry, NameResolver, NamespaceBlock, SourceFile};
use refract_common::names::{NameKey, split_namespace};
use refract_parser::{
    ClassLikeData, ClassLikeKind, FunctionData, Node, NodeArena, NodeIndex, ParameterData,
    StaticVar, modifier_flags,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

// =============================================================================
// Lexical scope
// =============================================================================

/// Enclosing class of a declaration.
#[derive(Clone, Debug)]
pub(crate) struct ClassScope {
    pub(crate) name: String,
    pub(crate) kind: ClassLikeKind,
    pub(crate) parent: Option<String>,
}

/// Lexical context an expression is evaluated in.
pub(crate) struct Scope {
    pub(crate) block: NamespaceBlock,
    pub(crate) class: Option<ClassScope>,
    /// Function or method name as `__FUNCTION__` reports it.
    pub(crate) function: Option<String>,
}

impl Scope {
    pub(crate) fn namespace(block: &NamespaceBlock) -> Rc<Scope> {
        Rc::new(Scope {
            block: block.clone(),
            class: None,
            function: None,
        })
    }

    pub(crate) fn with_function(&self, name: &str) -> Rc<Scope> {
        Rc::new(Scope {
            block: self.block.clone(),
            class: self.class.clone(),
            function: Some(name.to_string()),
        })
    }

    pub(crate) fn file(&self) -> &Rc<SourceFile> {
        self.block.file()
    }

    pub(crate) fn arena(&self) -> &NodeArena {
        self.block.file().arena()
    }

    pub(crate) fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(self.block.name(), &self.block.entities().imports)
    }

    pub(crate) fn lines(&self, node: NodeIndex) -> (u32, u32) {
        self.file().node_lines(node).unwrap_or((0, 0))
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("namespace", &self.block.name())
            .field("class", &self.class.as_ref().map(|class| class.name.as_str()))
            .field("function", &self.function)
            .finish()
    }
}

// =============================================================================
// Classes
// =============================================================================

#[derive(Default)]
pub(crate) struct ClassMembers {
    pub(crate) methods: IndexMap<NameKey, Rc<MethodDescriptor>>,
    pub(crate) properties: IndexMap<NameKey, Rc<PropertyDescriptor>>,
    pub(crate) constants: IndexMap<NameKey, Rc<ConstantDescriptor>>,
}

pub struct ClassDescriptor {
    pub(crate) name: String,
    pub(crate) kind: ClassLikeKind,
    pub(crate) declared_modifiers: ClassModifiers,
    pub(crate) parent: Option<String>,
    /// `implements` for classes and enums, `extends` for interfaces.
    pub(crate) interfaces: Vec<String>,
    pub(crate) traits: Vec<String>,
    pub(crate) backing_type: Option<ReflectionType>,
    pub(crate) node: NodeIndex,
    pub(crate) lines: (u32, u32),
    pub(crate) doc_comment: Option<String>,
    pub(crate) scope: Rc<Scope>,
    members: OnceCell<ClassMembers>,
}

impl ClassDescriptor {
    pub(crate) fn new(block: &NamespaceBlock, entry: &ClassEntry) -> Option<ClassDescriptor> {
        let file = block.file();
        let arena = file.arena();
        let class = arena.get_class_like(entry.node)?;
        let resolver = NameResolver::new(block.name(), &block.entities().imports);
        let resolve = |name: &String| resolver.resolve_class(name);

        let (parent, interfaces) = match class.kind {
            ClassLikeKind::Interface => (None, class.extends.iter().map(resolve).collect()),
            _ => (
                class.extends.first().map(resolve),
                class.implements.iter().map(resolve).collect(),
            ),
        };
        let traits = class
            .members
            .iter()
            .filter_map(|member| match arena.get(member) {
                Some(Node::TraitUse(trait_use)) => Some(trait_use.traits.iter().map(resolve)),
                _ => None,
            })
            .flatten()
            .collect();

        let scope = Rc::new(Scope {
            block: block.clone(),
            class: Some(ClassScope {
                name: entry.name.clone(),
                kind: class.kind,
                parent: parent.clone(),
            }),
            function: None,
        });

        Some(ClassDescriptor {
            name: entry.name.clone(),
            kind: class.kind,
            declared_modifiers: declared_class_modifiers(class),
            parent,
            interfaces,
            traits,
            backing_type: ReflectionType::from_node(arena, class.backing_type, &resolver),
            node: entry.node,
            lines: file.node_lines(entry.node).unwrap_or((0, 0)),
            doc_comment: class.doc_comment.clone(),
            scope,
            members: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassLikeKind {
        self.kind
    }

    /// Parent, interfaces and traits, in lookup order.
    pub(crate) fn ancestor_names(&self) -> impl Iterator<Item = (&str, AncestorEdge)> {
        self.parent
            .iter()
            .map(|name| (name.as_str(), AncestorEdge::Parent))
            .chain(
                self.interfaces
                    .iter()
                    .map(|name| (name.as_str(), AncestorEdge::Interface)),
            )
            .chain(self.traits.iter().map(|name| (name.as_str(), AncestorEdge::Trait)))
    }

    pub(crate) fn members(&self) -> &ClassMembers {
        self.members.get_or_init(|| self.build_members())
    }

    fn build_members(&self) -> ClassMembers {
        let mut members = ClassMembers::default();
        let arena = self.scope.arena();
        let Some(class) = arena.get_class_like(self.node) else {
            return members;
        };
        let readonly_class = self.declared_modifiers.contains(ClassModifiers::IS_READONLY);

        for member in class.members.iter() {
            match arena.get(member) {
                Some(Node::Method(function)) => {
                    let method = MethodDescriptor::new(self, member, function);
                    if method.function.name.eq_ignore_ascii_case("__construct") {
                        self.add_promoted_properties(&mut members, function, readonly_class);
                    }
                    let key = NameKey::folded(&function.name);
                    if members.methods.contains_key(&key) {
                        debug!(class = %self.name, method = %function.name, "ignoring redeclared method");
                        continue;
                    }
                    members.methods.insert(key, Rc::new(method));
                }
                Some(Node::Property(group)) => {
                    let modifiers = PropertyModifiers::from_syntax(group.modifiers, readonly_class);
                    let type_ =
                        ReflectionType::from_node(arena, group.type_node, &self.scope.resolver());
                    for declarator in group.declarators.iter() {
                        let Some(Node::PropertyDeclarator(decl)) = arena.get(declarator) else {
                            continue;
                        };
                        members
                            .properties
                            .entry(NameKey::exact(&decl.name))
                            .or_insert_with(|| {
                                Rc::new(PropertyDescriptor {
                                    name: decl.name.clone(),
                                    class: self.name.clone(),
                                    modifiers,
                                    type_: type_.clone(),
                                    default: decl.default,
                                    promoted: false,
                                    doc_comment: group.doc_comment.clone(),
                                    lines: self.scope.lines(declarator),
                                    scope: Rc::clone(&self.scope),
                                })
                            });
                    }
                }
                Some(Node::ClassConst(group)) => {
                    let modifiers = ConstantModifiers::from_syntax(group.modifiers);
                    let type_ =
                        ReflectionType::from_node(arena, group.type_node, &self.scope.resolver());
                    for declarator in group.declarators.iter() {
                        let Some(Node::ConstDeclarator(decl)) = arena.get(declarator) else {
                            continue;
                        };
                        members
                            .constants
                            .entry(NameKey::exact(&decl.name))
                            .or_insert_with(|| {
                                Rc::new(ConstantDescriptor {
                                    name: decl.name.clone(),
                                    owner: ConstantOwner::Class(self.name.clone()),
                                    expr: decl.value,
                                    modifiers,
                                    type_: type_.clone(),
                                    enum_case: false,
                                    doc_comment: group.doc_comment.clone(),
                                    lines: self.scope.lines(declarator),
                                    scope: Rc::clone(&self.scope),
                                    state: RefCell::new(ResolutionState::Unresolved),
                                })
                            });
                    }
                }
                Some(Node::EnumCase(case)) => {
                    members
                        .constants
                        .entry(NameKey::exact(&case.name))
                        .or_insert_with(|| {
                            Rc::new(ConstantDescriptor {
                                name: case.name.clone(),
                                owner: ConstantOwner::Class(self.name.clone()),
                                expr: case.value,
                                modifiers: ConstantModifiers::IS_PUBLIC,
                                type_: None,
                                enum_case: true,
                                doc_comment: case.doc_comment.clone(),
                                lines: self.scope.lines(member),
                                scope: Rc::clone(&self.scope),
                                state: RefCell::new(ResolutionState::Unresolved),
                            })
                        });
                }
                _ => {}
            }
        }

        debug!(
            class = %self.name,
            methods = members.methods.len(),
            properties = members.properties.len(),
            constants = members.constants.len(),
            "built class members"
        );
        members
    }

    fn add_promoted_properties(
        &self,
        members: &mut ClassMembers,
        constructor: &FunctionData,
        readonly_class: bool,
    ) {
        let arena = self.scope.arena();
        for param_idx in constructor.parameters.iter() {
            let Some(param) = arena.get_parameter(param_idx) else {
                continue;
            };
            if !param.is_promoted() {
                continue;
            }
            members
                .properties
                .entry(NameKey::exact(&param.name))
                .or_insert_with(|| {
                    Rc::new(PropertyDescriptor {
                        name: param.name.clone(),
                        class: self.name.clone(),
                        modifiers: PropertyModifiers::from_syntax(param.modifiers, readonly_class),
                        type_: ReflectionType::from_node(
                            arena,
                            param.type_node,
                            &self.scope.resolver(),
                        ),
                        default: NodeIndex::NONE,
                        promoted: true,
                        doc_comment: param.doc_comment.clone(),
                        lines: self.scope.lines(param_idx),
                        scope: Rc::clone(&self.scope),
                    })
                });
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("modifiers", &self.declared_modifiers)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("traits", &self.traits)
            .finish_non_exhaustive()
    }
}

/// How an ancestor is reached from a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AncestorEdge {
    Parent,
    Interface,
    Trait,
}

fn declared_class_modifiers(class: &ClassLikeData) -> ClassModifiers {
    let mut modifiers = ClassModifiers::empty();
    if class.modifiers & modifier_flags::ABSTRACT != 0 {
        modifiers |= ClassModifiers::IS_EXPLICIT_ABSTRACT;
    }
    if class.modifiers & modifier_flags::FINAL != 0 || class.kind == ClassLikeKind::Enum {
        modifiers |= ClassModifiers::IS_FINAL;
    }
    if class.modifiers & modifier_flags::READONLY != 0 {
        modifiers |= ClassModifiers::IS_READONLY;
    }
    modifiers
}

// =============================================================================
// Functions and methods
// =============================================================================

pub struct FunctionLikeDescriptor {
    /// Fully-qualified for functions, as declared for methods.
    pub(crate) name: String,
    pub(crate) node: NodeIndex,
    pub(crate) parameters: Vec<Rc<ParameterDescriptor>>,
    pub(crate) return_type: Option<ReflectionType>,
    pub(crate) returns_ref: bool,
    pub(crate) is_generator: bool,
    pub(crate) static_variables: Vec<StaticVar>,
    pub(crate) doc_comment: Option<String>,
    pub(crate) lines: (u32, u32),
    pub(crate) scope: Rc<Scope>,
}

impl FunctionLikeDescriptor {
    fn new(
        name: String,
        display_name: String,
        node: NodeIndex,
        data: &FunctionData,
        scope: Rc<Scope>,
    ) -> FunctionLikeDescriptor {
        let arena = scope.arena();
        let resolver = scope.resolver();
        let mut parameters: Vec<ParameterDescriptor> = data
            .parameters
            .iter()
            .filter_map(|param_idx| arena.get_parameter(param_idx))
            .enumerate()
            .map(|(position, param)| ParameterDescriptor::new(&display_name, position, param, &scope))
            .collect();
        // A default only makes a parameter optional when every later one is
        // optional too.
        let mut tail_optional = true;
        for param in parameters.iter_mut().rev() {
            param.optional = param.variadic || (tail_optional && param.default.is_some());
            tail_optional = param.optional;
        }
        let parameters = parameters.into_iter().map(Rc::new).collect();

        FunctionLikeDescriptor {
            return_type: ReflectionType::from_node(arena, data.return_type, &resolver),
            lines: scope.lines(node),
            name,
            node,
            parameters,
            returns_ref: data.returns_ref,
            is_generator: data.is_generator,
            static_variables: data.static_vars.clone(),
            doc_comment: data.doc_comment.clone(),
            scope,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub type FunctionDescriptor = FunctionLikeDescriptor;

impl FunctionDescriptor {
    pub(crate) fn from_entry(block: &NamespaceBlock, entry: &FunctionEntry) -> Option<FunctionDescriptor> {
        let data = block.file().arena().get_function_like(entry.node)?;
        let scope = Scope::namespace(block).with_function(&entry.name);
        Some(FunctionLikeDescriptor::new(
            entry.name.clone(),
            format!("{}()", entry.name),
            entry.node,
            data,
            scope,
        ))
    }
}

pub struct MethodDescriptor {
    pub(crate) function: FunctionLikeDescriptor,
    /// Declaring class.
    pub(crate) class: String,
    pub(crate) modifiers: MethodModifiers,
}

impl MethodDescriptor {
    fn new(class: &ClassDescriptor, node: NodeIndex, data: &FunctionData) -> MethodDescriptor {
        let scope = class.scope.with_function(&data.name);
        MethodDescriptor {
            function: FunctionLikeDescriptor::new(
                data.name.clone(),
                format!("{}::{}()", class.name, data.name),
                node,
                data,
                scope,
            ),
            class: class.name.clone(),
            modifiers: MethodModifiers::from_syntax(
                data.modifiers,
                class.kind == ClassLikeKind::Interface,
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

pub struct ParameterDescriptor {
    pub(crate) name: String,
    pub(crate) position: usize,
    /// `f()` or `A::m()`, for messages.
    pub(crate) function: String,
    pub(crate) type_: Option<ReflectionType>,
    pub(crate) default: NodeIndex,
    pub(crate) by_ref: bool,
    pub(crate) variadic: bool,
    pub(crate) optional: bool,
    pub(crate) promoted: Option<PropertyModifiers>,
    pub(crate) scope: Rc<Scope>,
}

impl ParameterDescriptor {
    fn new(
        function: &str,
        position: usize,
        data: &ParameterData,
        scope: &Rc<Scope>,
    ) -> ParameterDescriptor {
        ParameterDescriptor {
            name: data.name.clone(),
            position,
            function: function.to_string(),
            type_: ReflectionType::from_node(scope.arena(), data.type_node, &scope.resolver()),
            default: data.default,
            by_ref: data.by_ref,
            variadic: data.variadic,
            optional: false,
            promoted: data
                .is_promoted()
                .then(|| PropertyModifiers::from_syntax(data.modifiers, false)),
            scope: Rc::clone(scope),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// Properties and constants
// =============================================================================

pub struct PropertyDescriptor {
    pub(crate) name: String,
    /// Declaring class.
    pub(crate) class: String,
    pub(crate) modifiers: PropertyModifiers,
    pub(crate) type_: Option<ReflectionType>,
    pub(crate) default: NodeIndex,
    pub(crate) promoted: bool,
    pub(crate) doc_comment: Option<String>,
    pub(crate) lines: (u32, u32),
    pub(crate) scope: Rc<Scope>,
}

impl PropertyDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Where a constant is declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstantOwner {
    Namespace,
    Class(String),
}

/// Lifecycle of a constant's value:
/// `Unresolved -> Resolving -> Resolved | Failed`. The one exception is a
/// constant resolved on behalf of another one when a depth bound cut the
/// outer query short: it goes back to `Unresolved`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    Resolving,
    Resolved(ConstValue),
    Failed(ReflectionError),
}

pub struct ConstantDescriptor {
    /// Fully-qualified for namespace constants, short for class constants.
    pub(crate) name: String,
    pub(crate) owner: ConstantOwner,
    /// Initializer; the backing value for enum cases (NONE when pure).
    pub(crate) expr: NodeIndex,
    pub(crate) modifiers: ConstantModifiers,
    pub(crate) type_: Option<ReflectionType>,
    pub(crate) enum_case: bool,
    pub(crate) doc_comment: Option<String>,
    pub(crate) lines: (u32, u32),
    pub(crate) scope: Rc<Scope>,
    pub(crate) state: RefCell<ResolutionState>,
}

impl ConstantDescriptor {
    pub(crate) fn from_entry(block: &NamespaceBlock, entry: &ConstantEntry) -> ConstantDescriptor {
        let scope = Scope::namespace(block);
        ConstantDescriptor {
            name: entry.name.clone(),
            owner: ConstantOwner::Namespace,
            expr: entry.value,
            modifiers: ConstantModifiers::IS_PUBLIC,
            type_: None,
            enum_case: false,
            doc_comment: entry.doc_comment.clone(),
            lines: scope.lines(entry.node),
            scope,
            state: RefCell::new(ResolutionState::Unresolved),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Class::NAME` or the fully-qualified constant name.
    pub fn identity(&self) -> String {
        match &self.owner {
            ConstantOwner::Namespace => self.name.clone(),
            ConstantOwner::Class(class) => format!("{class}::{}", self.name),
        }
    }

    /// Snapshot of the resolution state.
    pub fn state(&self) -> ResolutionState {
        self.state.borrow().clone()
    }

    pub(crate) fn short_name(&self) -> &str {
        split_namespace(&self.name).1
    }
}

impl fmt::Debug for ConstantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantDescriptor")
            .field("identity", &self.identity())
            .field("modifiers", &self.modifiers)
            .field("enum_case", &self.enum_case)
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}
