//! Namespace entity discovery.
//!
//! One pass over a namespace block's top-level statements collecting
//! class-likes, functions, `const` groups, `define()` calls and `use`
//! imports. Nested blocks and function bodies are never entered. An entity
//! that cannot be registered is logged and recorded in
//! [`NamespaceEntities::skipped`]; its siblings are unaffected.

use crate::resolver::ImportTable;
use crate::source_file::SourceFile;
use indexmap::IndexMap;
use refract_common::names::{NameKey, join_namespace, strip_leading_separator};
use refract_parser::{ClassLikeKind, Node, NodeArena, NodeIndex};
use refract_scanner::SyntaxKind;
use tracing::{debug, warn};

/// A class, interface, trait or enum declared in a namespace block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    /// Fully-qualified name without leading separator.
    pub name: String,
    pub kind: ClassLikeKind,
    pub node: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: String,
    pub node: NodeIndex,
}

/// How a namespace-level constant was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstantOrigin {
    /// `const NAME = expr;`
    Const,
    /// `define('NAME', expr);`
    Define,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantEntry {
    /// Fully-qualified name without leading separator.
    pub name: String,
    /// Value expression.
    pub value: NodeIndex,
    /// The declarator or the `define` call.
    pub node: NodeIndex,
    pub origin: ConstantOrigin,
    pub doc_comment: Option<String>,
}

/// An entity discovery could not register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntity {
    pub node: NodeIndex,
    pub name: Option<String>,
    pub line: u32,
    pub reason: String,
}

/// Result of discovery over one namespace block.
#[derive(Clone, Debug, Default)]
pub struct NamespaceEntities {
    pub namespace: String,
    /// Keyed case-insensitively by fully-qualified name.
    pub classes: IndexMap<NameKey, ClassEntry>,
    /// Keyed case-insensitively by fully-qualified name.
    pub functions: IndexMap<NameKey, FunctionEntry>,
    /// Keyed by [`NameKey::constant`].
    pub constants: IndexMap<NameKey, ConstantEntry>,
    pub imports: ImportTable,
    pub skipped: Vec<SkippedEntity>,
}

impl NamespaceEntities {
    pub fn class(&self, fq_name: &str) -> Option<&ClassEntry> {
        self.classes.get(&NameKey::folded(fq_name))
    }

    pub fn function(&self, fq_name: &str) -> Option<&FunctionEntry> {
        self.functions.get(&NameKey::folded(fq_name))
    }

    pub fn constant(&self, fq_name: &str) -> Option<&ConstantEntry> {
        self.constants.get(&NameKey::constant(fq_name))
    }
}

struct Discovery<'a> {
    file: &'a SourceFile,
    arena: &'a NodeArena,
    entities: NamespaceEntities,
}

/// Collect the entities declared at the top level of a namespace block.
pub(crate) fn discover_entities(
    file: &SourceFile,
    namespace: &str,
    statements: &[NodeIndex],
) -> NamespaceEntities {
    let mut discovery = Discovery {
        file,
        arena: file.arena(),
        entities: NamespaceEntities {
            namespace: namespace.to_string(),
            ..NamespaceEntities::default()
        },
    };

    for &stmt in statements {
        discovery.visit_statement(stmt);
    }

    let entities = discovery.entities;
    debug!(
        path = %file.path().display(),
        namespace,
        classes = entities.classes.len(),
        functions = entities.functions.len(),
        constants = entities.constants.len(),
        skipped = entities.skipped.len(),
        "discovered namespace entities"
    );
    entities
}

impl Discovery<'_> {
    fn visit_statement(&mut self, stmt: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(stmt) else {
            return;
        };
        match node {
            Node::ClassLike(class) => {
                if class.name.is_empty() {
                    self.skip(stmt, None, "class-like declaration without a name");
                    return;
                }
                let name = join_namespace(&self.entities.namespace, &class.name);
                let key = NameKey::folded(&name);
                if self.entities.classes.contains_key(&key) {
                    self.skip(stmt, Some(name), "duplicate class-like declaration");
                    return;
                }
                self.entities.classes.insert(
                    key,
                    ClassEntry {
                        name,
                        kind: class.kind,
                        node: stmt,
                    },
                );
            }
            Node::Function(function) => {
                if function.name.is_empty() {
                    self.skip(stmt, None, "function declaration without a name");
                    return;
                }
                let name = join_namespace(&self.entities.namespace, &function.name);
                let key = NameKey::folded(&name);
                if self.entities.functions.contains_key(&key) {
                    self.skip(stmt, Some(name), "duplicate function declaration");
                    return;
                }
                self.entities
                    .functions
                    .insert(key, FunctionEntry { name, node: stmt });
            }
            Node::ConstStatement(group) => {
                for declarator in group.declarators.iter() {
                    let Some(Node::ConstDeclarator(decl)) = arena.get(declarator) else {
                        continue;
                    };
                    let name = join_namespace(&self.entities.namespace, &decl.name);
                    self.add_constant(ConstantEntry {
                        name,
                        value: decl.value,
                        node: declarator,
                        origin: ConstantOrigin::Const,
                        doc_comment: group.doc_comment.clone(),
                    });
                }
            }
            Node::ExpressionStatement(stmt_data) => self.visit_define(stmt_data.expression),
            Node::Use(use_data) => {
                for item in &use_data.items {
                    if !self.entities.imports.add(item) {
                        let alias = item.local_name().to_string();
                        self.skip(stmt, Some(alias), "import alias is already in use");
                    }
                }
            }
            _ => {}
        }
    }

    /// `define('NAME', value)` with a statically known name.
    fn visit_define(&mut self, call_idx: NodeIndex) {
        let arena = self.arena;
        let Some(Node::Call(call)) = arena.get(call_idx) else {
            return;
        };
        let is_define = matches!(
            arena.get(call.callee),
            Some(Node::Name(name)) if strip_leading_separator(&name.name).eq_ignore_ascii_case("define")
        );
        if !is_define {
            return;
        }

        let args: Vec<NodeIndex> = call
            .arguments
            .iter()
            .filter_map(|arg| match arena.get(arg) {
                Some(Node::Argument(data)) if !data.spread => Some(data.value),
                _ => None,
            })
            .collect();
        if call.callable_syntax || !(2..=3).contains(&args.len()) {
            self.skip(call_idx, None, "define() expects a name and a value");
            return;
        }

        let Some(name) = self.static_string(args[0]) else {
            self.skip(call_idx, None, "define() name is not a static string");
            return;
        };
        let name = strip_leading_separator(&name).to_string();
        if name.is_empty() {
            self.skip(call_idx, None, "define() name is empty");
            return;
        }
        self.add_constant(ConstantEntry {
            name,
            value: args[1],
            node: call_idx,
            origin: ConstantOrigin::Define,
            doc_comment: None,
        });
    }

    fn add_constant(&mut self, entry: ConstantEntry) {
        let key = NameKey::constant(&entry.name);
        if self.entities.constants.contains_key(&key) {
            let node = entry.node;
            self.skip(node, Some(entry.name), "constant already defined");
            return;
        }
        self.entities.constants.insert(key, entry);
    }

    /// String literal, `__NAMESPACE__`, or a `.` concatenation of those.
    fn static_string(&self, idx: NodeIndex) -> Option<String> {
        match self.arena.get(idx)? {
            Node::StringLiteral(value) => String::from_utf8(value.clone()).ok(),
            Node::MagicConst(magic) if magic.kind == SyntaxKind::NamespaceMagicConst => {
                Some(self.entities.namespace.clone())
            }
            Node::Binary(binary) if binary.op == SyntaxKind::DotToken => {
                let mut left = self.static_string(binary.left)?;
                left.push_str(&self.static_string(binary.right)?);
                Some(left)
            }
            _ => None,
        }
    }

    fn skip(&mut self, node: NodeIndex, name: Option<String>, reason: &str) {
        let line = self
            .arena
            .range(node)
            .map_or(0, |range| self.file.line_of(range.pos));
        warn!(
            path = %self.file.path().display(),
            line,
            name = name.as_deref().unwrap_or("<unknown>"),
            reason,
            "skipping entity"
        );
        self.entities.skipped.push(SkippedEntity {
            node,
            name,
            line,
            reason: reason.to_string(),
        });
    }
}
