//! Name resolution against a namespace and its `use` imports.
//!
//! Follows PHP's rules:
//! - `\A\B` is already fully qualified
//! - `namespace\A` is relative to the current namespace
//! - `A\B` expands its first segment through a class import, otherwise it
//!   is prefixed with the current namespace
//! - an unqualified class name goes through class imports, then the current
//!   namespace; unqualified function and constant names go through their own
//!   import tables, then the current namespace, then the global namespace

use refract_common::names::{NameKey, NameKind, QualifiedName, join_namespace};
use refract_parser::{UseItem, UseKind};
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

/// `use` imports of one namespace block, one table per import kind.
#[derive(Clone, Debug, Default)]
pub struct ImportTable {
    classes: FxHashMap<NameKey, String>,
    functions: FxHashMap<NameKey, String>,
    constants: FxHashMap<NameKey, String>,
}

impl ImportTable {
    /// Register an import. Returns false if the alias is already bound in
    /// the same table (the first binding is kept).
    pub fn add(&mut self, item: &UseItem) -> bool {
        let alias = item.local_name();
        let (table, key) = match item.kind {
            UseKind::Class => (&mut self.classes, NameKey::folded(alias)),
            UseKind::Function => (&mut self.functions, NameKey::folded(alias)),
            // Constant aliases are case-sensitive
            UseKind::Constant => (&mut self.constants, NameKey::exact(alias)),
        };
        if table.contains_key(&key) {
            return false;
        }
        table.insert(key, item.name.clone());
        true
    }

    pub fn class(&self, alias: &str) -> Option<&str> {
        self.classes.get(&NameKey::folded(alias)).map(String::as_str)
    }

    pub fn function(&self, alias: &str) -> Option<&str> {
        self.functions.get(&NameKey::folded(alias)).map(String::as_str)
    }

    pub fn constant(&self, alias: &str) -> Option<&str> {
        self.constants.get(&NameKey::exact(alias)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.functions.len() + self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves names written in one namespace block.
#[derive(Clone, Copy, Debug)]
pub struct NameResolver<'a> {
    namespace: &'a str,
    imports: &'a ImportTable,
}

/// Names with special meaning in class position.
pub fn is_special_class_name(name: &str) -> bool {
    ["self", "parent", "static"]
        .iter()
        .any(|special| name.eq_ignore_ascii_case(special))
}

impl<'a> NameResolver<'a> {
    pub fn new(namespace: &'a str, imports: &'a ImportTable) -> NameResolver<'a> {
        NameResolver { namespace, imports }
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    /// Fully-qualified class name (no leading separator). `self`, `parent`
    /// and `static` are returned unchanged for the caller to handle.
    pub fn resolve_class(&self, name: &str) -> String {
        if is_special_class_name(name) {
            return name.to_string();
        }
        let qualified = QualifiedName::parse(name);
        match qualified.kind {
            NameKind::FullyQualified => qualified.joined(),
            NameKind::Relative => join_namespace(self.namespace, &qualified.joined()),
            NameKind::Qualified => match self.imports.class(qualified.first()) {
                Some(target) => format!("{target}\\{}", qualified.tail()),
                None => join_namespace(self.namespace, &qualified.joined()),
            },
            NameKind::Unqualified => match self.imports.class(qualified.first()) {
                Some(target) => target.to_string(),
                None => join_namespace(self.namespace, &qualified.joined()),
            },
        }
    }

    /// Candidate fully-qualified function names, in lookup order.
    pub fn resolve_function(&self, name: &str) -> SmallVec<[String; 2]> {
        self.resolve_with_fallback(name, self.imports.function(name))
    }

    /// Candidate fully-qualified constant names, in lookup order.
    pub fn resolve_constant(&self, name: &str) -> SmallVec<[String; 2]> {
        self.resolve_with_fallback(name, self.imports.constant(name))
    }

    fn resolve_with_fallback(&self, name: &str, imported: Option<&str>) -> SmallVec<[String; 2]> {
        let qualified = QualifiedName::parse(name);
        match qualified.kind {
            NameKind::FullyQualified => smallvec![qualified.joined()],
            NameKind::Relative => smallvec![join_namespace(self.namespace, &qualified.joined())],
            NameKind::Qualified => match self.imports.class(qualified.first()) {
                Some(target) => smallvec![format!("{target}\\{}", qualified.tail())],
                None => smallvec![join_namespace(self.namespace, &qualified.joined())],
            },
            NameKind::Unqualified => {
                if let Some(target) = imported {
                    return smallvec![target.to_string()];
                }
                let local = join_namespace(self.namespace, name);
                if self.namespace.is_empty() {
                    smallvec![local]
                } else {
                    smallvec![local, name.to_string()]
                }
            }
        }
    }
}
