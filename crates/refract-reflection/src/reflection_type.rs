//! Declared types of parameters, properties, constants and return values.

use refract_binder::{NameResolver, is_special_class_name};
use refract_parser::{Node, NodeArena, NodeIndex};
use std::fmt;

const BUILTIN_TYPES: &[&str] = &[
    "int", "float", "string", "bool", "array", "callable", "iterable", "object", "mixed", "void",
    "null", "never", "false", "true", "static",
];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReflectionType {
    /// A builtin type (lowercased) or a resolved class name. `self` and
    /// `parent` are kept as written.
    Named { name: String, builtin: bool },
    /// `?T`
    Nullable(Box<ReflectionType>),
    /// `A|B`; members may be intersections (DNF).
    Union(Vec<ReflectionType>),
    /// `A&B`
    Intersection(Vec<ReflectionType>),
}

impl ReflectionType {
    /// Build from a type node, resolving class names in the declaring
    /// namespace. `None` for an absent or malformed node.
    pub(crate) fn from_node(
        arena: &NodeArena,
        node: NodeIndex,
        resolver: &NameResolver<'_>,
    ) -> Option<ReflectionType> {
        match arena.get(node)? {
            Node::NamedType(named) => {
                let lower = named.name.to_ascii_lowercase();
                if BUILTIN_TYPES.contains(&lower.as_str()) {
                    return Some(ReflectionType::Named {
                        name: lower,
                        builtin: true,
                    });
                }
                if is_special_class_name(&named.name) {
                    return Some(ReflectionType::Named {
                        name: lower,
                        builtin: false,
                    });
                }
                Some(ReflectionType::Named {
                    name: resolver.resolve_class(&named.name),
                    builtin: false,
                })
            }
            Node::NullableType(nullable) => Some(ReflectionType::Nullable(Box::new(
                ReflectionType::from_node(arena, nullable.inner, resolver)?,
            ))),
            Node::UnionType(composite) => composite
                .types
                .iter()
                .map(|member| ReflectionType::from_node(arena, member, resolver))
                .collect::<Option<Vec<_>>>()
                .map(ReflectionType::Union),
            Node::IntersectionType(composite) => composite
                .types
                .iter()
                .map(|member| ReflectionType::from_node(arena, member, resolver))
                .collect::<Option<Vec<_>>>()
                .map(ReflectionType::Intersection),
            _ => None,
        }
    }

    /// Name of a named type (`int`, `App\User`); `None` for composites.
    pub fn name(&self) -> Option<&str> {
        match self {
            ReflectionType::Named { name, .. } => Some(name),
            ReflectionType::Nullable(inner) => inner.name(),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        match self {
            ReflectionType::Named { builtin, .. } => *builtin,
            ReflectionType::Nullable(inner) => inner.is_builtin(),
            _ => false,
        }
    }

    pub fn allows_null(&self) -> bool {
        match self {
            ReflectionType::Named { name, .. } => name == "null" || name == "mixed",
            ReflectionType::Nullable(_) => true,
            ReflectionType::Union(members) => members.iter().any(ReflectionType::allows_null),
            ReflectionType::Intersection(_) => false,
        }
    }

    /// Members of a union or intersection; empty for named types.
    pub fn types(&self) -> &[ReflectionType] {
        match self {
            ReflectionType::Union(members) | ReflectionType::Intersection(members) => members,
            _ => &[],
        }
    }
}

impl fmt::Display for ReflectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectionType::Named { name, .. } => f.write_str(name),
            ReflectionType::Nullable(inner) => write!(f, "?{inner}"),
            ReflectionType::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    match member {
                        ReflectionType::Intersection(_) => write!(f, "({member})")?,
                        _ => write!(f, "{member}")?,
                    }
                }
                Ok(())
            }
            ReflectionType::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("&")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}
