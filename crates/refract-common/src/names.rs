//! PHP name helpers.
//!
//! Case-sensitivity policy used everywhere in refract:
//! - class-like, function, method and namespace names are case-insensitive
//! - constant names (global and class), property and variable names are
//!   case-sensitive; the namespace part of a namespaced constant is not
//!
//! Lookup tables are keyed by [`NameKey`], which applies that policy once at
//! key construction so no lookup site has to remember it.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Namespace separator.
pub const NS_SEPARATOR: char = '\\';

/// How a name was written in source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NameKind {
    /// `Foo`
    Unqualified,
    /// `Foo\Bar`
    Qualified,
    /// `\Foo\Bar`
    FullyQualified,
    /// `namespace\Foo`
    Relative,
}

/// A possibly-qualified PHP name split into segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedName {
    pub kind: NameKind,
    pub parts: SmallVec<[String; 4]>,
}

impl QualifiedName {
    /// Parse a name as written in source (`\A\B`, `A\B`, `namespace\A`, `A`).
    pub fn parse(text: &str) -> QualifiedName {
        let (kind, rest) = if let Some(rest) = text.strip_prefix(NS_SEPARATOR) {
            (NameKind::FullyQualified, rest)
        } else if text
            .get(..10)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("namespace\\"))
        {
            (NameKind::Relative, &text[10..])
        } else if text.contains(NS_SEPARATOR) {
            (NameKind::Qualified, text)
        } else {
            (NameKind::Unqualified, text)
        };

        let parts = rest
            .split(NS_SEPARATOR)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        QualifiedName { kind, parts }
    }

    /// Build a fully-qualified name from a namespace and a short name.
    pub fn fully_qualified(namespace: &str, short: &str) -> QualifiedName {
        let mut parts: SmallVec<[String; 4]> = namespace
            .split(NS_SEPARATOR)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        parts.push(short.to_string());
        QualifiedName {
            kind: NameKind::FullyQualified,
            parts,
        }
    }

    pub fn first(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }

    pub fn last(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_unqualified(&self) -> bool {
        self.kind == NameKind::Unqualified
    }

    /// Segments joined with `\`, without a leading separator.
    pub fn joined(&self) -> String {
        self.parts.join("\\")
    }

    /// Segments after the first one, joined with `\`.
    pub fn tail(&self) -> String {
        self.parts[1.min(self.parts.len())..].join("\\")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NameKind::FullyQualified => write!(f, "\\{}", self.joined()),
            NameKind::Relative => write!(f, "namespace\\{}", self.joined()),
            _ => f.write_str(&self.joined()),
        }
    }
}

/// Strip a single leading `\` from a name.
pub fn strip_leading_separator(name: &str) -> &str {
    name.strip_prefix(NS_SEPARATOR).unwrap_or(name)
}

/// Join a namespace and a short name into a fully-qualified name (no
/// leading separator). The global namespace is the empty string.
pub fn join_namespace(namespace: &str, short: &str) -> String {
    if namespace.is_empty() {
        short.to_string()
    } else {
        format!("{namespace}\\{short}")
    }
}

/// Split a fully-qualified name into `(namespace, short_name)`.
pub fn split_namespace(fq_name: &str) -> (&str, &str) {
    let name = strip_leading_separator(fq_name);
    match name.rfind(NS_SEPARATOR) {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => ("", name),
    }
}

/// Lookup key applying the case-sensitivity policy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NameKey(String);

impl NameKey {
    /// Key for case-insensitive names: classes, interfaces, traits, enums,
    /// functions, methods and namespaces.
    pub fn folded(name: &str) -> NameKey {
        NameKey(strip_leading_separator(name).to_ascii_lowercase())
    }

    /// Key for case-sensitive names: class constants, properties,
    /// parameters.
    pub fn exact(name: &str) -> NameKey {
        NameKey(name.to_string())
    }

    /// Key for namespaced constants: the namespace is case-insensitive,
    /// the short name is not.
    pub fn constant(fq_name: &str) -> NameKey {
        let (namespace, short) = split_namespace(fq_name);
        if namespace.is_empty() {
            NameKey(short.to_string())
        } else {
            NameKey(format!("{}\\{}", namespace.to_ascii_lowercase(), short))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
