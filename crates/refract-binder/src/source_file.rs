//! Parsed source files and the namespace blocks they contain.

use crate::discovery::{NamespaceEntities, discover_entities};
use once_cell::unsync::OnceCell;
use refract_common::LineMap;
use refract_common::names::NameKey;
use refract_parser::{Node, NodeArena, NodeIndex, ParseDiagnostic, ParserState};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// Modification identity of a file at the time it was parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileIdentity {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileIdentity {
    pub fn of(path: &Path) -> FileIdentity {
        match std::fs::metadata(path) {
            Ok(meta) => FileIdentity {
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            Err(_) => FileIdentity::default(),
        }
    }
}

/// One `namespace` declaration (or the implicit global namespace of a file
/// without namespace statements).
struct NamespaceBlockData {
    name: String,
    /// The `Namespace` node, or the `SourceFile` root for the implicit block.
    node: NodeIndex,
    statements: Vec<NodeIndex>,
    entities: OnceCell<NamespaceEntities>,
}

/// An immutable parsed file.
pub struct SourceFile {
    path: PathBuf,
    identity: FileIdentity,
    text: String,
    line_map: LineMap,
    arena: NodeArena,
    root: NodeIndex,
    diagnostics: Vec<ParseDiagnostic>,
    blocks: Vec<NamespaceBlockData>,
}

impl SourceFile {
    /// Parse `text` as the contents of `path`. Syntax errors are kept in
    /// [`SourceFile::diagnostics`]; the tree is still built.
    pub fn parse(path: PathBuf, identity: FileIdentity, text: String) -> SourceFile {
        let mut parser = ParserState::new(path.to_string_lossy().into_owned(), text);
        let root = parser.parse_source_file();
        let diagnostics = parser.get_diagnostics().to_vec();
        let (arena, text) = parser.into_parts();
        let line_map = LineMap::build(&text);
        let blocks = collect_blocks(&arena, root);

        SourceFile {
            path,
            identity,
            text,
            line_map,
            arena,
            root,
            diagnostics,
            blocks,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> FileIdentity {
        self.identity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// 1-based line of a byte offset.
    pub fn line_of(&self, pos: u32) -> u32 {
        self.line_map.line_of(pos)
    }

    /// Start and end line of a node.
    pub fn node_lines(&self, node: NodeIndex) -> Option<(u32, u32)> {
        let range = self.arena.range(node)?;
        let end = range.end.saturating_sub(1).max(range.pos);
        Some((self.line_of(range.pos), self.line_of(end)))
    }

    /// Source text of a node.
    pub fn node_text(&self, node: NodeIndex) -> Option<&str> {
        let range = self.arena.range(node)?;
        self.text.get(range.pos as usize..range.end as usize)
    }

    /// Directory containing the file, as used by `__DIR__`.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Number of namespace blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// All namespace blocks in declaration order.
    pub fn namespaces(self: &Rc<Self>) -> Vec<NamespaceBlock> {
        (0..self.blocks.len())
            .map(|index| NamespaceBlock {
                file: Rc::clone(self),
                index,
            })
            .collect()
    }

    /// First block whose name matches `name` case-insensitively.
    pub fn namespace(self: &Rc<Self>, name: &str) -> Option<NamespaceBlock> {
        let key = NameKey::folded(name);
        let index = self
            .blocks
            .iter()
            .position(|block| NameKey::folded(&block.name) == key)?;
        Some(NamespaceBlock {
            file: Rc::clone(self),
            index,
        })
    }
}

impl PartialEq for SourceFile {
    /// Structural equality: same path and the same tree.
    fn eq(&self, other: &SourceFile) -> bool {
        self.path == other.path && self.text == other.text && self.arena == other.arena
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("nodes", &self.arena.len())
            .field("blocks", &self.blocks.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

/// A file without namespace statements is one global block; otherwise each
/// namespace statement is a block and top-level code outside them is
/// ignored.
fn collect_blocks(arena: &NodeArena, root: NodeIndex) -> Vec<NamespaceBlockData> {
    let Some(source) = arena.get_source_file(root) else {
        return Vec::new();
    };

    let namespaces: Vec<NamespaceBlockData> = source
        .statements
        .iter()
        .filter_map(|stmt| match arena.get(stmt) {
            Some(Node::Namespace(ns)) => Some(NamespaceBlockData {
                name: ns.name.clone(),
                node: stmt,
                statements: ns.statements.nodes.clone(),
                entities: OnceCell::new(),
            }),
            _ => None,
        })
        .collect();

    if !namespaces.is_empty() {
        return namespaces;
    }

    vec![NamespaceBlockData {
        name: String::new(),
        node: root,
        statements: source.statements.nodes.clone(),
        entities: OnceCell::new(),
    }]
}

/// Handle to one namespace block of a cached [`SourceFile`].
#[derive(Clone)]
pub struct NamespaceBlock {
    file: Rc<SourceFile>,
    index: usize,
}

impl NamespaceBlock {
    fn data(&self) -> &NamespaceBlockData {
        &self.file.blocks[self.index]
    }

    /// Namespace name without leading separator; empty for global.
    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn is_global(&self) -> bool {
        self.data().name.is_empty()
    }

    pub fn node(&self) -> NodeIndex {
        self.data().node
    }

    /// Top-level statements of the block.
    pub fn statements(&self) -> &[NodeIndex] {
        &self.data().statements
    }

    pub fn file(&self) -> &Rc<SourceFile> {
        &self.file
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.file
            .arena
            .get_namespace(self.data().node)
            .and_then(|ns| ns.doc_comment.as_deref())
    }

    /// Entities declared directly in this block. Computed once.
    pub fn entities(&self) -> &NamespaceEntities {
        let data = self.data();
        data.entities
            .get_or_init(|| discover_entities(&self.file, &data.name, &data.statements))
    }
}

impl PartialEq for NamespaceBlock {
    /// Same block of the same cached file.
    fn eq(&self, other: &NamespaceBlock) -> bool {
        Rc::ptr_eq(&self.file, &other.file) && self.index == other.index
    }
}

impl fmt::Debug for NamespaceBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceBlock")
            .field("name", &self.name())
            .field("path", &self.file.path)
            .field("index", &self.index)
            .finish()
    }
}
