//! Shared base types for the AST: node handles, node lists and text ranges.

use serde::Serialize;

/// Index of a node in a [`NodeArena`](super::NodeArena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Marker for an absent optional child.
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }

    /// `Some(self)` unless this is [`NodeIndex::NONE`].
    pub fn into_option(self) -> Option<NodeIndex> {
        self.is_some().then_some(self)
    }
}

/// Ordered list of child nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new() -> NodeList {
        NodeList { nodes: Vec::new() }
    }

    pub fn with_nodes(nodes: Vec<NodeIndex>) -> NodeList {
        NodeList { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }
}

impl Default for NodeList {
    fn default() -> Self {
        NodeList::new()
    }
}

/// Byte range `[pos, end)` in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TextRange {
    pub pos: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(pos: u32, end: u32) -> TextRange {
        TextRange { pos, end }
    }
}
