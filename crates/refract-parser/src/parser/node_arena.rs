//! Node arena for AST storage.

use super::base::{NodeIndex, NodeList, TextRange};
use super::node::{
    ClassLikeData, FunctionData, NamespaceData, Node, ParameterData, SourceFileData,
};
use serde::Serialize;

/// Arena-based storage for AST nodes.
/// Nodes are stored contiguously and referenced by index; each node's
/// source range is stored alongside it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
    ranges: Vec<TextRange>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            ranges: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena and return its index
    pub fn add(&mut self, node: Node, pos: u32, end: u32) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        self.ranges.push(TextRange::new(pos, end));
        NodeIndex(index)
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable node by index
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Source range of a node
    pub fn range(&self, index: NodeIndex) -> Option<TextRange> {
        if index.is_none() {
            None
        } else {
            self.ranges.get(index.0 as usize).copied()
        }
    }

    /// Update the end offset of a node once its last child is parsed
    pub fn set_end(&mut self, index: NodeIndex, end: u32) {
        if let Some(range) = index
            .into_option()
            .and_then(|idx| self.ranges.get_mut(idx.0 as usize))
        {
            range.end = end;
        }
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    pub fn get_source_file(&self, index: NodeIndex) -> Option<&SourceFileData> {
        match self.get(index)? {
            Node::SourceFile(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_namespace(&self, index: NodeIndex) -> Option<&NamespaceData> {
        match self.get(index)? {
            Node::Namespace(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_class_like(&self, index: NodeIndex) -> Option<&ClassLikeData> {
        match self.get(index)? {
            Node::ClassLike(data) => Some(data),
            _ => None,
        }
    }

    /// Function or method data.
    pub fn get_function_like(&self, index: NodeIndex) -> Option<&FunctionData> {
        match self.get(index)? {
            Node::Function(data) | Node::Method(data) => Some(data),
            _ => None,
        }
    }

    pub fn get_parameter(&self, index: NodeIndex) -> Option<&ParameterData> {
        match self.get(index)? {
            Node::Parameter(data) => Some(data),
            _ => None,
        }
    }

    /// Direct children of a node in source order.
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.get(index) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut push = |idx: NodeIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };
        let push_list = |list: &NodeList, push: &mut dyn FnMut(NodeIndex)| {
            for idx in list.iter() {
                push(idx);
            }
        };

        match node {
            Node::SourceFile(d) => push_list(&d.statements, &mut push),
            Node::Namespace(d) => push_list(&d.statements, &mut push),
            Node::ClassLike(d) => {
                push(d.backing_type);
                push_list(&d.members, &mut push);
            }
            Node::ClassConst(d) => {
                push(d.type_node);
                push_list(&d.declarators, &mut push);
            }
            Node::ConstDeclarator(d) => push(d.value),
            Node::Property(d) => {
                push(d.type_node);
                push_list(&d.declarators, &mut push);
            }
            Node::PropertyDeclarator(d) => push(d.default),
            Node::Method(d) | Node::Function(d) => {
                push_list(&d.parameters, &mut push);
                push(d.return_type);
                for var in &d.static_vars {
                    push(var.initializer);
                }
            }
            Node::Parameter(d) => {
                push(d.type_node);
                push(d.default);
            }
            Node::EnumCase(d) => push(d.value),
            Node::ConstStatement(d) => push_list(&d.declarators, &mut push),
            Node::ExpressionStatement(d) => push(d.expression),
            Node::NullableType(d) => push(d.inner),
            Node::UnionType(d) | Node::IntersectionType(d) => push_list(&d.types, &mut push),
            Node::ArrayLiteral(d) => push_list(&d.items, &mut push),
            Node::ArrayItem(d) => {
                push(d.key);
                push(d.value);
            }
            Node::Unary(d) | Node::PostfixUnary(d) => push(d.operand),
            Node::Binary(d) => {
                push(d.left);
                push(d.right);
            }
            Node::Ternary(d) => {
                push(d.condition);
                push(d.when_true);
                push(d.when_false);
            }
            Node::Assign(d) => {
                push(d.target);
                push(d.value);
            }
            Node::ClassConstFetch(d) => push(d.class),
            Node::Argument(d) => push(d.value),
            Node::Call(d) => {
                push(d.callee);
                push_list(&d.arguments, &mut push);
            }
            Node::New(d) => {
                push(d.class);
                push_list(&d.arguments, &mut push);
            }
            Node::PropertyFetch(d) => {
                push(d.object);
                push(d.name);
            }
            Node::StaticPropertyFetch(d) => push(d.class),
            Node::MethodCall(d) => {
                push(d.object);
                push(d.name);
                push_list(&d.arguments, &mut push);
            }
            Node::StaticCall(d) => {
                push(d.class);
                push(d.name);
                push_list(&d.arguments, &mut push);
            }
            Node::DimFetch(d) => {
                push(d.object);
                push(d.dim);
            }
            Node::Cast(d) => push(d.operand),
            Node::Closure(d) => {
                push_list(&d.parameters, &mut push);
                push(d.return_type);
            }
            Node::Match(d) => {
                push(d.subject);
                push_list(&d.arms, &mut push);
            }
            Node::MatchArm(d) => {
                push_list(&d.conditions, &mut push);
                push(d.body);
            }
            Node::KeywordExpression(d) => {
                push(d.key);
                push(d.operand);
            }
            Node::Use(_)
            | Node::TraitUse(_)
            | Node::Opaque(_)
            | Node::NamedType(_)
            | Node::IntLiteral(_)
            | Node::FloatLiteral(_)
            | Node::StringLiteral(_)
            | Node::InterpolatedString(_)
            | Node::Name(_)
            | Node::ConstFetch(_)
            | Node::MagicConst(_)
            | Node::Variable(_)
            | Node::Missing => {}
        }
        out
    }
}
