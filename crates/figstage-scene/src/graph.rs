//! Arena-backed scene graph.

use crate::node::{Figure, Node, NodeId, NodeKind};

/// A decoded figure and its subtree.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Each node's
/// child list is filled while decoding and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub(crate) fn with_root(root: Node) -> Self {
        Self { nodes: vec![root] }
    }

    /// Appends `node` as the last child of `parent`.
    pub(crate) fn attach(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        if let Some(owner) = self.nodes.get_mut(parent.0) {
            owner.children.push(id);
        }
        id
    }

    /// Handle of the root figure.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node behind `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a graph holds at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates every node with its handle, in decode order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Child handles of `id`.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or_default()
    }

    /// Parent handle of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&current| self.parent(current))
    }

    /// Descendants of `id` in pre-order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }

    /// Nearest strict ancestor of `id` that is an axes.
    #[must_use]
    pub fn nearest_axes(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&ancestor| {
            self.node(ancestor)
                .is_some_and(|node| matches!(node.kind(), NodeKind::Axes(_)))
        })
    }

    /// Returns `true` when `id` or one of its ancestors is a text node.
    #[must_use]
    pub fn within_text(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|current| self.node(current).is_some_and(|node| node.kind().is_text()))
    }

    /// Figure attributes of the root.
    #[must_use]
    pub fn figure(&self) -> Option<&Figure> {
        match self.node(self.root()).map(Node::kind) {
            Some(NodeKind::Figure(figure)) => Some(figure),
            _ => None,
        }
    }

    /// `true` while any node still awaits resolution.
    #[must_use]
    pub fn needs_resolution(&self) -> bool {
        self.node(self.root()).is_none_or(Node::needs_resolution)
    }
}
