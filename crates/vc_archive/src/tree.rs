use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::node::{ArchiveNode, FromNode, NodeId, NodeKind, Scalar};
use crate::text::TextWriter;
use crate::view::NodeRef;

const EMPTY: NodeId = NodeId::new(0);
const ROOT: NodeId = NodeId::new(1);

// -----------------------------------------------------------------------------
// ArchiveTree

/// Owner and factory of archive nodes.
///
/// The tree always contains two nodes: the shared empty sentinel, which is
/// never mutated, and the root. Every other node is allocated through
/// [`make`](Self::make) or implicitly by the coercive mutators.
///
/// Nodes detached by a coercion stay allocated until [`reset`](Self::reset).
#[derive(Clone)]
pub struct ArchiveTree {
    nodes: Vec<ArchiveNode>,
}

impl Default for ArchiveTree {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveTree {
    /// Creates a tree holding an empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![ArchiveNode::Empty, ArchiveNode::Empty],
        }
    }

    /// Drops every node and starts over with an empty root.
    pub fn reset(&mut self) {
        self.nodes.truncate(2);
        self.nodes[ROOT.index()] = ArchiveNode::Empty;
    }

    #[inline]
    pub const fn root(&self) -> NodeId {
        ROOT
    }

    /// The shared empty sentinel returned by immutable lookups that miss.
    #[inline]
    pub const fn empty(&self) -> NodeId {
        EMPTY
    }

    /// Number of allocated nodes, sentinel and root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Allocates a fresh empty node.
    pub fn make(&mut self) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(ArchiveNode::Empty);
        id
    }

    /// Returns the node behind `id`, or the empty sentinel for a foreign id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &ArchiveNode {
        self.nodes.get(id.index()).unwrap_or(&self.nodes[EMPTY.index()])
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ArchiveNode {
        assert_ne!(id, EMPTY, "the empty sentinel node is immutable");
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn view(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    #[inline]
    pub fn root_ref(&self) -> NodeRef<'_> {
        NodeRef::new(self, ROOT)
    }

    // -------------------------------------------------------------------------
    // Queries

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    #[inline]
    pub fn is_empty(&self, id: NodeId) -> bool {
        self.node(id).is_empty()
    }

    #[inline]
    pub fn is_array(&self, id: NodeId) -> bool {
        matches!(self.node(id), ArchiveNode::Array(_))
    }

    #[inline]
    pub fn is_map(&self, id: NodeId) -> bool {
        matches!(self.node(id), ArchiveNode::Map(_))
    }

    /// Reads a leaf value; `None` if the node holds another kind.
    #[inline]
    pub fn get<T: FromNode>(&self, id: NodeId) -> Option<T> {
        T::from_node(self.node(id))
    }

    pub fn get_str(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            ArchiveNode::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The children of an array node, empty for any other kind.
    pub fn elements(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            ArchiveNode::Array(items) => items,
            _ => &[],
        }
    }

    /// The entries of a map node in insertion order.
    pub fn entries(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        let entries: &[(String, NodeId)] = match self.node(id) {
            ArchiveNode::Map(entries) => entries,
            _ => &[],
        };
        entries.iter().map(|(key, id)| (key.as_str(), *id))
    }

    #[inline]
    pub fn array_len(&self, id: NodeId) -> usize {
        self.elements(id).len()
    }

    pub fn map_len(&self, id: NodeId) -> usize {
        match self.node(id) {
            ArchiveNode::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Returns the element at `index`, or the empty sentinel.
    #[inline]
    pub fn at(&self, id: NodeId, index: usize) -> NodeId {
        self.elements(id).get(index).copied().unwrap_or(EMPTY)
    }

    /// Returns the value under `key`, or the empty sentinel.
    #[inline]
    pub fn key(&self, id: NodeId, key: &str) -> NodeId {
        self.node(id).find(key).unwrap_or(EMPTY)
    }

    #[inline]
    pub fn contains_key(&self, id: NodeId, key: &str) -> bool {
        self.node(id).find(key).is_some()
    }

    // -------------------------------------------------------------------------
    // Mutators

    /// Resets the node to [`ArchiveNode::Empty`].
    pub fn clear(&mut self, id: NodeId) {
        *self.node_mut(id) = ArchiveNode::Empty;
    }

    /// Replaces the node with a leaf value.
    pub fn set(&mut self, id: NodeId, value: impl Into<Scalar>) {
        *self.node_mut(id) = ArchiveNode::from(value.into());
    }

    /// Replaces the node with an empty array.
    pub fn set_array(&mut self, id: NodeId) {
        *self.node_mut(id) = ArchiveNode::Array(Vec::new());
    }

    /// Replaces the node with an empty map.
    pub fn set_map(&mut self, id: NodeId) {
        *self.node_mut(id) = ArchiveNode::Map(Vec::new());
    }

    fn as_array_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        let node = self.node_mut(id);
        if !matches!(node, ArchiveNode::Array(_)) {
            *node = ArchiveNode::Array(Vec::new());
        }
        match node {
            ArchiveNode::Array(items) => items,
            _ => unreachable!(),
        }
    }

    fn as_map_mut(&mut self, id: NodeId) -> &mut Vec<(String, NodeId)> {
        let node = self.node_mut(id);
        if !matches!(node, ArchiveNode::Map(_)) {
            *node = ArchiveNode::Map(Vec::new());
        }
        match node {
            ArchiveNode::Map(entries) => entries,
            _ => unreachable!(),
        }
    }

    /// Appends a fresh empty element, turning the node into an array first
    /// if needed.
    pub fn push(&mut self, id: NodeId) -> NodeId {
        let child = self.make();
        self.as_array_mut(id).push(child);
        child
    }

    pub(crate) fn attach(&mut self, id: NodeId, child: NodeId) {
        self.as_array_mut(id).push(child);
    }

    /// Returns the element at `index`, growing the array with empty nodes as
    /// needed. A non-array node becomes an array first.
    pub fn at_mut(&mut self, id: NodeId, index: usize) -> NodeId {
        let len = self.as_array_mut(id).len();
        for _ in len..=index {
            let child = self.make();
            self.as_array_mut(id).push(child);
        }
        self.as_array_mut(id)[index]
    }

    /// Returns the value under `key`, creating an empty node for a missing
    /// key. A non-map node becomes a map first.
    pub fn key_mut(&mut self, id: NodeId, key: &str) -> NodeId {
        if let Some(found) = self.as_map_mut(id).iter().find(|(name, _)| name == key) {
            return found.1;
        }
        let child = self.make();
        self.as_map_mut(id).push((String::from(key), child));
        child
    }

    // -------------------------------------------------------------------------
    // Comparison

    /// Structural equality of two subtrees, possibly from different trees.
    pub fn subtree_eq(&self, id: NodeId, other: &ArchiveTree, other_id: NodeId) -> bool {
        match (self.node(id), other.node(other_id)) {
            (ArchiveNode::Array(a), ArchiveNode::Array(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| self.subtree_eq(*x, other, *y))
            }
            (ArchiveNode::Map(a), ArchiveNode::Map(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ka, x), (kb, y))| {
                        ka == kb && self.subtree_eq(*x, other, *y)
                    })
            }
            (a, b) => a == b,
        }
    }
}

impl PartialEq for ArchiveTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(ROOT, other, ROOT)
    }
}

impl fmt::Debug for ArchiveTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ArchiveTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        TextWriter::new(self).write_document(f)
    }
}

// -----------------------------------------------------------------------------
// Tests
