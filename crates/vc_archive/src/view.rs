use crate::node::{ArchiveNode, FromNode, NodeId, NodeKind};
use crate::tree::ArchiveTree;

/// A read-only cursor into an [`ArchiveTree`].
///
/// Navigation never fails: stepping through a missing key or index lands on
/// the empty sentinel, so chains like `view.get("a").at(2).get("b")` can be
/// written without intermediate checks.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ArchiveTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[inline]
    pub(crate) const fn new(tree: &'a ArchiveTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    #[inline]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn node(&self) -> &'a ArchiveNode {
        self.tree.node(self.id)
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node().is_empty()
    }

    #[inline]
    pub fn get(&self, key: &str) -> NodeRef<'a> {
        NodeRef::new(self.tree, self.tree.key(self.id, key))
    }

    #[inline]
    pub fn at(&self, index: usize) -> NodeRef<'a> {
        NodeRef::new(self.tree, self.tree.at(self.id, index))
    }

    /// Element count of an array, entry count of a map, zero otherwise.
    pub fn len(&self) -> usize {
        match self.node() {
            ArchiveNode::Array(items) => items.len(),
            ArchiveNode::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    #[inline]
    pub fn value<T: FromNode>(&self) -> Option<T> {
        T::from_node(self.node())
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        self.value()
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        self.value()
    }

    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        self.tree.get_str(self.id)
    }

    pub fn elements(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        tree.elements(self.id)
            .iter()
            .map(move |id| NodeRef::new(tree, *id))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'a str, NodeRef<'a>)> + use<'a> {
        let tree = self.tree;
        tree.entries(self.id)
            .map(move |(key, id)| (key, NodeRef::new(tree, id)))
    }
}

impl core::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        crate::TextWriter::new(self.tree).write_node(f, self.id, true, 1)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArchiveTree, NodeKind};

    #[test]
    fn navigation_through_missing_nodes() {
        let mut tree = ArchiveTree::new();
        let root = tree.root();
        let items = tree.key_mut(root, "items");
        let first = tree.push(items);
        let name = tree.key_mut(first, "name");
        tree.set(name, "first");

        let view = tree.root_ref();
        assert_eq!(view.get("items").at(0).get("name").as_str(), Some("first"));
        assert_eq!(view.get("items").len(), 1);
        assert_eq!(view.get("nothing").at(3).get("x").kind(), NodeKind::Empty);
        assert_eq!(view.entries().map(|(key, _)| key).next(), Some("items"));
    }
}
