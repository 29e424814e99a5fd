use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::ops::Deref;

use vc_archive::NodeId;

use crate::serde::{DeserializeContext, SerializeContext};
use crate::types::Value;
use crate::universe::ObjectId;

/// An ordered list of child objects, archived inline.
///
/// Each child is written as a complete object map inside the parent's
/// archive, and recreated from it when the archive is read. Children that
/// fail to load are reported and left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildList {
    children: Vec<ObjectId>,
}

impl ChildList {
    #[inline]
    pub const fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, child: ObjectId) {
        self.children.push(child);
    }

    /// Removes `child`, returning whether it was listed.
    pub fn remove(&mut self, child: ObjectId) -> bool {
        match self.children.iter().position(|c| *c == child) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.children.clear();
    }
}

impl Deref for ChildList {
    type Target = [ObjectId];

    #[inline]
    fn deref(&self) -> &[ObjectId] {
        &self.children
    }
}

impl FromIterator<ObjectId> for ChildList {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl Value for ChildList {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("ChildList")
    }

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
        cx.tree_mut().set_array(node);
        for &child in &self.children {
            let item = cx.tree_mut().push(node);
            cx.serialize_object(child, item);
        }
    }

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
        let tree = cx.tree();
        if !tree.is_array(node) {
            if !tree.is_empty(node) {
                log::warn!("expected an array of objects, found {}", tree.kind(node));
            }
            return;
        }
        self.children.clear();
        for &item in tree.elements(node) {
            if let Some(child) = cx.deserialize_object(item) {
                self.children.push(child);
            }
        }
    }
}
