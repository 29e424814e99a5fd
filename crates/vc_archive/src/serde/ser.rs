use serde_core::ser::{SerializeMap, SerializeSeq};
use serde_core::{Serialize, Serializer};

use crate::node::{ArchiveNode, NodeId};
use crate::tree::ArchiveTree;

/// Serializes one subtree of an [`ArchiveTree`].
pub struct NodeSerializer<'a> {
    pub tree: &'a ArchiveTree,
    pub id: NodeId,
}

impl Serialize for NodeSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.tree.node(self.id) {
            ArchiveNode::Empty => serializer.serialize_unit(),
            ArchiveNode::Integer(v) => serializer.serialize_i64(*v),
            ArchiveNode::Float(v) => serializer.serialize_f64(*v),
            ArchiveNode::String(v) => serializer.serialize_str(v),
            ArchiveNode::Array(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for id in items {
                    state.serialize_element(&NodeSerializer {
                        tree: self.tree,
                        id: *id,
                    })?;
                }
                state.end()
            }
            ArchiveNode::Map(entries) => {
                let mut state = serializer.serialize_map(Some(entries.len()))?;
                for (key, id) in entries {
                    state.serialize_entry(
                        key,
                        &NodeSerializer {
                            tree: self.tree,
                            id: *id,
                        },
                    )?;
                }
                state.end()
            }
        }
    }
}

impl Serialize for ArchiveTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(1))?;
        state.serialize_entry(
            "root",
            &NodeSerializer {
                tree: self,
                id: self.root(),
            },
        )?;
        state.end()
    }
}
