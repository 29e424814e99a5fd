use alloc::string::String;
use core::fmt::{self, Formatter};

use serde_core::de::{DeserializeSeed, Error, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer};

use crate::node::NodeId;
use crate::tree::ArchiveTree;

/// Deserializes any self-describing value into an existing node.
pub struct NodeSeed<'a> {
    pub tree: &'a mut ArchiveTree,
    pub target: NodeId,
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(NodeVisitor {
            tree: self.tree,
            target: self.target,
        })
    }
}

struct NodeVisitor<'a> {
    tree: &'a mut ArchiveTree,
    target: NodeId,
}

impl<'de> Visitor<'de> for NodeVisitor<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("an archive value")
    }

    fn visit_bool<E: Error>(self, v: bool) -> Result<(), E> {
        self.tree.set(self.target, i64::from(v));
        Ok(())
    }

    fn visit_i64<E: Error>(self, v: i64) -> Result<(), E> {
        self.tree.set(self.target, v);
        Ok(())
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<(), E> {
        self.tree.set(self.target, v);
        Ok(())
    }

    fn visit_f64<E: Error>(self, v: f64) -> Result<(), E> {
        self.tree.set(self.target, v);
        Ok(())
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<(), E> {
        self.tree.set(self.target, v);
        Ok(())
    }

    fn visit_string<E: Error>(self, v: String) -> Result<(), E> {
        self.tree.set(self.target, v);
        Ok(())
    }

    fn visit_unit<E: Error>(self) -> Result<(), E> {
        self.tree.clear(self.target);
        Ok(())
    }

    fn visit_none<E: Error>(self) -> Result<(), E> {
        self.tree.clear(self.target);
        Ok(())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let tree = self.tree;
        tree.set_array(self.target);
        loop {
            let child = tree.make();
            let seed = NodeSeed {
                tree: &mut *tree,
                target: child,
            };
            match seq.next_element_seed(seed)? {
                Some(()) => tree.attach(self.target, child),
                None => return Ok(()),
            }
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let tree = self.tree;
        tree.set_map(self.target);
        while let Some(key) = map.next_key::<String>()? {
            let child = tree.key_mut(self.target, &key);
            map.next_value_seed(NodeSeed {
                tree: &mut *tree,
                target: child,
            })?;
        }
        Ok(())
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = ArchiveTree;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("an archive document `{\"root\": ...}`")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ArchiveTree, A::Error> {
        let mut tree = ArchiveTree::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == "root" {
                let root = tree.root();
                map.next_value_seed(NodeSeed {
                    tree: &mut tree,
                    target: root,
                })?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(tree)
    }
}

impl<'de> Deserialize<'de> for ArchiveTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TreeVisitor)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::{ArchiveTree, NodeKind};

    #[test]
    fn json_keeps_kinds_and_order() {
        let text = r#"{"root": {"z": 1, "a": [1.5, "s", null, true], "m": {}}, "extra": 3}"#;
        let tree: ArchiveTree = serde_json::from_str(text).unwrap();
        let root = tree.root_ref();

        let keys: alloc::vec::Vec<&str> = root.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(root.get("a").at(0).as_f64(), Some(1.5));
        assert_eq!(root.get("a").at(1).as_str(), Some("s"));
        assert_eq!(root.get("a").at(2).kind(), NodeKind::Empty);
        assert_eq!(root.get("a").at(3).as_i64(), Some(1));
        assert_eq!(root.get("m").kind(), NodeKind::Map);
    }

    #[test]
    fn text_form_parses_back() {
        let mut tree = ArchiveTree::new();
        let root = tree.root();
        let list = tree.key_mut(root, "list");
        for value in [3, 1, 2] {
            let item = tree.push(list);
            tree.set(item, value);
        }
        let label = tree.key_mut(root, "label");
        tree.set(label, "line\nbreak");

        let back: ArchiveTree = serde_json::from_str(&tree.to_string()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn ron_round_trip() {
        let mut tree = ArchiveTree::new();
        let root = tree.root();
        let x = tree.key_mut(root, "x");
        tree.set(x, -4);
        let y = tree.key_mut(root, "y");
        tree.set(y, "why");

        let text = ron::to_string(&tree).unwrap();
        let back: ArchiveTree = ron::from_str(&text).unwrap();
        assert_eq!(back, tree);
    }
}
