//! `serde_core` support for [`ArchiveTree`](crate::ArchiveTree).
//!
//! A tree serializes as a one-entry map `{"root": <value>}`, the same shape
//! as the reference text form, so any self-describing serde format can carry
//! an archive:
//!
//! - [`Empty`](crate::ArchiveNode::Empty) maps to unit (`null` in JSON).
//! - Arrays and maps map to sequences and maps, entries in order.
//! - Integers, floats and strings map to `i64`, `f64` and `str`.
//!
//! Deserialization accepts any self-describing input. Booleans become
//! integers `0`/`1`, `None` becomes an empty node, and unknown top-level
//! keys other than `"root"` are ignored.
//!
//! # Examples
//!
//! ```
//! use vc_archive::ArchiveTree;
//!
//! let mut tree = ArchiveTree::new();
//! let root = tree.root();
//! let value = tree.key_mut(root, "value");
//! tree.set(value, 42);
//!
//! let json = serde_json::to_string(&tree).unwrap();
//! assert_eq!(json, r#"{"root":{"value":42}}"#);
//!
//! let back: ArchiveTree = serde_json::from_str(&json).unwrap();
//! assert_eq!(back, tree);
//! ```

mod de;
mod ser;

pub use de::NodeSeed;
pub use ser::NodeSerializer;
