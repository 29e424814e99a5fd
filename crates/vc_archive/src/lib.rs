#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

//! A tree-shaped archive of variant values.
//!
//! An [`ArchiveTree`] owns every node it hands out. Nodes are addressed by
//! [`NodeId`] and allocated through the tree's factory ([`ArchiveTree::make`]),
//! so the storage strategy stays internal to the tree.
//!
//! Mutators are destructive-coercive: writing a value of a different kind
//! than the node currently holds discards the old contents. Immutable
//! accessors never fail; a missing key or an out-of-range index yields the
//! shared empty sentinel ([`ArchiveTree::empty`]).
//!
//! # Examples
//!
//! ```
//! use vc_archive::{ArchiveTree, NodeKind};
//!
//! let mut tree = ArchiveTree::new();
//! let root = tree.root();
//!
//! let class = tree.key_mut(root, "class");
//! tree.set(class, "Foo");
//!
//! let list = tree.key_mut(root, "list");
//! for value in [1, 2, 3] {
//!     let item = tree.push(list);
//!     tree.set(item, value);
//! }
//!
//! assert_eq!(tree.kind(root), NodeKind::Map);
//! assert_eq!(tree.get_str(tree.key(root, "class")), Some("Foo"));
//! assert_eq!(tree.array_len(list), 3);
//!
//! // Missing keys resolve to the empty sentinel.
//! assert_eq!(tree.key(root, "missing"), tree.empty());
//! ```

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod node;
mod text;
mod tree;
mod view;

pub mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use node::{ArchiveNode, FromNode, NodeId, NodeKind, Scalar};
pub use text::{TextStyle, TextWriter};
pub use tree::ArchiveTree;
pub use view::NodeRef;
