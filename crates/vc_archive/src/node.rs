use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// NodeId

/// The address of a node inside an [`ArchiveTree`](crate::ArchiveTree).
///
/// Ids are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the arena index of this node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// -----------------------------------------------------------------------------
// NodeKind

/// The kind of value a node currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Array,
    Map,
    Integer,
    Float,
    String,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Empty => "empty",
            NodeKind::Array => "array",
            NodeKind::Map => "map",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
        })
    }
}

// -----------------------------------------------------------------------------
// ArchiveNode

/// A tagged archive value.
///
/// Container variants hold child ids into the same tree. Map entries keep
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ArchiveNode {
    #[default]
    Empty,
    Array(Vec<NodeId>),
    Map(Vec<(String, NodeId)>),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ArchiveNode {
    /// Returns the [`NodeKind`] of this node.
    pub const fn kind(&self) -> NodeKind {
        match self {
            ArchiveNode::Empty => NodeKind::Empty,
            ArchiveNode::Array(_) => NodeKind::Array,
            ArchiveNode::Map(_) => NodeKind::Map,
            ArchiveNode::Integer(_) => NodeKind::Integer,
            ArchiveNode::Float(_) => NodeKind::Float,
            ArchiveNode::String(_) => NodeKind::String,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self, ArchiveNode::Empty)
    }

    /// Looks up a map entry, `None` for a missing key or a non-map node.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        match self {
            ArchiveNode::Map(entries) => entries
                .iter()
                .find_map(|(name, id)| (name == key).then_some(*id)),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// A leaf value that can be written into a node.
///
/// Unsigned 64-bit values are stored by bit pattern, so values above
/// `i64::MAX` read back unchanged as `u64` but appear negative as `i64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    String(String),
}

macro_rules! impl_scalar_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Scalar {
                #[inline]
                fn from(value: $ty) -> Self {
                    Scalar::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_scalar_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Scalar {
    #[inline]
    fn from(value: u64) -> Self {
        Scalar::Integer(value as i64)
    }
}

impl From<f32> for Scalar {
    #[inline]
    fn from(value: f32) -> Self {
        Scalar::Float(f64::from(value))
    }
}

impl From<f64> for Scalar {
    #[inline]
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<String> for Scalar {
    #[inline]
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<&str> for Scalar {
    #[inline]
    fn from(value: &str) -> Self {
        Scalar::String(String::from(value))
    }
}

impl From<Scalar> for ArchiveNode {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Integer(v) => ArchiveNode::Integer(v),
            Scalar::Float(v) => ArchiveNode::Float(v),
            Scalar::String(v) => ArchiveNode::String(v),
        }
    }
}

// -----------------------------------------------------------------------------
// FromNode

/// Reads a leaf value out of a node.
///
/// Returns `None` when the node holds a different kind, or when an integer
/// does not fit the requested width.
pub trait FromNode: Sized {
    fn from_node(node: &ArchiveNode) -> Option<Self>;
}

macro_rules! impl_from_node_int {
    ($($ty:ty),*) => {
        $(
            impl FromNode for $ty {
                #[inline]
                fn from_node(node: &ArchiveNode) -> Option<Self> {
                    match node {
                        ArchiveNode::Integer(v) => <$ty>::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_node_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromNode for u64 {
    #[inline]
    fn from_node(node: &ArchiveNode) -> Option<Self> {
        match node {
            ArchiveNode::Integer(v) => Some(*v as u64),
            _ => None,
        }
    }
}

impl FromNode for f64 {
    #[inline]
    fn from_node(node: &ArchiveNode) -> Option<Self> {
        match node {
            ArchiveNode::Float(v) => Some(*v),
            ArchiveNode::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromNode for f32 {
    #[inline]
    fn from_node(node: &ArchiveNode) -> Option<Self> {
        f64::from_node(node).map(|v| v as f32)
    }
}

impl FromNode for String {
    #[inline]
    fn from_node(node: &ArchiveNode) -> Option<Self> {
        match node {
            ArchiveNode::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_width_is_checked() {
        let node = ArchiveNode::Integer(300);
        assert_eq!(u8::from_node(&node), None);
        assert_eq!(i16::from_node(&node), Some(300));
        assert_eq!(f64::from_node(&node), Some(300.0));
        assert_eq!(String::from_node(&node), None);
    }

    #[test]
    fn unsigned_keeps_bit_pattern() {
        let node = ArchiveNode::from(Scalar::from(u64::MAX));
        assert_eq!(u64::from_node(&node), Some(u64::MAX));
        assert_eq!(i64::from_node(&node), Some(-1));
    }
}
