use alloc::borrow::Cow;

use vc_archive::NodeId;

use crate::serde::{DeserializeContext, ResolveContext, SerializeContext};

/// A type that can be stored in an object attribute.
///
/// `serialize` writes into a node that already exists in the archive tree;
/// `deserialize` reads from one. Neither may fail: a node of the wrong kind
/// leaves the value as it was, and problems worth reporting are logged.
///
/// Values that point at other objects cannot resolve those links while the
/// archive is still being read. They register a patch with the context
/// instead and complete it in [`resolve`](Value::resolve), which runs once
/// every object of the archive exists.
pub trait Value: Default + 'static {
    /// The name of this type in diagnostics and signal signatures.
    fn type_name() -> Cow<'static, str>;

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>);

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>);

    /// Applies the outcome of patches registered during `deserialize`.
    ///
    /// Returns `true` if the value changed.
    fn resolve(&mut self, cx: &ResolveContext<'_>) -> bool {
        let _ = cx;
        false
    }
}
