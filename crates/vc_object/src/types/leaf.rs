use alloc::borrow::Cow;
use alloc::string::String;

use vc_archive::{ArchiveTree, NodeId};

use crate::serde::{DeserializeContext, SerializeContext};
use crate::types::Value;

/// Reports a node that cannot be read as the leaf type `name`. Empty
/// nodes keep the current value silently.
#[cold]
fn mismatch(tree: &ArchiveTree, node: NodeId, name: &str) {
    if !tree.is_empty(node) {
        log::warn!("cannot read a `{name}` from {} node", tree.kind(node));
    }
}

macro_rules! impl_leaf_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Value for $ty {
                #[inline]
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }

                #[inline]
                fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
                    cx.tree_mut().set(node, *self);
                }

                #[inline]
                fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
                    match cx.tree().get::<$ty>(node) {
                        Some(value) => *self = value,
                        None => mismatch(cx.tree(), node, $name),
                    }
                }
            }
        )*
    };
}

impl_leaf_value! {
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    f32 => "float32",
    f64 => "float64",
}

impl Value for String {
    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("string")
    }

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
        cx.tree_mut().set(node, self.as_str());
    }

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
        match cx.tree().get_str(node) {
            Some(value) => {
                self.clear();
                self.push_str(value);
            }
            None => mismatch(cx.tree(), node, "string"),
        }
    }
}
