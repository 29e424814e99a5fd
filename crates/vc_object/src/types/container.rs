use alloc::borrow::Cow;
use alloc::format;
use alloc::vec::Vec;

use vc_archive::NodeId;

use crate::serde::{DeserializeContext, ResolveContext, SerializeContext};
use crate::types::Value;

// -----------------------------------------------------------------------------
// Array

impl<T: Value> Value for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Array<{}>", T::type_name()))
    }

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
        cx.tree_mut().set_array(node);
        for item in self {
            let child = cx.tree_mut().push(node);
            item.serialize(child, cx);
        }
    }

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
        let tree = cx.tree();
        if !tree.is_array(node) {
            if !tree.is_empty(node) {
                log::warn!("expected an array, found {}", tree.kind(node));
            }
            return;
        }
        self.clear();
        self.reserve(tree.array_len(node));
        for &child in tree.elements(node) {
            let mut item = T::default();
            item.deserialize(child, cx);
            self.push(item);
        }
    }

    fn resolve(&mut self, cx: &ResolveContext<'_>) -> bool {
        self.iter_mut()
            .fold(false, |changed, item| item.resolve(cx) | changed)
    }
}

// -----------------------------------------------------------------------------
// Maybe

impl<T: Value> Value for Option<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Maybe<{}>", T::type_name()))
    }

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
        match self {
            Some(value) => value.serialize(node, cx),
            None => cx.tree_mut().clear(node),
        }
    }

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
        if cx.tree().is_empty(node) {
            *self = None;
        } else {
            self.get_or_insert_with(T::default).deserialize(node, cx);
        }
    }

    fn resolve(&mut self, cx: &ResolveContext<'_>) -> bool {
        self.as_mut().is_some_and(|value| value.resolve(cx))
    }
}
