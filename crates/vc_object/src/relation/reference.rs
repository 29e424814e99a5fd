use alloc::borrow::Cow;
use alloc::format;
use core::fmt;
use core::marker::PhantomData;

use vc_archive::{ArchiveNode, NodeId};

use crate::object::Object;
use crate::serde::{DeserializeContext, ResolveContext, SerializeContext, Ticket};
use crate::types::Value;
use crate::universe::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefState {
    Null,
    Bound(ObjectId),
    Pending(Ticket),
}

/// A reference to an object of class `T`.
///
/// Archived as the target's id, or `null`. Reading an archive resolves the
/// id once every object exists; an id that is unknown, or names an object
/// that cannot be cast to `T`, leaves the reference null.
///
/// The reference does not keep its target alive. Look the target up with
/// [`Universe::get`](crate::universe::Universe::get).
pub struct Ref<T: Object> {
    state: RefState,
    marker: PhantomData<fn() -> T>,
}

impl<T: Object> Ref<T> {
    #[inline]
    pub const fn null() -> Self {
        Self {
            state: RefState::Null,
            marker: PhantomData,
        }
    }

    /// A reference to `object`, which should be castable to `T`.
    #[inline]
    pub const fn new(object: ObjectId) -> Self {
        Self {
            state: RefState::Bound(object),
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn get(&self) -> Option<ObjectId> {
        match self.state {
            RefState::Bound(object) => Some(object),
            _ => None,
        }
    }

    #[inline]
    pub fn set(&mut self, object: Option<ObjectId>) {
        self.state = match object {
            Some(object) => RefState::Bound(object),
            None => RefState::Null,
        };
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.get().is_none()
    }
}

impl<T: Object> Default for Ref<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: Object> Clone for Ref<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Object> Copy for Ref<T> {}

impl<T: Object> PartialEq for Ref<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<T: Object> Eq for Ref<T> {}

impl<T: Object> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            RefState::Null => write!(f, "Ref<{}>(null)", T::class_name()),
            RefState::Bound(object) => write!(f, "Ref<{}>({object:?})", T::class_name()),
            RefState::Pending(_) => write!(f, "Ref<{}>(pending)", T::class_name()),
        }
    }
}

impl<T: Object> From<ObjectId> for Ref<T> {
    #[inline]
    fn from(object: ObjectId) -> Self {
        Self::new(object)
    }
}

impl<T: Object> Value for Ref<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Ref<{}>", T::class_name()))
    }

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
        cx.defer_reference(node, self.get());
    }

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
        match cx.tree().node(node) {
            ArchiveNode::String(id) => {
                self.state = RefState::Pending(cx.defer_reference::<T>(id));
            }
            ArchiveNode::Empty => self.state = RefState::Null,
            other => log::warn!(
                "expected an object id for `{}`, found {}",
                Self::type_name(),
                other.kind()
            ),
        }
    }

    fn resolve(&mut self, cx: &ResolveContext<'_>) -> bool {
        let RefState::Pending(ticket) = self.state else {
            return false;
        };
        self.set(cx.reference(ticket));
        true
    }
}
