use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;

use vc_archive::NodeId;

use crate::object::SlotAttribute;
use crate::universe::ObjectId;

/// Handle of a patch registered while reading an archive.
///
/// Values keep their tickets until the patch pass hands them the result
/// through a [`ResolveContext`](crate::serde::ResolveContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u32);

impl Ticket {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node that must receive the id of `target`.
pub(crate) struct IdPatch {
    pub node: NodeId,
    pub target: Option<ObjectId>,
}

/// An id read from the archive, to be looked up and cast to `class`.
pub(crate) struct ReferencePatch {
    pub id: String,
    pub class: TypeId,
    pub class_name: String,
}

/// A connection read from the archive.
pub(crate) struct ConnectionPatch {
    pub receiver: String,
    pub slot: String,
    pub signature: TypeId,
    pub signature_name: String,
}

#[derive(Default)]
pub(crate) struct PatchQueues {
    pub ids: Vec<IdPatch>,
    pub references: Vec<ReferencePatch>,
    pub connections: Vec<ConnectionPatch>,
}

impl PatchQueues {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.references.is_empty() && self.connections.is_empty()
    }
}

/// A connection patch that found its receiver and slot.
pub(crate) struct ResolvedConnection {
    pub receiver: ObjectId,
    pub slot: Arc<SlotAttribute>,
}
