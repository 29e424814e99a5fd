use alloc::sync::Arc;
use core::any::TypeId;

use crate::object::{CompositeType, DerivedType, ObjectType};

/// What a cast is looking for.
#[derive(Clone, Copy)]
pub(crate) enum CastTarget<'a> {
    /// Any part whose class is, or derives from, the given class.
    Class(TypeId),
    /// A part of exactly this type, or derived from its class.
    Type(&'a DerivedType),
}

impl CastTarget<'_> {
    pub fn matches_class(&self, class: &ObjectType) -> bool {
        match self {
            CastTarget::Class(id) => class.is_a(*id),
            CastTarget::Type(DerivedType::Object(to)) => class.is_a(to.class_id()),
            CastTarget::Type(DerivedType::Composite(_)) => false,
        }
    }

    pub fn composite(&self) -> Option<&Arc<CompositeType>> {
        match self {
            CastTarget::Type(DerivedType::Composite(composite)) => Some(composite),
            _ => None,
        }
    }

    pub fn is_composite(&self, composite: &CompositeType) -> bool {
        self.composite()
            .is_some_and(|to| core::ptr::eq(Arc::as_ptr(to), composite))
    }
}
