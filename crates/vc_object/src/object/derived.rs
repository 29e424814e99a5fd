use alloc::sync::Arc;
use core::fmt;

use crate::object::{CastTarget, CompositeType, ObjectType, SlotAttribute};
use crate::types::Type;
use crate::universe::{ObjectId, Universe};

/// An instantiable type: a plain class or a composite.
#[derive(Clone)]
pub enum DerivedType {
    Object(Arc<ObjectType>),
    Composite(Arc<CompositeType>),
}

impl DerivedType {
    /// The class of the value stored in an instance of this type. For a
    /// composite that is its base class.
    pub fn value_class(&self) -> &Arc<ObjectType> {
        match self {
            DerivedType::Object(class) => class,
            DerivedType::Composite(composite) => composite.base_type(),
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Arc<ObjectType>> {
        match self {
            DerivedType::Object(class) => Some(class),
            DerivedType::Composite(_) => None,
        }
    }

    #[inline]
    pub fn as_composite(&self) -> Option<&Arc<CompositeType>> {
        match self {
            DerivedType::Object(_) => None,
            DerivedType::Composite(composite) => Some(composite),
        }
    }

    /// Whether both handles point to the same type.
    pub fn ptr_eq(&self, other: &DerivedType) -> bool {
        match (self, other) {
            (DerivedType::Object(a), DerivedType::Object(b)) => Arc::ptr_eq(a, b),
            (DerivedType::Composite(a), DerivedType::Composite(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Looks up a slot of the value class.
    #[inline]
    pub fn slot(&self, name: &str) -> Option<&Arc<SlotAttribute>> {
        self.value_class().slot(name)
    }

    /// Casts `object`, an instance of this type, to `to`.
    ///
    /// See [`Universe::cast`] for the search order.
    pub fn cast(&self, universe: &Universe, to: &DerivedType, object: ObjectId) -> Option<ObjectId> {
        let target = CastTarget::Type(to);
        match self {
            DerivedType::Object(class) => class.cast(universe, &target, object),
            DerivedType::Composite(composite) => composite.cast(universe, &target, object, None),
        }
    }
}

impl Type for DerivedType {
    fn name(&self) -> &str {
        match self {
            DerivedType::Object(class) => class.name(),
            DerivedType::Composite(composite) => composite.name(),
        }
    }

    fn size(&self) -> usize {
        match self {
            DerivedType::Object(class) => class.size(),
            DerivedType::Composite(composite) => composite.size(),
        }
    }

    fn is_abstract(&self) -> bool {
        match self {
            DerivedType::Object(class) => class.is_abstract(),
            DerivedType::Composite(composite) => composite.is_abstract(),
        }
    }
}

impl From<Arc<ObjectType>> for DerivedType {
    #[inline]
    fn from(class: Arc<ObjectType>) -> Self {
        DerivedType::Object(class)
    }
}

impl From<Arc<CompositeType>> for DerivedType {
    #[inline]
    fn from(composite: Arc<CompositeType>) -> Self {
        DerivedType::Composite(composite)
    }
}

impl From<CompositeType> for DerivedType {
    #[inline]
    fn from(composite: CompositeType) -> Self {
        DerivedType::Composite(Arc::new(composite))
    }
}

impl fmt::Debug for DerivedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedType::Object(class) => write!(f, "Object({})", class.name()),
            DerivedType::Composite(composite) => write!(f, "Composite({})", composite.signature()),
        }
    }
}
