use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use vc_archive::NodeId;

use crate::object::{Attribute, BaseObject, CastTarget, Object, SlotAttribute};
use crate::serde::{DeserializeContext, ResolveContext, SerializeContext};
use crate::types::Type;
use crate::universe::{ObjectId, Universe};

// -----------------------------------------------------------------------------
// SuperType

pub(crate) trait Upcast: Send + Sync {
    fn upcast<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any>;

    fn upcast_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

pub(crate) struct SuperLink<T, S> {
    pub get: fn(&T) -> &S,
    pub get_mut: fn(&mut T) -> &mut S,
}

impl<T: Object, S: Object> Upcast for SuperLink<T, S> {
    fn upcast<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        let value = value.downcast_ref::<T>()?;
        Some((self.get)(value) as &dyn Any)
    }

    fn upcast_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let value = value.downcast_mut::<T>()?;
        Some((self.get_mut)(value) as &mut dyn Any)
    }
}

/// The super class of a class, and how to reach its part of an instance.
pub(crate) struct SuperType {
    pub class: Arc<ObjectType>,
    pub link: Box<dyn Upcast>,
}

// -----------------------------------------------------------------------------
// ObjectType

/// Reflected metadata of one class.
///
/// Built once per class by the [`TypeRegistry`](crate::registry::TypeRegistry)
/// and shared through `Arc`.
pub struct ObjectType {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) type_id: TypeId,
    pub(crate) size: usize,
    pub(crate) is_abstract: bool,
    pub(crate) super_type: Option<SuperType>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) slots: Vec<Arc<SlotAttribute>>,
    pub(crate) construct: fn() -> Box<dyn Any>,
}

impl ObjectType {
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The [`TypeId`] of the native type behind this class.
    #[inline]
    pub fn class_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn super_type(&self) -> Option<&Arc<ObjectType>> {
        self.super_type.as_ref().map(|link| &link.class)
    }

    /// Attributes declared by this class, super class attributes excluded.
    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute here, then along the super chain.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name() == name)
            .or_else(|| self.super_type()?.attribute(name))
    }

    /// Slots declared by this class, super class slots excluded.
    #[inline]
    pub fn slots(&self) -> &[Arc<SlotAttribute>] {
        &self.slots
    }

    /// Looks up a slot here, then along the super chain.
    pub fn slot(&self, name: &str) -> Option<&Arc<SlotAttribute>> {
        self.slots
            .iter()
            .find(|slot| slot.name() == name)
            .or_else(|| self.super_type()?.slot(name))
    }

    /// Whether this class is `class` or derives from it.
    ///
    /// Every class is-a [`BaseObject`].
    pub fn is_a(&self, class: TypeId) -> bool {
        self.type_id == class
            || class == TypeId::of::<BaseObject>()
            || self.super_type().is_some_and(|sup| sup.is_a(class))
    }

    /// A fresh default instance.
    #[inline]
    pub fn construct(&self) -> Box<dyn Any> {
        (self.construct)()
    }

    /// Narrows an instance of this class to its `class` part.
    pub fn project<'a>(&self, value: &'a dyn Any, class: TypeId) -> Option<&'a dyn Any> {
        if self.type_id == class {
            return Some(value);
        }
        let sup = self.super_type.as_ref()?;
        sup.class.project(sup.link.upcast(value)?, class)
    }

    pub fn project_mut<'a>(&self, value: &'a mut dyn Any, class: TypeId) -> Option<&'a mut dyn Any> {
        if self.type_id == class {
            return Some(value);
        }
        let sup = self.super_type.as_ref()?;
        sup.class.project_mut(sup.link.upcast_mut(value)?, class)
    }

    /// Writes the attributes of an instance into the map at `node`, super
    /// class attributes first.
    pub(crate) fn serialize_value(
        &self,
        value: &dyn Any,
        node: NodeId,
        cx: &mut SerializeContext<'_>,
    ) {
        if let Some(sup) = &self.super_type
            && let Some(part) = sup.link.upcast(value)
        {
            sup.class.serialize_value(part, node, cx);
        }
        for attribute in &self.attributes {
            let child = cx.tree_mut().key_mut(node, attribute.name());
            attribute.serialize(value, child, cx);
        }
    }

    /// Reads the attributes of an instance back. Keys absent from the map
    /// leave their attribute untouched.
    pub(crate) fn deserialize_value(
        &self,
        value: &mut dyn Any,
        node: NodeId,
        cx: &mut DeserializeContext<'_>,
    ) {
        if let Some(sup) = &self.super_type
            && let Some(part) = sup.link.upcast_mut(&mut *value)
        {
            sup.class.deserialize_value(part, node, cx);
        }
        let tree = cx.tree();
        for attribute in &self.attributes {
            let child = tree.key(node, attribute.name());
            if child != tree.empty() {
                attribute.deserialize(&mut *value, child, cx);
            }
        }
    }

    pub(crate) fn resolve_value(&self, value: &mut dyn Any, cx: &ResolveContext<'_>) {
        if let Some(sup) = &self.super_type
            && let Some(part) = sup.link.upcast_mut(&mut *value)
        {
            sup.class.resolve_value(part, cx);
        }
        for attribute in &self.attributes {
            attribute.resolve(&mut *value, cx);
        }
    }

    /// Casts an instance of this class, which may be part of a composite.
    pub(crate) fn cast(
        &self,
        universe: &Universe,
        to: &CastTarget<'_>,
        object: ObjectId,
    ) -> Option<ObjectId> {
        if to.matches_class(self) {
            return Some(object);
        }
        if let Some(composite) = to.composite()
            && let Some(found) = composite.find_self_up(universe, object)
        {
            return Some(found);
        }
        universe.cast_from_parent(to, object)
    }
}

impl Type for ObjectType {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn is_abstract(&self) -> bool {
        self.is_abstract
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("super", &self.super_type().map(|sup| sup.name()))
            .field("attributes", &self.attributes)
            .field("slots", &self.slots)
            .finish()
    }
}
