use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, type_name};
use core::fmt;

use vc_archive::NodeId;

use crate::object::Object;
use crate::serde::{DeserializeContext, ResolveContext, SerializeContext};
use crate::types::{Value, ValueType};

// -----------------------------------------------------------------------------
// Attribute

/// A named, typed, serializable member of a class.
///
/// The attribute stores how to reach its value inside an instance; the
/// instance itself is passed in type-erased and checked on every access.
pub struct Attribute {
    name: String,
    description: String,
    value_type: ValueType,
    access: Box<dyn AttributeAccess>,
}

impl Attribute {
    pub(crate) fn field<T: Object, V: Value>(
        name: &str,
        description: &str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value_type: ValueType::of::<V>(),
            access: Box::new(FieldAccess { get, get_mut }),
        }
    }

    pub(crate) fn property<T: Object, V: Value>(
        name: &str,
        description: &str,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value_type: ValueType::of::<V>(),
            access: Box::new(PropertyAccess { get, set }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    #[inline]
    pub(crate) fn serialize(&self, object: &dyn Any, node: NodeId, cx: &mut SerializeContext<'_>) {
        self.access.serialize(object, node, cx);
    }

    #[inline]
    pub(crate) fn deserialize(
        &self,
        object: &mut dyn Any,
        node: NodeId,
        cx: &mut DeserializeContext<'_>,
    ) {
        self.access.deserialize(object, node, cx);
    }

    #[inline]
    pub(crate) fn resolve(&self, object: &mut dyn Any, cx: &ResolveContext<'_>) {
        self.access.resolve(object, cx);
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.value_type)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Access

trait AttributeAccess: Send + Sync {
    fn serialize(&self, object: &dyn Any, node: NodeId, cx: &mut SerializeContext<'_>);

    fn deserialize(&self, object: &mut dyn Any, node: NodeId, cx: &mut DeserializeContext<'_>);

    fn resolve(&self, object: &mut dyn Any, cx: &ResolveContext<'_>);
}

#[cold]
#[inline(never)]
fn foreign_instance<T>() -> ! {
    panic!("attribute of `{}` used on a foreign instance", type_name::<T>())
}

#[inline]
fn downcast<T: Object>(object: &dyn Any) -> &T {
    match object.downcast_ref::<T>() {
        Some(object) => object,
        None => foreign_instance::<T>(),
    }
}

#[inline]
fn downcast_mut<T: Object>(object: &mut dyn Any) -> &mut T {
    match object.downcast_mut::<T>() {
        Some(object) => object,
        None => foreign_instance::<T>(),
    }
}

/// Direct access to a member.
struct FieldAccess<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T: Object, V: Value> AttributeAccess for FieldAccess<T, V> {
    fn serialize(&self, object: &dyn Any, node: NodeId, cx: &mut SerializeContext<'_>) {
        (self.get)(downcast(object)).serialize(node, cx);
    }

    fn deserialize(&self, object: &mut dyn Any, node: NodeId, cx: &mut DeserializeContext<'_>) {
        (self.get_mut)(downcast_mut(object)).deserialize(node, cx);
    }

    fn resolve(&self, object: &mut dyn Any, cx: &ResolveContext<'_>) {
        (self.get_mut)(downcast_mut(object)).resolve(cx);
    }
}

/// Access through a getter and a setter. Reads start from the current value
/// and are written back through the setter.
struct PropertyAccess<T, V> {
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T: Object, V: Value> AttributeAccess for PropertyAccess<T, V> {
    fn serialize(&self, object: &dyn Any, node: NodeId, cx: &mut SerializeContext<'_>) {
        (self.get)(downcast(object)).serialize(node, cx);
    }

    fn deserialize(&self, object: &mut dyn Any, node: NodeId, cx: &mut DeserializeContext<'_>) {
        let object = downcast_mut::<T>(object);
        let mut value = (self.get)(object);
        value.deserialize(node, cx);
        (self.set)(object, value);
    }

    fn resolve(&self, object: &mut dyn Any, cx: &ResolveContext<'_>) {
        let object = downcast_mut::<T>(object);
        let mut value = (self.get)(object);
        if value.resolve(cx) {
            (self.set)(object, value);
        }
    }
}
