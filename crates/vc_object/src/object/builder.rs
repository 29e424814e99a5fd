use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::marker::PhantomData;

use crate::object::object_type::{SuperLink, SuperType};
use crate::object::{Attribute, Object, ObjectType, RESERVED_NAMES, SlotAttribute};
use crate::registry::TypeRegistry;
use crate::relation::{Signal, SignalArgs};
use crate::types::{Type, Value};
use crate::universe::ObjectHeader;

fn construct_default<T: Object>() -> Box<dyn Any> {
    Box::new(T::default())
}

/// Collects the reflected description of class `T`.
///
/// Handed to [`Object::describe`] by
/// [`TypeRegistry::register`](crate::registry::TypeRegistry::register).
/// Every method returns `&mut Self` so declarations chain.
///
/// # Panics
///
/// Declaring a member named like one of [`RESERVED_NAMES`], or reusing a
/// name already declared by the class or its super classes, panics.
pub struct ObjectTypeBuilder<'r, T: Object> {
    registry: &'r mut TypeRegistry,
    description: String,
    is_abstract: bool,
    super_type: Option<SuperType>,
    attributes: Vec<Attribute>,
    slots: Vec<Arc<SlotAttribute>>,
    marker: PhantomData<fn() -> T>,
}

impl<'r, T: Object> ObjectTypeBuilder<'r, T> {
    pub(crate) fn new(registry: &'r mut TypeRegistry) -> Self {
        Self {
            registry,
            description: String::new(),
            is_abstract: false,
            super_type: None,
            attributes: Vec::new(),
            slots: Vec::new(),
            marker: PhantomData,
        }
    }

    pub fn description(&mut self, text: &str) -> &mut Self {
        self.description = text.into();
        self
    }

    /// Marks the class abstract: it can be a super class, never an instance
    /// or an aspect.
    pub fn abstract_class(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    /// Declares `S` as the super class, stored inside `T` as a member.
    ///
    /// `S` is registered on the way if it is not yet.
    pub fn super_type<S: Object>(
        &mut self,
        get: fn(&T) -> &S,
        get_mut: fn(&mut T) -> &mut S,
    ) -> &mut Self {
        assert!(
            self.super_type.is_none(),
            "class `{}` already has a super class",
            T::class_name()
        );
        let class = self.registry.register::<S>();
        let declared = self.attributes.iter().map(Attribute::name);
        for name in declared.chain(self.slots.iter().map(|slot| slot.name())) {
            self.check_inherited(&class, name);
        }
        self.super_type = Some(SuperType {
            class,
            link: Box::new(SuperLink { get, get_mut }),
        });
        self
    }

    /// Declares an attribute backed by a member of `T`.
    pub fn field<V: Value>(
        &mut self,
        name: &str,
        description: &str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        self.check_name(name);
        self.attributes
            .push(Attribute::field(name, description, get, get_mut));
        self
    }

    /// Declares an attribute read through a getter and written through a
    /// setter.
    pub fn property<V: Value>(
        &mut self,
        name: &str,
        description: &str,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> &mut Self {
        self.check_name(name);
        self.attributes
            .push(Attribute::property(name, description, get, set));
        self
    }

    /// Declares a signal. Signals are attributes: their connections are
    /// archived with the object.
    pub fn signal<A: SignalArgs>(
        &mut self,
        name: &str,
        description: &str,
        get: fn(&T) -> &Signal<A>,
        get_mut: fn(&mut T) -> &mut Signal<A>,
    ) -> &mut Self {
        self.field(name, description, get, get_mut)
    }

    /// Declares a slot signals with arguments `A` can connect to.
    pub fn slot<A: SignalArgs>(
        &mut self,
        name: &str,
        description: &str,
        method: fn(&mut T, A),
    ) -> &mut Self {
        self.check_name(name);
        self.slots
            .push(Arc::new(SlotAttribute::new(name, description, method)));
        self
    }

    #[track_caller]
    fn check_name(&self, name: &str) {
        assert!(
            !RESERVED_NAMES.contains(&name),
            "`{name}` is a reserved name and cannot be declared by class `{}`",
            T::class_name()
        );
        let taken = self.attributes.iter().any(|a| a.name() == name)
            || self.slots.iter().any(|s| s.name() == name);
        assert!(!taken, "class `{}` declares `{name}` twice", T::class_name());
        if let Some(sup) = &self.super_type {
            self.check_inherited(&sup.class, name);
        }
    }

    #[track_caller]
    fn check_inherited(&self, class: &ObjectType, name: &str) {
        assert!(
            class.attribute(name).is_none() && class.slot(name).is_none(),
            "class `{}` redeclares `{name}` inherited from `{}`",
            T::class_name(),
            class.name()
        );
    }

    pub(crate) fn build(self) -> ObjectType {
        ObjectType {
            name: T::class_name().into_owned(),
            description: self.description,
            type_id: TypeId::of::<T>(),
            size: size_of::<ObjectHeader>() + size_of::<T>(),
            is_abstract: self.is_abstract,
            super_type: self.super_type,
            attributes: self.attributes,
            slots: self.slots,
            construct: construct_default::<T>,
        }
    }
}
