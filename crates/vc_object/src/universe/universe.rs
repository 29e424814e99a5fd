use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use slotmap::{SecondaryMap, SlotMap};

use crate::hash::HashMap;
use crate::object::{CastTarget, DerivedType, Object, ObjectType, SlotAttribute};
use crate::registry::TypeRegistry;
use crate::relation::{Connection, Signal, SignalArgs, dispatch_all};
use crate::serde::ResolveContext;
use crate::types::Type;
use crate::universe::ObjectId;
use crate::universe::ident::unique_name;

// -----------------------------------------------------------------------------
// ObjectHeader

/// Bookkeeping attached to every object.
#[derive(Debug, Clone)]
pub struct ObjectHeader {
    ty: DerivedType,
    offset: usize,
    parent: Option<ObjectId>,
}

impl ObjectHeader {
    /// The exact type the object was created as.
    #[inline]
    pub fn ty(&self) -> &DerivedType {
        &self.ty
    }

    /// Layout offset inside the enclosing composite, `0` for topmost
    /// objects.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The composite instance this object is an aspect of.
    #[inline]
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }
}

struct ObjectEntry {
    header: ObjectHeader,
    // `None` only while the value is checked out for deserialization.
    value: Option<Box<dyn Any>>,
    aspects: Vec<ObjectId>,
}

// -----------------------------------------------------------------------------
// Universe

/// Owns every object and its unique string identity.
///
/// Topmost objects are created with [`create_object`](Universe::create_object)
/// and destroyed with [`destroy`](Universe::destroy) or
/// [`clear`](Universe::clear). Instantiating a composite also creates one
/// object per aspect; aspects share the lifetime of their composite and
/// can be reached from any part of it through [`cast`](Universe::cast).
///
/// # Examples
///
/// ```
/// use vc_object::object::{Object, ObjectTypeBuilder};
/// use vc_object::registry::TypeRegistry;
/// use vc_object::universe::Universe;
///
/// #[derive(Default)]
/// struct Crate;
///
/// impl Object for Crate {
///     fn describe(_: &mut ObjectTypeBuilder<'_, Self>) {}
/// }
///
/// let mut registry = TypeRegistry::new();
/// let mut universe = Universe::new();
///
/// let a = universe.create::<Crate>(&mut registry, "Crate");
/// let b = universe.create::<Crate>(&mut registry, "Crate");
/// assert_eq!(universe.id_of(a), Some("Crate"));
/// assert_eq!(universe.id_of(b), Some("Crate01"));
///
/// assert!(!universe.rename_object(a, "Crate01"));
/// assert_eq!(universe.id_of(a), Some("Crate02"));
/// assert_eq!(universe.get_object("Crate02"), Some(a));
/// ```
#[derive(Default)]
pub struct Universe {
    objects: SlotMap<ObjectId, ObjectEntry>,
    names: HashMap<String, ObjectId>,
    ids: SecondaryMap<ObjectId, String>,
    topmost: Vec<ObjectId>,
    root: Option<ObjectId>,
}

impl Universe {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects, aspects included.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.objects.contains_key(object)
    }

    /// Live objects with their identities, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &str)> {
        self.ids.iter().map(|(object, id)| (object, id.as_str()))
    }

    /// Topmost objects in creation order.
    #[inline]
    pub fn topmost(&self) -> &[ObjectId] {
        &self.topmost
    }

    #[inline]
    pub fn header(&self, object: ObjectId) -> Option<&ObjectHeader> {
        self.objects.get(object).map(|entry| &entry.header)
    }

    #[inline]
    pub fn type_of(&self, object: ObjectId) -> Option<&DerivedType> {
        self.header(object).map(|header| &header.ty)
    }

    /// The class of the value stored in `object`.
    #[inline]
    pub fn class_of(&self, object: ObjectId) -> Option<&Arc<ObjectType>> {
        self.type_of(object).map(DerivedType::value_class)
    }

    #[inline]
    pub fn parent(&self, object: ObjectId) -> Option<ObjectId> {
        self.header(object)?.parent
    }

    /// The aspect instances of a composite instance, in aspect order.
    #[inline]
    pub fn aspects(&self, object: ObjectId) -> &[ObjectId] {
        self.objects
            .get(object)
            .map(|entry| entry.aspects.as_slice())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Lifecycle

    /// Creates a topmost instance of `ty`, then names it after `id`.
    ///
    /// # Panics
    ///
    /// If `ty` is abstract, or is a composite that is not frozen.
    pub fn create_object(&mut self, ty: &DerivedType, id: &str) -> ObjectId {
        assert!(
            !ty.is_abstract(),
            "cannot instantiate abstract type `{}`",
            ty.name()
        );
        let object = self.construct(ty, None, 0);
        self.topmost.push(object);
        self.rename_object(object, id);
        object
    }

    /// Creates a topmost instance of class `T`, registering `T` if needed.
    pub fn create<T: Object>(&mut self, registry: &mut TypeRegistry, id: &str) -> ObjectId {
        let class = registry.register::<T>();
        self.create_object(&DerivedType::Object(class), id)
    }

    /// Creates an object and marks it as the root of this universe.
    pub fn create_root(&mut self, ty: &DerivedType, id: &str) -> ObjectId {
        let object = self.create_object(ty, id);
        self.root = Some(object);
        object
    }

    #[inline]
    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    #[inline]
    pub fn set_root(&mut self, root: Option<ObjectId>) {
        self.root = root;
    }

    fn construct(&mut self, ty: &DerivedType, parent: Option<ObjectId>, offset: usize) -> ObjectId {
        let entry = ObjectEntry {
            header: ObjectHeader {
                ty: ty.clone(),
                offset,
                parent,
            },
            value: Some(ty.value_class().construct()),
            aspects: Vec::new(),
        };
        let object = self.objects.insert(entry);
        if let DerivedType::Composite(composite) = ty {
            composite.assert_frozen("be instantiated");
            let mut aspects = Vec::with_capacity(composite.aspects().len());
            for (index, aspect) in composite.aspects().iter().enumerate() {
                let child = self.construct(aspect, Some(object), composite.aspect_offset(index));
                self.rename_object(child, aspect.name());
                aspects.push(child);
            }
            self.objects[object].aspects = aspects;
        }
        object
    }

    /// Destroys a topmost object and its aspects.
    ///
    /// Returns `false` for unknown objects and for aspects, which only die
    /// with their composite.
    pub fn destroy(&mut self, object: ObjectId) -> bool {
        if self.header(object).is_none_or(|header| header.parent.is_some()) {
            return false;
        }
        self.topmost.retain(|o| *o != object);
        if self.root == Some(object) {
            self.root = None;
        }
        self.destruct(object);
        true
    }

    /// Destroys every object, in creation order.
    pub fn clear(&mut self) {
        for object in core::mem::take(&mut self.topmost) {
            self.destruct(object);
        }
        self.root = None;
        self.names.clear();
        self.ids.clear();
    }

    // Aspects are dropped last to first, then the base value.
    fn destruct(&mut self, object: ObjectId) {
        let Some(entry) = self.objects.remove(object) else {
            return;
        };
        for &child in entry.aspects.iter().rev() {
            self.destruct(child);
        }
        if let Some(id) = self.ids.remove(object) {
            self.names.remove(&id);
        }
        drop(entry);
    }

    // -------------------------------------------------------------------------
    // Identity

    /// Gives `object` the identity `id`, or a unique one derived from it.
    ///
    /// Returns `true` if `id` was used as is. Identities are at least two
    /// characters long; on a collision a two-digit counter is appended, or
    /// incremented if `id` already ends with one.
    pub fn rename_object(&mut self, object: ObjectId, id: &str) -> bool {
        if !self.objects.contains_key(object) {
            return false;
        }
        self.release_id(object);
        let entry = &self.objects[object];
        let exact = id.chars().count() >= 2 && !self.names.contains_key(id);
        let name = if exact {
            String::from(id)
        } else {
            unique_name(id, entry.header.ty.name(), |name| {
                self.names.contains_key(name)
            })
        };
        self.names.insert(name.clone(), object);
        self.ids.insert(object, name);
        exact
    }

    /// Drops the identity of `object` until it is renamed again.
    pub(crate) fn release_id(&mut self, object: ObjectId) {
        if let Some(id) = self.ids.remove(object) {
            self.names.remove(&id);
        }
    }

    #[inline]
    pub fn get_object(&self, id: &str) -> Option<ObjectId> {
        self.names.get(id).copied()
    }

    #[inline]
    pub fn id_of(&self, object: ObjectId) -> Option<&str> {
        self.ids.get(object).map(String::as_str)
    }

    // -------------------------------------------------------------------------
    // Casting

    /// Finds the part of `object`'s composite that is an instance of `to`.
    ///
    /// The search looks at `object` itself, then down through its aspects,
    /// then up to the enclosing composite and across its other aspects.
    /// Composite targets match only instances of that exact composite.
    pub fn cast(&self, object: ObjectId, to: &DerivedType) -> Option<ObjectId> {
        self.type_of(object)?.cast(self, to, object)
    }

    /// Like [`cast`](Universe::cast), matching any part whose class is or
    /// derives from `T`.
    pub fn cast_to<T: Object>(&self, object: ObjectId) -> Option<ObjectId> {
        self.cast_to_class(object, TypeId::of::<T>())
    }

    pub(crate) fn cast_to_class(&self, object: ObjectId, class: TypeId) -> Option<ObjectId> {
        let target = CastTarget::Class(class);
        match self.type_of(object)? {
            DerivedType::Object(ty) => ty.cast(self, &target, object),
            DerivedType::Composite(ty) => ty.cast(self, &target, object, None),
        }
    }

    /// Continues a cast in the composite enclosing `child`, skipping
    /// `child` itself.
    pub(crate) fn cast_from_parent(&self, to: &CastTarget<'_>, child: ObjectId) -> Option<ObjectId> {
        let parent = self.parent(child)?;
        match self.type_of(parent)? {
            DerivedType::Composite(composite) => composite.cast(self, to, parent, Some(child)),
            DerivedType::Object(class) => class.cast(self, to, parent),
        }
    }

    // -------------------------------------------------------------------------
    // Values

    /// The `T` part of `object`'s composite.
    pub fn get<T: Object>(&self, object: ObjectId) -> Option<&T> {
        let target = self.cast_to::<T>(object)?;
        let value = self.class_value(target, TypeId::of::<T>())?;
        value.downcast_ref::<T>()
    }

    pub fn get_mut<T: Object>(&mut self, object: ObjectId) -> Option<&mut T> {
        let target = self.cast_to::<T>(object)?;
        let value = self.class_value_mut(target, TypeId::of::<T>())?;
        value.downcast_mut::<T>()
    }

    /// The value of `object` narrowed to its `class` part.
    pub(crate) fn class_value(&self, object: ObjectId, class: TypeId) -> Option<&dyn Any> {
        let entry = self.objects.get(object)?;
        let value = entry.value.as_deref()?;
        entry.header.ty.value_class().project(value, class)
    }

    pub(crate) fn class_value_mut(&mut self, object: ObjectId, class: TypeId) -> Option<&mut dyn Any> {
        let entry = self.objects.get_mut(object)?;
        let value = entry.value.as_deref_mut()?;
        entry.header.ty.value_class().project_mut(value, class)
    }

    pub(crate) fn value(&self, object: ObjectId) -> Option<&dyn Any> {
        self.objects.get(object)?.value.as_deref()
    }

    /// Checks the value of `object` out, leaving the entry in place.
    pub(crate) fn take_value(&mut self, object: ObjectId) -> Option<Box<dyn Any>> {
        self.objects.get_mut(object)?.value.take()
    }

    pub(crate) fn restore_value(&mut self, object: ObjectId, value: Box<dyn Any>) {
        if let Some(entry) = self.objects.get_mut(object) {
            entry.value = Some(value);
        }
    }

    pub(crate) fn set_offset(&mut self, object: ObjectId, offset: usize) {
        if let Some(entry) = self.objects.get_mut(object) {
            entry.header.offset = offset;
        }
    }

    /// Runs the patch pass over `object` and its aspects.
    pub(crate) fn resolve_object(&mut self, object: ObjectId, cx: &ResolveContext<'_>) {
        let Some(class) = self.class_of(object).cloned() else {
            return;
        };
        if let Some(mut value) = self.take_value(object) {
            class.resolve_value(&mut *value, cx);
            self.restore_value(object, value);
        }
        for child in self.aspects(object).to_vec() {
            self.resolve_object(child, cx);
        }
    }

    // -------------------------------------------------------------------------
    // Signals

    /// Looks up slot `name` of the class of `object`.
    pub fn slot_by_name(&self, object: ObjectId, name: &str) -> Option<&Arc<SlotAttribute>> {
        self.type_of(object)?.slot(name)
    }

    /// Connects a signal of `source` to slot `slot` of `receiver`.
    ///
    /// Returns `false` if either object lacks the member, or if the slot
    /// takes other arguments than the signal.
    pub fn connect<T: Object, A: SignalArgs>(
        &mut self,
        source: ObjectId,
        signal: impl FnOnce(&mut T) -> &mut Signal<A>,
        receiver: ObjectId,
        slot: &str,
    ) -> bool {
        let Some(slot) = self.slot_by_name(receiver, slot).cloned() else {
            return false;
        };
        let Some(connection) = Connection::to_slot(receiver, slot) else {
            return false;
        };
        match self.get_mut::<T>(source) {
            Some(object) => {
                signal(object).connect(connection);
                true
            }
            None => false,
        }
    }

    /// Emits a signal of `source`. Returns the number of deliveries.
    ///
    /// Connections are snapshotted first, so slots may freely access the
    /// universe, including the emitting object.
    pub fn emit<T: Object, A: SignalArgs>(
        &mut self,
        source: ObjectId,
        signal: impl FnOnce(&T) -> &Signal<A>,
        args: A,
    ) -> usize {
        let Some(object) = self.get::<T>(source) else {
            return 0;
        };
        let connections = signal(object).connections().to_vec();
        dispatch_all(&connections, self, args)
    }
}

impl Drop for Universe {
    fn drop(&mut self) {
        self.clear();
    }
}
