use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use vc_archive::{ArchiveTree, NodeId};

use crate::error::DeserializeError;
use crate::hash::HashMap;
use crate::object::{DerivedType, Object, SlotAttribute};
use crate::registry::TypeRegistry;
use crate::relation::SignalArgs;
use crate::serde::patch::{
    ConnectionPatch, IdPatch, PatchQueues, ReferencePatch, ResolvedConnection, Ticket,
};
use crate::types::Type;
use crate::universe::{ObjectId, Universe};

// -----------------------------------------------------------------------------
// SerializeContext

/// State of one [`Archive::serialize`](crate::serde::Archive::serialize)
/// call, handed to every [`Value::serialize`](crate::types::Value::serialize).
pub struct SerializeContext<'a> {
    tree: &'a mut ArchiveTree,
    ids: &'a mut Vec<IdPatch>,
    universe: &'a Universe,
}

impl<'a> SerializeContext<'a> {
    pub(crate) fn new(
        tree: &'a mut ArchiveTree,
        ids: &'a mut Vec<IdPatch>,
        universe: &'a Universe,
    ) -> Self {
        Self {
            tree,
            ids,
            universe,
        }
    }

    #[inline]
    pub fn tree(&self) -> &ArchiveTree {
        &*self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut ArchiveTree {
        &mut *self.tree
    }

    #[inline]
    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// Arranges for `node` to receive the id of `target` once the whole
    /// object tree is written. A `None` or dead target writes `null`.
    pub fn defer_reference(&mut self, node: NodeId, target: Option<ObjectId>) {
        self.ids.push(IdPatch { node, target });
    }

    /// Writes `object` as an object map into `node`.
    pub fn serialize_object(&mut self, object: ObjectId, node: NodeId) {
        let universe = self.universe;
        let Some(ty) = universe.type_of(object) else {
            log::warn!("skipping dead object {object:?}");
            self.tree.clear(node);
            return;
        };
        let class = ty.value_class();

        self.tree.set_map(node);
        let class_node = self.tree.key_mut(node, "class");
        self.tree.set(class_node, class.name());
        let id_node = self.tree.key_mut(node, "id");
        self.tree.set(id_node, universe.id_of(object).unwrap_or_default());

        if let Some(value) = universe.value(object) {
            class.serialize_value(value, node, self);
        }

        if let DerivedType::Composite(composite) = ty {
            composite.assert_frozen("be serialized");
            let aspects = self.tree.key_mut(node, "aspects");
            self.tree.set_array(aspects);
            for &aspect in universe.aspects(object) {
                let item = self.tree.push(aspects);
                self.serialize_object(aspect, item);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// DeserializeContext

/// State of one [`Archive::deserialize`](crate::serde::Archive::deserialize)
/// call, handed to every [`Value::deserialize`](crate::types::Value::deserialize).
pub struct DeserializeContext<'a> {
    tree: &'a ArchiveTree,
    queues: &'a mut PatchQueues,
    universe: &'a mut Universe,
    registry: &'a mut TypeRegistry,
    created: Vec<ObjectId>,
    archived_ids: HashMap<String, ObjectId>,
    #[cfg(feature = "debug")]
    path: Vec<String>,
}

/// What one deserialization pass created.
pub(crate) struct Created {
    /// Topmost objects, in creation order.
    pub objects: Vec<ObjectId>,
    /// Objects by the id they carry in the archive, before any renaming.
    pub archived_ids: HashMap<String, ObjectId>,
}

impl<'a> DeserializeContext<'a> {
    pub(crate) fn new(
        tree: &'a ArchiveTree,
        queues: &'a mut PatchQueues,
        universe: &'a mut Universe,
        registry: &'a mut TypeRegistry,
    ) -> Self {
        Self {
            tree,
            queues,
            universe,
            registry,
            created: Vec::new(),
            archived_ids: HashMap::default(),
            #[cfg(feature = "debug")]
            path: Vec::new(),
        }
    }

    /// The archive being read. Borrowed for the whole call, so nodes can be
    /// held while values are read through `self`.
    #[inline]
    pub fn tree(&self) -> &'a ArchiveTree {
        self.tree
    }

    #[inline]
    pub fn universe(&self) -> &Universe {
        &*self.universe
    }

    #[inline]
    pub(crate) fn into_created(self) -> Created {
        Created {
            objects: self.created,
            archived_ids: self.archived_ids,
        }
    }

    /// Registers the object id `id`, to be resolved to an object castable
    /// to `T` once every object exists.
    pub fn defer_reference<T: Object>(&mut self, id: &str) -> Ticket {
        let ticket = Ticket::new(self.queues.references.len());
        self.queues.references.push(ReferencePatch {
            id: id.into(),
            class: TypeId::of::<T>(),
            class_name: T::class_name().into_owned(),
        });
        ticket
    }

    /// Registers a connection to slot `slot` of object `receiver`, checked
    /// against the argument list `A`.
    pub fn defer_connection<A: SignalArgs>(&mut self, receiver: &str, slot: &str) -> Ticket {
        let ticket = Ticket::new(self.queues.connections.len());
        self.queues.connections.push(ConnectionPatch {
            receiver: receiver.into(),
            slot: slot.into(),
            signature: TypeId::of::<A>(),
            signature_name: A::signature(),
        });
        ticket
    }

    /// Creates an object from the map at `node`. Failures are logged and
    /// yield `None`.
    pub fn deserialize_object(&mut self, node: NodeId) -> Option<ObjectId> {
        match self.try_deserialize_object(node) {
            Ok(object) => Some(object),
            Err(error) => {
                log::error!("{}skipping object: {error}", self.location());
                None
            }
        }
    }

    pub(crate) fn try_deserialize_object(&mut self, node: NodeId) -> Result<ObjectId, DeserializeError> {
        let tree = self.tree;
        if !tree.is_map(node) {
            return Err(DeserializeError::ExpectedObject {
                found: tree.kind(node),
            });
        }
        let ty = self.resolve_type(node)?;

        let requested = tree.get_str(tree.key(node, "id"));
        if requested.is_none() {
            log::warn!("{}object of class `{}` has no id", self.location(), ty.name());
        }
        let requested = requested.unwrap_or_default();
        let object = self.universe.create_object(&ty, requested);
        self.record_id(object, requested);
        self.created.push(object);

        self.name_aspects(object, node);
        self.deserialize_into(object, node);
        Ok(object)
    }

    /// The type described by the map at `node`: its class, or a composite
    /// if the map lists aspects.
    fn resolve_type(&mut self, node: NodeId) -> Result<DerivedType, DeserializeError> {
        let tree = self.tree;
        let name = tree
            .get_str(tree.key(node, "class"))
            .ok_or(DeserializeError::MissingClass)?;
        let Some(class) = self.registry.get(name).cloned() else {
            return Err(DeserializeError::UnregisteredClass { class: name.into() });
        };
        let aspects = tree.key(node, "aspects");
        if tree.array_len(aspects) == 0 {
            // Only a composite may sit on an abstract base.
            if class.is_abstract() {
                return Err(DeserializeError::AbstractClass { class: name.into() });
            }
            return Ok(DerivedType::Object(class));
        }
        let mut types = Vec::with_capacity(tree.array_len(aspects));
        for &aspect in tree.elements(aspects) {
            types.push(self.resolve_type(aspect)?);
        }
        Ok(DerivedType::Composite(self.registry.composite(&class, types)))
    }

    fn deserialize_into(&mut self, object: ObjectId, node: NodeId) {
        let Some(ty) = self.universe.type_of(object).cloned() else {
            return;
        };
        #[cfg(feature = "debug")]
        self.path.push(ty.name().into());

        let class = ty.value_class().clone();
        if let Some(mut value) = self.universe.take_value(object) {
            class.deserialize_value(&mut *value, node, self);
            self.universe.restore_value(object, value);
        }

        let tree = self.tree;
        let aspect_nodes = tree.key(node, "aspects");
        let aspects = self.universe.aspects(object).to_vec();
        for (index, aspect) in aspects.into_iter().enumerate() {
            self.deserialize_into(aspect, tree.at(aspect_nodes, index));
        }

        #[cfg(feature = "debug")]
        self.path.pop();
    }

    /// Gives every aspect under `object` its archived id. Must run before
    /// any value under `object` is read.
    fn name_aspects(&mut self, object: ObjectId, node: NodeId) {
        let mut aspects = Vec::new();
        self.collect_aspects(object, node, &mut aspects);
        for &(aspect, _) in &aspects {
            self.universe.release_id(aspect);
        }
        for (aspect, id) in aspects {
            match id {
                Some(id) => {
                    self.universe.rename_object(aspect, id);
                    self.record_id(aspect, id);
                }
                None => {
                    let name = self
                        .universe
                        .type_of(aspect)
                        .map(|ty| String::from(ty.name()))
                        .unwrap_or_default();
                    self.universe.rename_object(aspect, &name);
                }
            }
        }
    }

    fn collect_aspects(
        &mut self,
        object: ObjectId,
        node: NodeId,
        out: &mut Vec<(ObjectId, Option<&'a str>)>,
    ) {
        let Some(DerivedType::Composite(composite)) = self.universe.type_of(object).cloned() else {
            return;
        };
        let tree = self.tree;
        let aspect_nodes = tree.key(node, "aspects");
        let aspects = self.universe.aspects(object).to_vec();
        for (index, aspect) in aspects.into_iter().enumerate() {
            let aspect_node = tree.at(aspect_nodes, index);
            self.universe
                .set_offset(aspect, composite.aspect_offset(index));
            out.push((aspect, tree.get_str(tree.key(aspect_node, "id"))));
            self.collect_aspects(aspect, aspect_node, out);
        }
    }

    fn record_id(&mut self, object: ObjectId, requested: &str) {
        if requested.is_empty() {
            return;
        }
        let given = self.universe.id_of(object).unwrap_or_default();
        if given != requested {
            log::warn!("{}object `{requested}` renamed to `{given}`", self.location());
        }
        if self.archived_ids.insert(requested.into(), object).is_some() {
            log::warn!("{}archive uses the id `{requested}` twice", self.location());
        }
    }

    fn location(&self) -> Location<'_> {
        #[cfg(feature = "debug")]
        let path = self.path.as_slice();
        #[cfg(not(feature = "debug"))]
        let path: &[String] = &[];
        Location(path)
    }
}

/// Class path of the object being read, as a log message prefix.
struct Location<'p>(&'p [String]);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        for (index, class) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(class)?;
        }
        f.write_str(": ")
    }
}

// -----------------------------------------------------------------------------
// ResolveContext

/// Results of the patch pass, handed to every
/// [`Value::resolve`](crate::types::Value::resolve).
pub struct ResolveContext<'a> {
    references: &'a [Option<ObjectId>],
    connections: &'a [Option<ResolvedConnection>],
}

impl<'a> ResolveContext<'a> {
    pub(crate) fn new(
        references: &'a [Option<ObjectId>],
        connections: &'a [Option<ResolvedConnection>],
    ) -> Self {
        Self {
            references,
            connections,
        }
    }

    /// The object a reference ticket resolved to.
    pub fn reference(&self, ticket: Ticket) -> Option<ObjectId> {
        self.references.get(ticket.index()).copied().flatten()
    }

    /// The receiver and slot a connection ticket resolved to.
    pub fn connection(&self, ticket: Ticket) -> Option<(ObjectId, &'a Arc<SlotAttribute>)> {
        let resolved = self.connections.get(ticket.index())?.as_ref()?;
        Some((resolved.receiver, &resolved.slot))
    }
}
