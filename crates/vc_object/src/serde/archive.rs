use alloc::vec::Vec;
use core::fmt;
use core::mem;

use vc_archive::{ArchiveTree, NodeId, TextStyle, TextWriter};

use crate::error::DeserializeError;
use crate::registry::TypeRegistry;
use crate::serde::context::Created;
use crate::serde::patch::{PatchQueues, ResolvedConnection};
use crate::serde::{DeserializeContext, ResolveContext, SerializeContext};
use crate::universe::{ObjectId, Universe};

/// An archive tree together with the patch queues of one serialization
/// pass.
///
/// The queues are empty between calls; each of
/// [`serialize`](Archive::serialize) and [`deserialize`](Archive::deserialize)
/// drains what it registered before returning.
///
/// # Examples
///
/// ```
/// use vc_object::object::{Object, ObjectTypeBuilder};
/// use vc_object::registry::TypeRegistry;
/// use vc_object::serde::Archive;
/// use vc_object::universe::Universe;
///
/// #[derive(Default)]
/// struct Counter {
///     value: i64,
/// }
///
/// impl Object for Counter {
///     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
///         class.field("value", "Current count", |s| &s.value, |s| &mut s.value);
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// let mut universe = Universe::new();
/// let counter = universe.create::<Counter>(&mut registry, "Clicks");
/// universe.get_mut::<Counter>(counter).unwrap().value = 3;
///
/// let mut archive = Archive::new();
/// archive.serialize(counter, &universe);
/// assert_eq!(
///     archive.to_string(),
///     "{ \"root\": {\n    \"class\": \"Counter\",\n    \"id\": \"Clicks\",\n    \"value\": 3\n  }\n}\n",
/// );
/// ```
#[derive(Default)]
pub struct Archive {
    tree: ArchiveTree,
    queues: PatchQueues,
}

impl Archive {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tree(&self) -> &ArchiveTree {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut ArchiveTree {
        &mut self.tree
    }

    #[inline]
    pub fn into_tree(self) -> ArchiveTree {
        self.tree
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The child of the root map under `key`, or the empty sentinel.
    #[inline]
    pub fn get(&self, key: &str) -> NodeId {
        self.tree.key(self.tree.root(), key)
    }

    /// The child of the root map under `key`, created if missing.
    #[inline]
    pub fn entry(&mut self, key: &str) -> NodeId {
        let root = self.tree.root();
        self.tree.key_mut(root, key)
    }

    /// Writes the archive in its text form with a custom layout.
    pub fn write_text<W: fmt::Write + ?Sized>(&self, out: &mut W, style: TextStyle) -> fmt::Result {
        TextWriter::with_style(&self.tree, style).write_document(out)
    }

    /// Replaces the tree with the archive of `object` and everything it
    /// owns.
    pub fn serialize(&mut self, object: ObjectId, universe: &Universe) {
        debug_assert!(self.queues.is_empty(), "patch queues left over");
        self.tree.reset();
        let root = self.tree.root();
        SerializeContext::new(&mut self.tree, &mut self.queues.ids, universe)
            .serialize_object(object, root);

        let patches = mem::take(&mut self.queues.ids);
        log::debug!("filling {} object id(s)", patches.len());
        for patch in patches {
            match patch.target.and_then(|target| universe.id_of(target)) {
                Some(id) => self.tree.set(patch.node, id),
                None => {
                    if let Some(target) = patch.target {
                        log::warn!("reference to dead object {target:?} written as null");
                    }
                    self.tree.clear(patch.node);
                }
            }
        }
    }

    /// Recreates the archived object, and everything it owns, in
    /// `universe`.
    ///
    /// Identities are kept where they are free in `universe`; colliding
    /// ones are made unique and reported. References and connections are
    /// re-linked after every object exists, and links that cannot be
    /// resolved are reported and left empty.
    ///
    /// # Errors
    ///
    /// If the root is not an object map, or names a class that is not
    /// registered or is abstract. Nested objects that fail the same way
    /// are reported and skipped.
    pub fn deserialize(
        &mut self,
        universe: &mut Universe,
        registry: &mut TypeRegistry,
    ) -> Result<ObjectId, DeserializeError> {
        debug_assert!(self.queues.is_empty(), "patch queues left over");
        let root = self.tree.root();
        let mut cx = DeserializeContext::new(&self.tree, &mut self.queues, universe, registry);
        let result = cx.try_deserialize_object(root);
        let Created {
            objects,
            archived_ids,
        } = cx.into_created();

        if let Err(error) = &result {
            log::error!("cannot read archive root: {error}");
        }

        let lookup = |id: &str| {
            archived_ids
                .get(id)
                .copied()
                .or_else(|| universe.get_object(id))
        };
        let references = self.resolve_references(universe, lookup);
        let connections = self.resolve_connections(universe, lookup);
        log::debug!(
            "linking {} object(s), {} reference(s), {} connection(s)",
            objects.len(),
            references.len(),
            connections.len()
        );
        let cx = ResolveContext::new(&references, &connections);
        for object in objects {
            universe.resolve_object(object, &cx);
        }
        result
    }

    fn resolve_references(
        &mut self,
        universe: &Universe,
        lookup: impl Fn(&str) -> Option<ObjectId>,
    ) -> Vec<Option<ObjectId>> {
        mem::take(&mut self.queues.references)
            .into_iter()
            .map(|patch| {
                let Some(object) = lookup(&patch.id) else {
                    log::warn!("unresolved reference: no object `{}`", patch.id);
                    return None;
                };
                let target = universe.cast_to_class(object, patch.class);
                if target.is_none() {
                    log::warn!(
                        "unresolved reference: `{}` is not a `{}`",
                        patch.id,
                        patch.class_name
                    );
                }
                target
            })
            .collect()
    }

    fn resolve_connections(
        &mut self,
        universe: &Universe,
        lookup: impl Fn(&str) -> Option<ObjectId>,
    ) -> Vec<Option<ResolvedConnection>> {
        mem::take(&mut self.queues.connections)
            .into_iter()
            .map(|patch| {
                let Some(receiver) = lookup(&patch.receiver) else {
                    log::warn!("unresolved connection: no object `{}`", patch.receiver);
                    return None;
                };
                let Some(slot) = universe.slot_by_name(receiver, &patch.slot) else {
                    log::warn!(
                        "unresolved connection: `{}` has no slot `{}`",
                        patch.receiver,
                        patch.slot
                    );
                    return None;
                };
                if !slot.accepts(patch.signature) {
                    log::warn!(
                        "unresolved connection: slot `{}` takes ({}), signal sends ({})",
                        patch.slot,
                        slot.signature(),
                        patch.signature_name
                    );
                    return None;
                }
                Some(ResolvedConnection {
                    receiver,
                    slot: slot.clone(),
                })
            })
            .collect()
    }
}

impl From<ArchiveTree> for Archive {
    fn from(tree: ArchiveTree) -> Self {
        Self {
            tree,
            queues: PatchQueues::default(),
        }
    }
}

impl fmt::Display for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}
