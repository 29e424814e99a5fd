use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::object::{CastTarget, DerivedType, ObjectType};
use crate::types::Type;
use crate::universe::{ObjectId, Universe};

/// A base class combined with an ordered list of aspects.
///
/// Element `0` of a composite is its base; element `i > 0` is aspect
/// `i - 1`. Every element has a fixed offset in the composite's layout, the
/// base at `0` followed by each aspect in order.
///
/// A composite is mutable until [`freeze`](CompositeType::freeze) is
/// called; it can only be instantiated, serialized or cast through once
/// frozen.
///
/// # Examples
///
/// ```
/// use vc_object::object::{CompositeType, Object, ObjectTypeBuilder};
/// use vc_object::registry::TypeRegistry;
/// use vc_object::types::Type;
///
/// #[derive(Default)]
/// struct Body(f32);
///
/// #[derive(Default)]
/// struct Sound(u8);
///
/// impl Object for Body {
///     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
///         class.field("mass", "", |s| &s.0, |s| &mut s.0);
///     }
/// }
///
/// impl Object for Sound {
///     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
///         class.field("volume", "", |s| &s.0, |s| &mut s.0);
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// let mut ty = CompositeType::new("Bell", registry.register::<Body>());
/// ty.add_aspect(registry.register::<Sound>());
/// ty.freeze();
///
/// assert_eq!(ty.len(), 2);
/// assert_eq!(ty.offset_of_element(0), Some(0));
/// assert_eq!(ty.offset_of_element(1), Some(registry.register::<Body>().size()));
/// assert_eq!(ty.signature(), "Body[Sound]");
/// ```
pub struct CompositeType {
    name: String,
    base: Arc<ObjectType>,
    aspects: Vec<DerivedType>,
    offsets: Vec<usize>,
    size: usize,
    frozen: bool,
}

impl CompositeType {
    pub fn new(name: &str, base: Arc<ObjectType>) -> Self {
        let size = base.size();
        Self {
            name: name.into(),
            base,
            aspects: Vec::new(),
            offsets: Vec::new(),
            size,
            frozen: false,
        }
    }

    /// Appends an aspect.
    ///
    /// # Panics
    ///
    /// If the composite is frozen or the aspect type is abstract.
    pub fn add_aspect(&mut self, aspect: impl Into<DerivedType>) -> &mut Self {
        let aspect = aspect.into();
        assert!(
            !self.frozen,
            "cannot add aspect `{}` to frozen composite `{}`",
            aspect.name(),
            self.name,
        );
        assert!(
            !aspect.is_abstract(),
            "abstract type `{}` cannot be an aspect of `{}`",
            aspect.name(),
            self.name,
        );
        self.offsets.push(self.size);
        self.size += aspect.size();
        self.aspects.push(aspect);
        self
    }

    /// Locks the layout. Freezing twice is harmless.
    #[inline]
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    pub fn base_type(&self) -> &Arc<ObjectType> {
        &self.base
    }

    #[inline]
    pub fn aspects(&self) -> &[DerivedType] {
        &self.aspects
    }

    /// Number of elements, the base included.
    #[inline]
    pub fn len(&self) -> usize {
        self.aspects.len() + 1
    }

    /// The type of element `index`.
    pub fn type_of_element(&self, index: usize) -> Option<DerivedType> {
        match index {
            0 => Some(DerivedType::Object(self.base.clone())),
            _ => self.aspects.get(index - 1).cloned(),
        }
    }

    pub fn offset_of_element(&self, index: usize) -> Option<usize> {
        match index {
            0 => Some(0),
            _ => self.offsets.get(index - 1).copied(),
        }
    }

    /// Layout offset of aspect `index`.
    #[inline]
    pub fn aspect_offset(&self, index: usize) -> usize {
        self.offsets[index]
    }

    /// Structural description, as in `"Scene[Foo, Bar[Baz]]"`. Two
    /// composites with the same signature have the same layout.
    pub fn signature(&self) -> String {
        let mut out = String::from(self.base.name());
        out.push('[');
        for (index, aspect) in self.aspects.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            match aspect {
                DerivedType::Object(class) => out.push_str(class.name()),
                DerivedType::Composite(composite) => out.push_str(&composite.signature()),
            }
        }
        out.push(']');
        out
    }

    #[track_caller]
    pub(crate) fn assert_frozen(&self, operation: &str) {
        assert!(
            self.frozen,
            "composite `{}` must be frozen to {operation}",
            self.name
        );
    }

    // -------------------------------------------------------------------------
    // Casting

    /// Casts `object`, an instance of this composite.
    ///
    /// Searches this instance and its aspects first, skipping the subtree
    /// `avoid` the search came up from, then continues with the parent.
    pub(crate) fn cast(
        &self,
        universe: &Universe,
        to: &CastTarget<'_>,
        object: ObjectId,
        avoid: Option<ObjectId>,
    ) -> Option<ObjectId> {
        self.assert_frozen("cast");
        if to.is_composite(self) {
            return Some(object);
        }
        self.find_instance_down(universe, to, object, avoid)
            .or_else(|| universe.cast_from_parent(to, object))
    }

    fn find_instance_down(
        &self,
        universe: &Universe,
        to: &CastTarget<'_>,
        object: ObjectId,
        avoid: Option<ObjectId>,
    ) -> Option<ObjectId> {
        if to.matches_class(&self.base) {
            return Some(object);
        }
        for &child in universe.aspects(object) {
            if Some(child) == avoid {
                continue;
            }
            let found = match universe.type_of(child) {
                Some(DerivedType::Composite(composite)) if to.is_composite(composite) => {
                    Some(child)
                }
                Some(DerivedType::Composite(composite)) => {
                    composite.find_instance_down(universe, to, child, None)
                }
                Some(DerivedType::Object(class)) => to.matches_class(class).then_some(child),
                None => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// The closest instance of exactly this composite among `object` and
    /// its ancestors.
    pub(crate) fn find_self_up(&self, universe: &Universe, object: ObjectId) -> Option<ObjectId> {
        let mut current = Some(object);
        while let Some(id) = current {
            if let Some(DerivedType::Composite(composite)) = universe.type_of(id)
                && core::ptr::eq(Arc::as_ptr(composite), self)
            {
                return Some(id);
            }
            current = universe.parent(id);
        }
        None
    }
}

impl Type for CompositeType {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }
}

impl fmt::Debug for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeType")
            .field("name", &self.name)
            .field("signature", &self.signature())
            .field("size", &self.size)
            .field("frozen", &self.frozen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::CompositeType;
    use crate::object::{Object, ObjectTypeBuilder};
    use crate::registry::TypeRegistry;
    use crate::types::Type;

    #[derive(Default)]
    struct Part(i32);

    impl Object for Part {
        fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
            class.field("value", "", |s| &s.0, |s| &mut s.0);
        }
    }

    #[derive(Default)]
    struct Idea;

    impl Object for Idea {
        fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
            class.abstract_class();
        }
    }

    #[test]
    fn offsets_follow_aspect_order() {
        let mut registry = TypeRegistry::new();
        let part = registry.register::<Part>();

        let mut inner = CompositeType::new("Inner", part.clone());
        inner.add_aspect(part.clone());
        inner.freeze();
        let inner = Arc::new(inner);

        let mut outer = CompositeType::new("Outer", part.clone());
        outer.add_aspect(part.clone()).add_aspect(inner.clone());
        outer.freeze();

        assert_eq!(inner.size(), 2 * part.size());
        assert_eq!(outer.size(), 4 * part.size());
        assert_eq!(outer.offset_of_element(1), Some(part.size()));
        assert_eq!(outer.offset_of_element(2), Some(2 * part.size()));
        assert_eq!(outer.offset_of_element(3), None);
        assert_eq!(outer.signature(), "Part[Part, Part[Part]]");
        assert_eq!(outer.type_of_element(2).unwrap().name(), "Inner");
    }

    #[test]
    #[should_panic(expected = "frozen")]
    fn frozen_composite_rejects_aspects() {
        let mut registry = TypeRegistry::new();
        let part = registry.register::<Part>();
        let mut composite = CompositeType::new("Locked", part.clone());
        composite.freeze();
        composite.add_aspect(part);
    }

    #[test]
    #[should_panic(expected = "abstract")]
    fn abstract_aspect_is_rejected() {
        let mut registry = TypeRegistry::new();
        let part = registry.register::<Part>();
        let idea = registry.register::<Idea>();
        CompositeType::new("Thought", part).add_aspect(idea);
    }
}
