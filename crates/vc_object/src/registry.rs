//! The class registry.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::hash::HashMap;
use crate::object::{BaseObject, CompositeType, DerivedType, Object, ObjectType, ObjectTypeBuilder};
use crate::types::Type;

/// Central store of class metadata.
///
/// Classes are looked up by name while reading archives. Composites read
/// from archives are synthesized here and cached by
/// [signature](CompositeType::signature), so every archive that uses the
/// same combination of aspects shares one frozen composite type.
///
/// # Examples
///
/// ```
/// use vc_object::object::{BaseObject, Object, ObjectTypeBuilder};
/// use vc_object::registry::TypeRegistry;
///
/// #[derive(Default)]
/// struct Note {
///     text: String,
/// }
///
/// impl Object for Note {
///     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
///         class.field("text", "Body of the note", |s| &s.text, |s| &mut s.text);
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// assert!(registry.contains("Object"));
///
/// let note = registry.register::<Note>();
/// assert!(std::sync::Arc::ptr_eq(&note, registry.get("Note").unwrap()));
/// assert!(note.is_a(std::any::TypeId::of::<BaseObject>()));
/// ```
pub struct TypeRegistry {
    classes: HashMap<String, Arc<ObjectType>>,
    by_type_id: HashMap<TypeId, Arc<ObjectType>>,
    composites: HashMap<String, Arc<CompositeType>>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding only the root class [`BaseObject`].
    pub fn new() -> Self {
        let mut registry = Self {
            classes: HashMap::default(),
            by_type_id: HashMap::default(),
            composites: HashMap::default(),
        };
        registry.register::<BaseObject>();
        registry
    }

    /// Describes and stores class `T`, or returns the stored metadata if
    /// `T` is already registered.
    pub fn register<T: Object>(&mut self) -> Arc<ObjectType> {
        if let Some(class) = self.by_type_id.get(&TypeId::of::<T>()) {
            return class.clone();
        }
        let mut builder = ObjectTypeBuilder::<T>::new(self);
        T::describe(&mut builder);
        let class = Arc::new(builder.build());

        log::debug!("registered class `{}`", class.name());
        if let Some(previous) = self.classes.insert(class.name().into(), class.clone()) {
            log::warn!(
                "class name `{}` is shared by two types, archives will use the latest",
                previous.name()
            );
        }
        self.by_type_id.insert(TypeId::of::<T>(), class.clone());
        class
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<ObjectType>> {
        self.classes.get(name)
    }

    #[inline]
    pub fn get_of<T: Object>(&self) -> Option<&Arc<ObjectType>> {
        self.by_type_id.get(&TypeId::of::<T>())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ObjectType>> {
        self.classes.values()
    }

    /// The frozen composite of `base` and `aspects`, created on first use.
    pub fn composite(&mut self, base: &Arc<ObjectType>, aspects: Vec<DerivedType>) -> Arc<CompositeType> {
        let mut composite = CompositeType::new(base.name(), base.clone());
        for aspect in aspects {
            composite.add_aspect(aspect);
        }
        composite.freeze();

        let signature = composite.signature();
        if let Some(cached) = self.composites.get(&signature) {
            return cached.clone();
        }
        log::debug!("synthesized composite `{signature}`");
        let composite = Arc::new(composite);
        self.composites.insert(signature, composite.clone());
        composite
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use super::TypeRegistry;
    use crate::object::{DerivedType, Object, ObjectTypeBuilder};
    use crate::types::Type;

    #[derive(Default)]
    struct Leaf {
        weight: f64,
    }

    impl Object for Leaf {
        fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
            class.field("weight", "", |s| &s.weight, |s| &mut s.weight);
        }
    }

    #[derive(Default)]
    struct Branch {
        leaf: Leaf,
        count: u32,
    }

    impl Object for Branch {
        fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
            class
                .super_type::<Leaf>(|s| &s.leaf, |s| &mut s.leaf)
                .field("count", "", |s| &s.count, |s| &mut s.count);
        }
    }

    #[derive(Default)]
    struct Clash {
        weight: f64,
    }

    impl Object for Clash {
        fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
            class
                .super_type::<Leaf>(|_| unreachable!(), |_| unreachable!())
                .field("weight", "", |s| &s.weight, |s| &mut s.weight);
        }
    }

    #[derive(Default)]
    struct Reserved(i32);

    impl Object for Reserved {
        fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
            class.field("id", "", |s| &s.0, |s| &mut s.0);
        }
    }

    #[test]
    fn register_pulls_in_super_classes() {
        let mut registry = TypeRegistry::new();
        let branch = registry.register::<Branch>();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("Leaf"));
        assert!(Arc::ptr_eq(branch.super_type().unwrap(), registry.get("Leaf").unwrap()));
        assert!(branch.attribute("weight").is_some());
        assert!(branch.attributes().iter().all(|a| a.name() != "weight"));
        assert!(Arc::ptr_eq(&branch, &registry.register::<Branch>()));
    }

    #[test]
    fn composites_are_cached_by_signature() {
        let mut registry = TypeRegistry::new();
        let leaf = registry.register::<Leaf>();
        let branch = registry.register::<Branch>();

        let first = registry.composite(&leaf, vec![DerivedType::Object(branch.clone())]);
        let second = registry.composite(&leaf, vec![DerivedType::Object(branch.clone())]);
        let other = registry.composite(&branch, vec![DerivedType::Object(leaf.clone())]);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert!(first.is_frozen());
        assert_eq!(first.name(), "Leaf");
    }

    #[test]
    #[should_panic(expected = "redeclares")]
    fn inherited_names_cannot_be_redeclared() {
        TypeRegistry::new().register::<Clash>();
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn reserved_names_are_rejected() {
        TypeRegistry::new().register::<Reserved>();
    }
}
