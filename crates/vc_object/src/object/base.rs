use alloc::borrow::Cow;
use core::any::{Any, type_name};

use crate::object::ObjectTypeBuilder;

// -----------------------------------------------------------------------------
// Object

/// A reflected class.
///
/// # Examples
///
/// ```
/// use vc_object::object::{Object, ObjectTypeBuilder};
/// use vc_object::registry::TypeRegistry;
/// use vc_object::types::Type;
///
/// #[derive(Default)]
/// struct Shape {
///     sides: u8,
/// }
///
/// #[derive(Default)]
/// struct Square {
///     shape: Shape,
///     length: f32,
/// }
///
/// impl Object for Shape {
///     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
///         class
///             .abstract_class()
///             .field("sides", "Number of sides", |s| &s.sides, |s| &mut s.sides);
///     }
/// }
///
/// impl Object for Square {
///     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
///         class
///             .super_type::<Shape>(|s| &s.shape, |s| &mut s.shape)
///             .field("length", "Edge length", |s| &s.length, |s| &mut s.length);
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// let square = registry.register::<Square>();
/// assert_eq!(square.name(), "Square");
/// assert_eq!(square.super_type().map(|s| s.name()), Some("Shape"));
/// assert!(registry.get("Shape").unwrap().is_abstract());
/// ```
pub trait Object: Any + Default {
    /// The class name used in archives. Defaults to the unqualified type
    /// name without generic arguments.
    fn class_name() -> Cow<'static, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }

    fn describe(class: &mut ObjectTypeBuilder<'_, Self>);
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}

// -----------------------------------------------------------------------------
// BaseObject

/// The abstract root class, named `"Object"`.
///
/// Every class is-a `BaseObject`, whether or not it declares it as its
/// super class.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BaseObject;

impl Object for BaseObject {
    fn class_name() -> Cow<'static, str> {
        Cow::Borrowed("Object")
    }

    fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
        class
            .description("The root of every class")
            .abstract_class();
    }
}

#[cfg(test)]
mod tests {
    use super::short_type_name;

    mod nested {
        pub struct Thing<T>(pub core::marker::PhantomData<T>);
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name::<nested::Thing<u8>>(), "Thing");
        assert_eq!(short_type_name::<u8>(), "u8");
    }
}
