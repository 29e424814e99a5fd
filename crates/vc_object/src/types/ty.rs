use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::types::Value;

// -----------------------------------------------------------------------------
// Type

/// Metadata shared by every kind of type: leaves, enumerations, classes and
/// composites.
pub trait Type: Send + Sync + 'static {
    /// The name used in archives and diagnostics.
    fn name(&self) -> &str;

    /// Storage footprint in bytes. Objects include their header.
    fn size(&self) -> usize;

    /// Abstract types cannot be instantiated.
    fn is_abstract(&self) -> bool {
        false
    }
}

// -----------------------------------------------------------------------------
// ValueType

/// Metadata of a [`Value`] type.
///
/// # Examples
///
/// ```
/// use vc_object::types::{Type, ValueType};
///
/// let ty = ValueType::of::<Vec<i32>>();
/// assert_eq!(ty.name(), "Array<int32>");
///
/// let value = ty.construct();
/// assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&Vec::new()));
/// ```
#[derive(Clone)]
pub struct ValueType {
    name: Cow<'static, str>,
    size: usize,
    type_id: TypeId,
    construct: fn() -> Box<dyn Any>,
}

fn construct_default<V: Value>() -> Box<dyn Any> {
    Box::new(V::default())
}

impl ValueType {
    pub fn of<V: Value>() -> Self {
        Self {
            name: V::type_name(),
            size: size_of::<V>(),
            type_id: TypeId::of::<V>(),
            construct: construct_default::<V>,
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// A boxed default value of this type.
    #[inline]
    pub fn construct(&self) -> Box<dyn Any> {
        (self.construct)()
    }
}

impl Type for ValueType {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ValueType {}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueType")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}
