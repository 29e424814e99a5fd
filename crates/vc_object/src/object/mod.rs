//! Object classes and their reflected metadata.
//!
//! A class is any `Default + 'static` type implementing [`Object`]. Its
//! [`describe`](Object::describe) hook fills an [`ObjectTypeBuilder`] with
//! the class's super class, attributes, signals and slots; the
//! [`TypeRegistry`](crate::registry::TypeRegistry) turns that description
//! into a shared [`ObjectType`].
//!
//! A [`CompositeType`] combines a base class with an ordered list of aspects
//! (classes or other composites). [`DerivedType`] is the common handle for
//! both kinds of instantiable types.

// -----------------------------------------------------------------------------
// Modules

mod attribute;
mod base;
mod builder;
mod cast;
mod composite;
mod derived;
mod object_type;
mod slot;

// -----------------------------------------------------------------------------
// Exports

pub use attribute::Attribute;
pub use base::{BaseObject, Object};
pub use builder::ObjectTypeBuilder;
pub use composite::CompositeType;
pub use derived::DerivedType;
pub use object_type::ObjectType;
pub use slot::{SlotAttribute, SlotInvoke};

pub(crate) use cast::CastTarget;

/// Names every object map reserves for the archive itself.
pub const RESERVED_NAMES: &[&str] = &["class", "id", "aspects"];
