//! Type metadata and the value contract of attribute types.
//!
//! Every attribute of an object class holds a [`Value`]: a leaf scalar, a
//! container of values, an enumeration, or one of the relation types of
//! [`relation`](crate::relation). All of them share the [`Type`] metadata
//! surface with classes and composites.

// -----------------------------------------------------------------------------
// Modules

mod container;
mod enumeration;
mod leaf;
mod ty;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use enumeration::{EnumEntry, EnumType, EnumValue};
pub use ty::{Type, ValueType};
pub use value::Value;

#[doc(hidden)]
pub use enumeration::{deserialize_enum, serialize_enum};
