#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

//! Runtime reflection and object serialization.
//!
//! Classes describe themselves once through an
//! [`ObjectTypeBuilder`](object::ObjectTypeBuilder): their attributes, their
//! signals and their slots. The resulting [`ObjectType`](object::ObjectType)
//! metadata drives construction, casting, signal dispatch and the
//! [`Archive`](serde::Archive) round trip.
//!
//! Objects live in a [`Universe`](universe::Universe), which owns their
//! storage and their unique string identities. A
//! [`CompositeType`](object::CompositeType) glues a base class and a list of
//! aspects into one allocation-like unit; every part of a composite can be
//! cast to every other part.
//!
//! # Examples
//!
//! ```
//! use vc_object::object::{Object, ObjectTypeBuilder};
//! use vc_object::registry::TypeRegistry;
//! use vc_object::serde::Archive;
//! use vc_object::universe::Universe;
//!
//! #[derive(Default)]
//! struct Lamp {
//!     watts: i32,
//! }
//!
//! impl Object for Lamp {
//!     fn describe(class: &mut ObjectTypeBuilder<'_, Self>) {
//!         class.field("watts", "Power draw", |s| &s.watts, |s| &mut s.watts);
//!     }
//! }
//!
//! let mut registry = TypeRegistry::new();
//! let mut universe = Universe::new();
//! let lamp = universe.create::<Lamp>(&mut registry, "Lamp");
//! universe.get_mut::<Lamp>(lamp).unwrap().watts = 60;
//!
//! let mut archive = Archive::new();
//! archive.serialize(lamp, &universe);
//!
//! let mut other = Universe::new();
//! let copy = archive.deserialize(&mut other, &mut registry).unwrap();
//! assert_eq!(other.get::<Lamp>(copy).unwrap().watts, 60);
//! assert_eq!(other.id_of(copy), Some("Lamp"));
//! ```

// -----------------------------------------------------------------------------
// Extern Self

extern crate self as vc_object;

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod hash;

pub mod object;
pub mod registry;
pub mod relation;
pub mod serde;
pub mod types;
pub mod universe;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::DeserializeError;
pub use vc_archive as archive;
