//! Object serialization through an [`ArchiveTree`](vc_archive::ArchiveTree).
//!
//! An object is archived as a map:
//!
//! ```text
//! { "class": "Bar", "id": "Bar", <attributes...>, "aspects": [ ... ] }
//! ```
//!
//! `class` names the value class (the base class for a composite), `id` is
//! the object's identity, attributes follow in declaration order with super
//! class attributes first, and `aspects` lists the aspect objects of a
//! composite.
//!
//! Links between objects ([`Ref`](crate::relation::Ref) and
//! [`Signal`](crate::relation::Signal) connections) are written and read
//! through deferred patches. Writing records where an id must go and fills
//! it in once the whole object tree is written; reading records which id is
//! wanted and re-links it once every object exists.

// -----------------------------------------------------------------------------
// Modules

mod archive;
mod context;
mod patch;

// -----------------------------------------------------------------------------
// Exports

pub use archive::Archive;
pub use context::{DeserializeContext, ResolveContext, SerializeContext};
pub use patch::Ticket;
