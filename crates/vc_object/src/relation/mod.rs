//! Attribute types that relate objects to one another.
//!
//! - [`Ref`] points at another object, checked against a class.
//! - [`Signal`] holds connections to slots of other objects.
//! - [`ChildList`] owns a list of nested objects that are archived inline.
//!
//! References and connections are archived by object id and re-linked in
//! a patch pass once the whole archive has been read, so they may point
//! forward, backward or across the object tree.

// -----------------------------------------------------------------------------
// Modules

mod child_list;
mod reference;
mod signal;

// -----------------------------------------------------------------------------
// Exports

pub use child_list::ChildList;
pub use reference::Ref;
pub use signal::{Connection, Signal, SignalArgs};

pub(crate) use signal::dispatch_all;
