//! Object storage and identity.

// -----------------------------------------------------------------------------
// Modules

mod ident;
mod universe;

// -----------------------------------------------------------------------------
// Exports

pub use ident::ObjectId;
pub use universe::{ObjectHeader, Universe};
