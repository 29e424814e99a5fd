//! Paths used by `impl_enum_value!`. Not public API.

pub use alloc::borrow::Cow;

pub use vc_archive::NodeId;
