use alloc::string::String;

use thiserror::Error;
use vc_archive::NodeKind;

/// Fatal failures of [`Archive::deserialize`](crate::serde::Archive::deserialize).
///
/// Anything recoverable (an unknown enum name, a dangling reference, a slot
/// that cannot be found) is logged and skipped instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeserializeError {
    #[error("expected an object map, found {found}")]
    ExpectedObject { found: NodeKind },
    #[error("object node has no `class` string")]
    MissingClass,
    #[error("class `{class}` is not registered")]
    UnregisteredClass { class: String },
    #[error("class `{class}` is abstract and cannot be instantiated")]
    AbstractClass { class: String },
}
