//! Runtime reflection and object archiving.
//!
//! - [`archive`]: the format-neutral archive tree and its text form.
//! - [`object`]: class metadata, composites, the identity registry and
//!   the serializer that moves objects in and out of archives.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_archive as archive;
pub use vc_object as object;
