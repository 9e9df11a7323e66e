//! Convenience re-exports.

pub use stowage_core::{Document, DocumentMetadata, Error, ErrorKind, Result};
pub use stowage_object::bootstrap::Credentials;

pub use crate::{ContainerLoader, LoaderConfig, ObjectErrorPolicy};
