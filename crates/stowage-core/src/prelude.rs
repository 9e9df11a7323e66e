//! Convenient re-exports for common use.

pub use crate::document::{Document, DocumentMetadata, keys};
pub use crate::error::{BoxedError, Error, ErrorContext, ErrorKind, Result};
