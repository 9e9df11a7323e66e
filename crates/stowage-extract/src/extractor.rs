//! The extractor seam.

use std::path::Path;
use std::sync::Arc;

use stowage_core::{Document, Result};

/// Converts one staged file into documents.
///
/// `name_hint` is the object name the file was staged from. Implementations
/// report failures as [`ErrorKind::Parse`](stowage_core::ErrorKind::Parse).
pub trait Extractor: Send + Sync {
    /// Extracts documents from the file at `path`.
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>>;
}

/// Shared trait object for an [`Extractor`].
pub type SharedExtractor = Arc<dyn Extractor>;

impl<T: Extractor + ?Sized> Extractor for Arc<T> {
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        (**self).extract(path, name_hint)
    }
}

impl<T: Extractor + ?Sized> Extractor for Box<T> {
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        (**self).extract(path, name_hint)
    }
}
