//! Document types.
//!
//! A [`Document`] is the unit handed back to callers of the ingestion
//! pipeline: extracted text plus a flat metadata map. One stored object may
//! expand into several documents (one per PDF page, one per diagram page).

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known metadata keys written by the pipeline and the bundled extractors.
pub mod keys {
    /// Name of the object the document was extracted from.
    pub const FILENAME: &str = "filename";
    /// Provenance tag identifying where the document came from.
    pub const SOURCE: &str = "source";
    /// 1-based page number within a paged format.
    pub const PAGE: &str = "page";
    /// Total page count of a paged format.
    pub const TOTAL_PAGES: &str = "total_pages";
    /// Name of a diagram page.
    pub const PAGE_NAME: &str = "page_name";
    /// MIME type guessed for the content.
    pub const CONTENT_TYPE: &str = "content_type";
}

/// Extracted text content together with its metadata.
///
/// ```rust
/// use stowage_core::Document;
///
/// let doc = Document::new("Hello, world!")
///     .with_metadata("filename", "hello.txt")
///     .with_metadata("page", 1);
///
/// assert_eq!(doc.filename(), Some("hello.txt"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text content.
    pub content: String,

    /// Document metadata (filename, descriptor fields, parser fields).
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Creates a new document with empty metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Sets a metadata entry, replacing any previous value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Returns the extracted text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the document metadata.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Returns a mutable reference to the document metadata.
    pub fn metadata_mut(&mut self) -> &mut DocumentMetadata {
        &mut self.metadata
    }

    /// Returns the `filename` metadata entry, if it is a string.
    pub fn filename(&self) -> Option<&str> {
        self.metadata.get_str(keys::FILENAME)
    }

    /// Returns the `source` metadata entry, if it is a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get_str(keys::SOURCE)
    }

    /// Returns true if the extracted text is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Insertion-ordered string → JSON value map.
#[derive(Debug, Clone, Default, PartialEq, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(Map<String, Value>);

impl DocumentMetadata {
    /// Creates an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an entry, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Sets an entry only if the key is not present yet.
    ///
    /// Returns true if the value was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    /// Returns the entry as a string slice, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the entry as an unsigned integer, if present and numeric.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    /// Consumes the metadata, returning the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DocumentMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DocumentMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
