//! JSON extractor.

use std::path::Path;

use serde_json::Value;
use stowage_core::{Document, Error, Result};

use super::read_file;
use crate::Extractor;

/// Loads a JSON file as a single opaque text payload.
///
/// A top-level string is used verbatim; any other value is serialized back
/// to compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl JsonExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extracts from an in-memory payload.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Vec<Document>> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| Error::parse(format!("invalid JSON: {e}")).with_source(e))?;

        let content = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(vec![Document::new(content)])
    }
}

impl Extractor for JsonExtractor {
    fn extract(&self, path: &Path, _name_hint: &str) -> Result<Vec<Document>> {
        self.extract_bytes(&read_file(path)?)
    }
}
