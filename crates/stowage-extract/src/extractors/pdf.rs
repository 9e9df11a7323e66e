//! PDF extractor.

use std::path::Path;

use stowage_core::{Document, Error, Result, keys};

use super::read_file;
use crate::{Extractor, TRACING_TARGET};

/// Extracts text page by page, emitting one document per page.
///
/// Each document carries `page` (1-based) and `total_pages`. Pages whose
/// text cannot be decoded are logged and emitted empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extracts from an in-memory PDF.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Vec<Document>> {
        let pdf = lopdf::Document::load_mem(data)
            .map_err(|e| Error::parse(format!("invalid PDF: {e}")))?;

        let pages = pdf.get_pages();
        let total_pages = pages.len();
        let mut documents = Vec::with_capacity(total_pages);

        for &page_number in pages.keys() {
            let text = match pdf.extract_text(&[page_number]) {
                Ok(text) => text.trim().to_owned(),
                Err(e) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        page = page_number,
                        error = %e,
                        "Cannot extract PDF page text"
                    );
                    String::new()
                }
            };

            documents.push(
                Document::new(text)
                    .with_metadata(keys::PAGE, page_number)
                    .with_metadata(keys::TOTAL_PAGES, total_pages),
            );
        }

        Ok(documents)
    }
}

impl Extractor for PdfExtractor {
    fn extract(&self, path: &Path, _name_hint: &str) -> Result<Vec<Document>> {
        self.extract_bytes(&read_file(path)?)
    }
}
