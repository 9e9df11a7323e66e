//! Fallback extractor for objects without a recognized extension.

use std::path::Path;

use stowage_core::{Document, Error, Result, keys};

use super::{
    HtmlExtractor, OfficeExtractor, OfficeFormat, PdfExtractor, VsdxExtractor, read_file,
};
use crate::{Extractor, TRACING_TARGET};

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Sniffs the content signature and extracts accordingly.
///
/// PDF, VSDX and Office (Word, PowerPoint, Excel) payloads go to the
/// respective extractors regardless of their name. HTML is reduced to its
/// visible text. Other UTF-8 text becomes one document tagged with the
/// `content_type` guessed from the name. Anything else is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnstructuredExtractor {
    pdf: PdfExtractor,
    vsdx: VsdxExtractor,
    office: OfficeExtractor,
    html: HtmlExtractor,
}

impl UnstructuredExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts from an in-memory payload.
    pub fn extract_bytes(&self, data: &[u8], name_hint: &str) -> Result<Vec<Document>> {
        if data.starts_with(PDF_MAGIC) {
            tracing::debug!(target: TRACING_TARGET, object = name_hint, "Sniffed PDF content");
            return self.pdf.extract_bytes(data);
        }

        if data.starts_with(ZIP_MAGIC) {
            if VsdxExtractor::is_vsdx(data) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    object = name_hint,
                    "Sniffed VSDX content"
                );
                return self.vsdx.extract_bytes(data, name_hint);
            }
            if let Some(format) = OfficeFormat::detect(data) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    object = name_hint,
                    format = ?format,
                    "Sniffed Office content"
                );
                return self.office.extract_bytes(data, name_hint);
            }
        }

        let text = std::str::from_utf8(data.strip_prefix(UTF8_BOM).unwrap_or(data)).map_err(|e| {
            Error::parse(format!("'{name_hint}' is neither text nor a supported document"))
                .with_source(e)
        })?;

        let content_type = mime_guess::from_path(name_hint)
            .first()
            .map(|mime| mime.essence_str().to_owned());

        if content_type.as_deref() == Some("text/html") || HtmlExtractor::looks_like_html(text) {
            return Ok(self.html.extract_str(text));
        }

        let content_type = content_type.unwrap_or_else(|| "text/plain".to_owned());

        Ok(vec![
            Document::new(text).with_metadata(keys::CONTENT_TYPE, content_type),
        ])
    }
}

impl Extractor for UnstructuredExtractor {
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        self.extract_bytes(&read_file(path)?, name_hint)
    }
}
