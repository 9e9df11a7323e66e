//! Convenience re-exports.

pub use crate::extractors::{
    HtmlExtractor, JsonExtractor, OfficeExtractor, OfficeFormat, PdfExtractor,
    UnstructuredExtractor, VsdxExtractor,
};
pub use crate::{ContentDispatcher, ContentFormat, Extractor, SharedExtractor};
