//! Extension-based dispatch to extractors.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use stowage_core::{Document, Result};

use crate::extractors::{JsonExtractor, PdfExtractor, UnstructuredExtractor, VsdxExtractor};
use crate::{ContentFormat, Extractor, SharedExtractor, TRACING_TARGET};

/// Routes a staged file to the extractor of its [`ContentFormat`].
///
/// The dispatcher selects and invokes; documents are returned exactly as the
/// extractor produced them.
#[derive(Clone)]
pub struct ContentDispatcher {
    json: SharedExtractor,
    pdf: SharedExtractor,
    vsdx: SharedExtractor,
    unstructured: SharedExtractor,
}

impl ContentDispatcher {
    /// Creates a dispatcher with the built-in extractors.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a builder preloaded with the built-in extractors.
    pub fn builder() -> ContentDispatcherBuilder {
        ContentDispatcherBuilder::default()
    }

    /// Returns the extractor handling `format`.
    pub fn extractor(&self, format: ContentFormat) -> &dyn Extractor {
        match format {
            ContentFormat::Json => self.json.as_ref(),
            ContentFormat::Pdf => self.pdf.as_ref(),
            ContentFormat::Vsdx => self.vsdx.as_ref(),
            ContentFormat::Unstructured => self.unstructured.as_ref(),
        }
    }

    /// Extracts documents from the file at `path`, dispatching on the
    /// extension of `name_hint`.
    pub fn parse(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        let format = ContentFormat::from_name(name_hint);
        tracing::debug!(
            target: TRACING_TARGET,
            object = name_hint,
            format = format.as_ref(),
            "Dispatching object to extractor"
        );

        let documents = self.extractor(format).extract(path, name_hint)?;
        tracing::trace!(
            target: TRACING_TARGET,
            object = name_hint,
            count = documents.len(),
            "Extraction finished"
        );
        Ok(documents)
    }
}

impl Default for ContentDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContentDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentDispatcher").finish_non_exhaustive()
    }
}

/// Builder for [`ContentDispatcher`].
pub struct ContentDispatcherBuilder {
    json: SharedExtractor,
    pdf: SharedExtractor,
    vsdx: SharedExtractor,
    unstructured: SharedExtractor,
}

impl ContentDispatcherBuilder {
    /// Replaces the `.json` extractor.
    pub fn json(mut self, extractor: impl Extractor + 'static) -> Self {
        self.json = Arc::new(extractor);
        self
    }

    /// Replaces the `.pdf` extractor.
    pub fn pdf(mut self, extractor: impl Extractor + 'static) -> Self {
        self.pdf = Arc::new(extractor);
        self
    }

    /// Replaces the `.vsdx` extractor.
    pub fn vsdx(mut self, extractor: impl Extractor + 'static) -> Self {
        self.vsdx = Arc::new(extractor);
        self
    }

    /// Replaces the fallback extractor.
    pub fn unstructured(mut self, extractor: impl Extractor + 'static) -> Self {
        self.unstructured = Arc::new(extractor);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> ContentDispatcher {
        ContentDispatcher {
            json: self.json,
            pdf: self.pdf,
            vsdx: self.vsdx,
            unstructured: self.unstructured,
        }
    }
}

impl Default for ContentDispatcherBuilder {
    fn default() -> Self {
        Self {
            json: Arc::new(JsonExtractor::new()),
            pdf: Arc::new(PdfExtractor::new()),
            vsdx: Arc::new(VsdxExtractor::new()),
            unstructured: Arc::new(UnstructuredExtractor::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use stowage_core::keys;

    use super::*;

    /// Emits one document naming the extractor that ran.
    struct Tagged {
        tag: &'static str,
        calls: Arc<Mutex<Vec<(&'static str, String)>>>,
    }

    impl Extractor for Tagged {
        fn extract(&self, _path: &Path, name_hint: &str) -> Result<Vec<Document>> {
            self.calls
                .lock()
                .unwrap()
                .push((self.tag, name_hint.to_owned()));
            Ok(vec![Document::new(self.tag)])
        }
    }

    #[test]
    fn routes_by_extension() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let tagged = |tag| Tagged {
            tag,
            calls: calls.clone(),
        };
        let dispatcher = ContentDispatcher::builder()
            .json(tagged("json"))
            .pdf(tagged("pdf"))
            .vsdx(tagged("vsdx"))
            .unstructured(tagged("unstructured"))
            .build();

        let path = Path::new("/unused");
        for name in ["a.json", "b.pdf", "c.vsdx", "d.bin", "e.PDF"] {
            dispatcher.parse(path, name).unwrap();
        }

        let calls = calls.lock().unwrap();
        let tags: Vec<_> = calls.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, ["json", "pdf", "vsdx", "unstructured", "unstructured"]);
        assert_eq!(calls[2].1, "c.vsdx");
    }

    #[test]
    fn documents_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object1.txt");
        std::fs::write(&path, "first object").unwrap();

        let docs = ContentDispatcher::new().parse(&path, "object1.txt").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "first object");
        assert_eq!(docs[0].metadata.get_str(keys::CONTENT_TYPE), Some("text/plain"));
        assert!(docs[0].filename().is_none());
    }
}
