//! HTML extractor.

use std::path::Path;

use scraper::{Html, Selector};
use stowage_core::{Document, Result, keys};

use super::read_file;
use crate::Extractor;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Strips markup and returns the visible text of the body as one document
/// tagged `text/html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Returns true if `text` opens like an HTML document.
    pub fn looks_like_html(text: &str) -> bool {
        let head = text
            .trim_start()
            .chars()
            .take(16)
            .collect::<String>()
            .to_ascii_lowercase();
        head.starts_with("<!doctype html") || head.starts_with("<html")
    }

    /// Extracts from an in-memory document.
    pub fn extract_str(&self, html: &str) -> Vec<Document> {
        vec![Document::new(visible_text(html)).with_metadata(keys::CONTENT_TYPE, "text/html")]
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, path: &Path, _name_hint: &str) -> Result<Vec<Document>> {
        let data = read_file(path)?;
        Ok(self.extract_str(&String::from_utf8_lossy(&data)))
    }
}

fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut content = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        let text = text.trim();
        if hidden || text.is_empty() {
            continue;
        }

        if !content.is_empty() {
            content.push(' ');
        }
        content.push_str(text);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        let docs = HtmlExtractor.extract_str("<html><body><p>Hi</p></body></html>");
        assert_eq!(docs[0].content, "Hi");
        assert_eq!(docs[0].metadata.get_str(keys::CONTENT_TYPE), Some("text/html"));
    }

    #[test]
    fn skips_head_and_scripts() {
        let html = r#"<!DOCTYPE html>
<html>
  <head><title>Quarterly</title><style>p { color: red }</style></head>
  <body>
    <h1>Revenue</h1>
    <script>track("view")</script>
    <p>Up <b>12%</b> on last year.</p>
  </body>
</html>"#;
        let docs = HtmlExtractor.extract_str(html);
        assert_eq!(docs[0].content, "Revenue Up 12% on last year.");
    }

    #[test]
    fn fragment_without_body_markup() {
        let docs = HtmlExtractor.extract_str("<p>hello</p>");
        assert_eq!(docs[0].content, "hello");
    }

    #[test]
    fn detects_documents() {
        assert!(HtmlExtractor::looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(HtmlExtractor::looks_like_html("<HTML lang=\"en\">"));
        assert!(!HtmlExtractor::looks_like_html("<p>fragment</p>"));
        assert!(!HtmlExtractor::looks_like_html("plain text"));
    }
}
