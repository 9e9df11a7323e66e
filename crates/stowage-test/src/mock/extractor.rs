//! Recording extractor.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use stowage_core::{Document, Error, Result};
use stowage_extract::Extractor;

/// One recorded [`Extractor::extract`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractCall {
    /// Staged file the extractor was given.
    pub path: PathBuf,
    /// Object name the file was staged from.
    pub name_hint: String,
    /// Whether the staged file existed during the call.
    pub existed: bool,
}

/// [`Extractor`] that records its calls.
///
/// Emits one document holding the file's text (lossily decoded), or fails
/// with a parse error when built with [`failing`](Self::failing).
#[derive(Debug, Clone, Default)]
pub struct RecordingExtractor {
    calls: Arc<Mutex<Vec<ExtractCall>>>,
    fail: bool,
}

impl RecordingExtractor {
    /// Creates a succeeding extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor that fails every call.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<ExtractCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the object names seen so far, in order.
    pub fn names(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.name_hint).collect()
    }
}

impl Extractor for RecordingExtractor {
    fn extract(&self, path: &Path, name_hint: &str) -> Result<Vec<Document>> {
        let content = std::fs::read(path).ok();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExtractCall {
                path: path.to_path_buf(),
                name_hint: name_hint.to_owned(),
                existed: content.is_some(),
            });

        if self.fail {
            return Err(Error::parse(format!("cannot extract '{name_hint}'")));
        }

        let text = content
            .map(|data| String::from_utf8_lossy(&data).into_owned())
            .unwrap_or_default();
        Ok(vec![Document::new(text)])
    }
}
