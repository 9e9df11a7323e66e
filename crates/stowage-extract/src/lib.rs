#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod dispatcher;
mod extractor;
mod format;

/// Built-in format extractors.
pub mod extractors;

#[doc(hidden)]
pub mod prelude;

pub use dispatcher::{ContentDispatcher, ContentDispatcherBuilder};
pub use extractor::{Extractor, SharedExtractor};
pub use format::ContentFormat;

/// Tracing target for extraction.
pub const TRACING_TARGET: &str = "stowage_extract";
