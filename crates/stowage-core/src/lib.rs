#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod document;
mod error;

#[doc(hidden)]
pub mod prelude;

pub use document::{Document, DocumentMetadata, keys};
pub use error::{BoxedError, Error, ErrorContext, ErrorKind, Result};
