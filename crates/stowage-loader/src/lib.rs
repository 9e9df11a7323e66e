#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod fetcher;
mod loader;
mod staging;

#[doc(hidden)]
pub mod prelude;

pub use config::{LoaderConfig, LoaderConfigBuilder, ObjectErrorPolicy};
pub use fetcher::ObjectFetcher;
pub use loader::ContainerLoader;
pub use staging::StagedObject;

/// Tracing target for enumeration and fetching.
pub const TRACING_TARGET: &str = "stowage_loader";

/// Tracing target for staging.
pub const TRACING_TARGET_STAGING: &str = "stowage_loader::staging";
