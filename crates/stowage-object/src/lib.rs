#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Storage capability trait and the `object_store`-backed client.
pub mod client;
/// Credential sources and client construction.
pub mod bootstrap;
/// OCI connector and config-file profiles.
pub mod providers;
/// Coordinates, descriptors, listing pages and storage errors.
pub mod types;

#[doc(hidden)]
pub mod prelude;

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "stowage_object";

/// Tracing target for client bootstrap.
pub const TRACING_TARGET_BOOTSTRAP: &str = "stowage_object::bootstrap";
