//! Storage capability consumed by the ingestion pipeline.
//!
//! [`ObjectStorage`] is the narrow interface the loader talks to: one call
//! lists a page of objects, one call downloads an object. [`ObjectStoreClient`]
//! implements it on top of [`object_store::ObjectStore`]. Every public method
//! is instrumented with [`tracing`] spans.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::types::{BucketCoordinate, ListingPage, StorageError};

mod paging;
mod store_client;

pub(crate) use paging::object_path;
pub use store_client::{ObjectStoreClient, StoreConnector};

/// Largest page size a listing call may request.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Shared handle to a storage client.
pub type SharedStorage = Arc<dyn ObjectStorage>;

/// Listing and retrieval operations of an object storage service.
///
/// Implementations report every failure as a [`StorageError`]; service-side
/// failures use [`StorageErrorKind::Service`](crate::types::StorageErrorKind::Service)
/// or [`StorageErrorKind::NotFound`](crate::types::StorageErrorKind::NotFound).
#[async_trait::async_trait]
pub trait ObjectStorage: fmt::Debug + Send + Sync + 'static {
    /// Lists up to `limit` objects whose names start with `prefix`.
    ///
    /// `start` is the continuation token returned by the previous page, or
    /// `None` for the first page. Objects are returned in the backend's
    /// listing order.
    async fn list_objects(
        &self,
        coordinate: &BucketCoordinate,
        prefix: &str,
        start: Option<&str>,
        limit: usize,
    ) -> Result<ListingPage, StorageError>;

    /// Downloads the full content of one object.
    async fn get_object(
        &self,
        coordinate: &BucketCoordinate,
        object_name: &str,
    ) -> Result<Bytes, StorageError>;
}
