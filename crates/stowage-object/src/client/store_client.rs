//! [`ObjectStorage`] implementation backed by [`object_store::ObjectStore`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use object_store::{ObjectStore, PutPayload};

use super::paging::list_page;
use super::{ObjectStorage, object_path};
use crate::TRACING_TARGET;
use crate::types::error::from_object_store;
use crate::types::{BucketCoordinate, ListingPage, StorageError};

/// Builds an [`ObjectStore`] for a bucket the client has not seen yet.
pub trait StoreConnector: Send + Sync + 'static {
    /// Unique identifier used in error labels (e.g. `"oci"`).
    fn id(&self) -> &str;

    /// Creates a store scoped to `coordinate`.
    fn connect(&self, coordinate: &BucketCoordinate) -> Result<Arc<dyn ObjectStore>, StorageError>;
}

/// Cloneable storage client mapping bucket coordinates to [`ObjectStore`]s.
///
/// `object_store` backends are bound to a single bucket, while the pipeline
/// addresses buckets by namespace and name. Stores are either registered up
/// front with [`with_store`](Self::with_store) or built on first use by the
/// client's [`StoreConnector`]; built stores live as long as the client.
#[derive(Clone)]
pub struct ObjectStoreClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    stores: RwLock<HashMap<BucketCoordinate, Arc<dyn ObjectStore>>>,
    connector: Option<Box<dyn StoreConnector>>,
}

impl ObjectStoreClient {
    /// Creates a client that only serves registered stores.
    pub fn new() -> Self {
        Self::from_parts(None)
    }

    /// Creates a client that builds stores on demand with `connector`.
    pub fn with_connector(connector: impl StoreConnector) -> Self {
        Self::from_parts(Some(Box::new(connector)))
    }

    fn from_parts(connector: Option<Box<dyn StoreConnector>>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                stores: RwLock::new(HashMap::new()),
                connector,
            }),
        }
    }

    /// Registers `store` as the backend of `coordinate`.
    pub fn with_store(self, coordinate: BucketCoordinate, store: impl ObjectStore) -> Self {
        self.register(coordinate, Arc::new(store));
        self
    }

    /// Registers a shared store as the backend of `coordinate`.
    pub fn register(&self, coordinate: BucketCoordinate, store: Arc<dyn ObjectStore>) {
        self.inner
            .stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(coordinate, store);
    }

    /// Uploads `data` to `object_name`.
    #[tracing::instrument(
        name = "object.put",
        skip(self, data),
        fields(%coordinate, size = data.len())
    )]
    pub async fn put(
        &self,
        coordinate: &BucketCoordinate,
        object_name: &str,
        data: Bytes,
    ) -> Result<(), StorageError> {
        let store = self.store(coordinate)?;
        store
            .put(&object_path(object_name)?, PutPayload::from(data))
            .await
            .map_err(from_object_store)?;
        Ok(())
    }

    /// Builds the store for `coordinate` ahead of first use.
    ///
    /// Surfaces connector failures (such as a rejected endpoint) before any
    /// request is made.
    pub fn prepare(&self, coordinate: &BucketCoordinate) -> Result<(), StorageError> {
        self.store(coordinate).map(|_| ())
    }

    /// Returns the store for `coordinate`, building it if needed.
    fn store(&self, coordinate: &BucketCoordinate) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let cached = self
            .inner
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(coordinate)
            .cloned();
        if let Some(store) = cached {
            return Ok(store);
        }

        let Some(connector) = &self.inner.connector else {
            return Err(StorageError::not_found(
                format!("bucket '{coordinate}' is not registered"),
                "object-store",
            ));
        };

        let store = connector.connect(coordinate)?;
        tracing::debug!(
            target: TRACING_TARGET,
            connector = connector.id(),
            %coordinate,
            "Built object store for bucket"
        );

        self.register(coordinate.clone(), store.clone());
        Ok(store)
    }
}

impl Default for ObjectStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectStoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets = self
            .inner
            .stores
            .read()
            .map(|stores| stores.len())
            .unwrap_or_default();
        f.debug_struct("ObjectStoreClient")
            .field("connector", &self.inner.connector.as_ref().map(|c| c.id().to_owned()))
            .field("buckets", &buckets)
            .finish()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for ObjectStoreClient {
    #[tracing::instrument(
        name = "object.list",
        skip(self),
        fields(%coordinate, count)
    )]
    async fn list_objects(
        &self,
        coordinate: &BucketCoordinate,
        prefix: &str,
        start: Option<&str>,
        limit: usize,
    ) -> Result<ListingPage, StorageError> {
        let store = self.store(coordinate)?;
        let page = list_page(store.as_ref(), prefix, start, limit).await?;
        tracing::Span::current().record("count", page.objects.len());
        Ok(page)
    }

    #[tracing::instrument(
        name = "object.get",
        skip(self),
        fields(%coordinate, size)
    )]
    async fn get_object(
        &self,
        coordinate: &BucketCoordinate,
        object_name: &str,
    ) -> Result<Bytes, StorageError> {
        let store = self.store(coordinate)?;
        let result = store
            .get(&object_path(object_name)?)
            .await
            .map_err(from_object_store)?;
        let data = result.bytes().await.map_err(from_object_store)?;
        tracing::Span::current().record("size", data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use object_store::memory::InMemory;
    use object_store::path::Path;

    use super::*;
    use crate::types::StorageErrorKind;

    fn coordinate(bucket: &str) -> BucketCoordinate {
        BucketCoordinate::new("ns", bucket).unwrap()
    }

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new().with_store(coordinate("docs"), InMemory::new())
    }

    #[tokio::test]
    async fn put_and_get() {
        let client = test_client();
        let docs = coordinate("docs");
        client
            .put(&docs, "dir/hello.txt", Bytes::from("hello world"))
            .await
            .unwrap();

        let data = client.get_object(&docs, "dir/hello.txt").await.unwrap();
        assert_eq!(data, Bytes::from("hello world"));
    }

    #[tokio::test]
    async fn get_missing_object() {
        let client = test_client();
        let err = client
            .get_object(&coordinate("docs"), "missing.txt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn unregistered_bucket_without_connector() {
        let client = test_client();
        let err = client
            .list_objects(&coordinate("other"), "", None, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
    }

    #[tokio::test]
    async fn list_objects_pages() {
        let client = test_client();
        let docs = coordinate("docs");
        for i in 0..3 {
            client
                .put(&docs, &format!("file{i}.txt"), Bytes::from(format!("{i}")))
                .await
                .unwrap();
        }

        let page = client.list_objects(&docs, "", None, 2).await.unwrap();
        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.next_start_with.as_deref(), Some("file1.txt"));
    }

    #[tokio::test]
    async fn raw_keys_round_trip_through_listing() {
        let store = InMemory::new();
        for key in ["reports/Q1 #2.txt", "reports/100%.txt", "reports/plain.txt"] {
            store
                .put(&Path::parse(key).unwrap(), PutPayload::from(Bytes::from(key)))
                .await
                .unwrap();
        }
        let docs = coordinate("docs");
        let client = ObjectStoreClient::new().with_store(docs.clone(), store);

        let page = client.list_objects(&docs, "reports/", None, 10).await.unwrap();
        assert_eq!(page.objects.len(), 3);
        for object in &page.objects {
            let data = client.get_object(&docs, &object.name).await.unwrap();
            assert_eq!(data, Bytes::from(object.name.clone()));
        }
    }

    #[tokio::test]
    async fn put_stores_raw_key() {
        let client = test_client();
        let docs = coordinate("docs");
        client
            .put(&docs, "a [draft].txt", Bytes::from_static(b"x"))
            .await
            .unwrap();

        let page = client.list_objects(&docs, "", None, 10).await.unwrap();
        assert_eq!(page.objects[0].name, "a [draft].txt");
    }

    struct CountingConnector(Arc<AtomicUsize>);

    impl StoreConnector for CountingConnector {
        fn id(&self) -> &str {
            "counting"
        }

        fn connect(&self, _: &BucketCoordinate) -> Result<Arc<dyn ObjectStore>, StorageError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(InMemory::new()))
        }
    }

    #[tokio::test]
    async fn connector_builds_each_bucket_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = ObjectStoreClient::with_connector(CountingConnector(calls.clone()));

        client.list_objects(&coordinate("a"), "", None, 10).await.unwrap();
        client.list_objects(&coordinate("a"), "", None, 10).await.unwrap();
        client.list_objects(&coordinate("b"), "", None, 10).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
