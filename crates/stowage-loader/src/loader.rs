//! Container enumeration.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use stowage_core::{Document, Error, Result};
use stowage_extract::ContentDispatcher;
use stowage_object::bootstrap::{ClientProvider, OciClientProvider};
use stowage_object::client::MAX_PAGE_SIZE;
use stowage_object::types::ObjectDescriptor;
use tracing::Dispatch;
use tracing::instrument::WithSubscriber;

use crate::TRACING_TARGET;
use crate::config::{LoaderConfig, ObjectErrorPolicy};
use crate::fetcher::ObjectFetcher;

/// Loads every object of a bucket prefix as documents.
///
/// Each [`load`](Self::load) builds its own storage handle and starts from
/// scratch; nothing is shared between calls.
pub struct ContainerLoader {
    config: LoaderConfig,
    provider: Arc<dyn ClientProvider>,
    dispatcher: ContentDispatcher,
    dispatch: Option<Dispatch>,
}

impl ContainerLoader {
    /// Creates a loader using the OCI client provider and the built-in
    /// extractors.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            provider: Arc::new(OciClientProvider::new()),
            dispatcher: ContentDispatcher::new(),
            dispatch: None,
        }
    }

    /// Replaces the client provider.
    pub fn with_provider(mut self, provider: impl ClientProvider) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Replaces the content dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: ContentDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Emits the loader's logs to `dispatch` instead of the caller's current
    /// subscriber.
    pub fn with_dispatch(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.dispatch = Some(dispatch.into());
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Enumerates the configured prefix and returns the documents of every
    /// processed object, in listing order.
    ///
    /// A listing failure aborts the load without partial results. Object
    /// failures abort as well unless the policy is
    /// [`ObjectErrorPolicy::Skip`].
    pub async fn load(&self) -> Result<Vec<Document>> {
        match &self.dispatch {
            Some(dispatch) => self.run().with_subscriber(dispatch.clone()).await,
            None => self.run().await,
        }
    }

    #[tracing::instrument(
        name = "loader.load",
        skip(self),
        fields(
            namespace = %self.config.coordinate.namespace(),
            bucket = %self.config.coordinate.bucket_name(),
            prefix = %self.config.prefix,
        )
    )]
    async fn run(&self) -> Result<Vec<Document>> {
        let config = &self.config;
        let coordinate = &config.coordinate;

        let storage = self
            .provider
            .connect(&config.credentials, coordinate)
            .await?;
        let fetcher = ObjectFetcher::new(storage.clone(), self.dispatcher.clone());

        let mut documents = Vec::new();
        let mut processed = 0usize;
        let mut skipped = 0usize;
        let mut cursor: Option<String> = None;

        'pages: loop {
            let page = storage
                .list_objects(coordinate, &config.prefix, cursor.as_deref(), MAX_PAGE_SIZE)
                .await
                .map_err(|e| {
                    Error::listing(format!("cannot list objects: {}", e.message()))
                        .with_source(e)
                        .with_namespace(coordinate.namespace())
                        .with_bucket(coordinate.bucket_name())
                })?;

            tracing::debug!(
                target: TRACING_TARGET,
                count = page.objects.len(),
                cursor = cursor.as_deref(),
                "Listed objects page"
            );

            if page.is_empty() {
                break;
            }

            for descriptor in &page.objects {
                if config.cap_reached(processed) {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        processed,
                        "Object limit reached"
                    );
                    break 'pages;
                }

                match fetcher.fetch_and_parse(coordinate, &descriptor.name).await {
                    Ok(mut parsed) => {
                        attach_metadata(&mut parsed, descriptor, &config.metadata_keys);
                        documents.append(&mut parsed);
                    }
                    Err(err) if config.on_object_error == ObjectErrorPolicy::Skip => {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            object = %descriptor.name,
                            kind = err.kind_str(),
                            error = %err,
                            "Skipping object"
                        );
                        skipped += 1;
                    }
                    Err(err) => return Err(err),
                }
                processed += 1;
            }

            match page.next_start_with {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::info!(
            target: TRACING_TARGET,
            processed,
            skipped,
            documents = documents.len(),
            "Loaded container"
        );
        Ok(documents)
    }
}

impl fmt::Debug for ContainerLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerLoader")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Copies the requested descriptor fields; unknown or unreported ones are
/// stored as `null`.
fn attach_metadata(documents: &mut [Document], descriptor: &ObjectDescriptor, keys: &[String]) {
    if keys.is_empty() {
        return;
    }

    let values: Vec<(&str, Value)> = keys
        .iter()
        .map(|key| (key.as_str(), descriptor.lookup(key).unwrap_or(Value::Null)))
        .collect();

    for document in documents {
        let metadata = document.metadata_mut();
        for (key, value) in &values {
            metadata.insert(*key, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use stowage_core::{ErrorKind, keys};
    use stowage_object::types::BucketCoordinate;
    use stowage_test::{MockClientProvider, MockStorage, RecordingExtractor, StorageCall};

    use super::*;

    fn config() -> crate::LoaderConfigBuilder {
        LoaderConfig::builder("ns", "docs").unwrap()
    }

    fn loader(config: LoaderConfig, storage: &MockStorage) -> ContainerLoader {
        ContainerLoader::new(config).with_provider(MockClientProvider::new(storage.clone()))
    }

    fn names(documents: &[Document]) -> Vec<&str> {
        documents.iter().filter_map(Document::filename).collect()
    }

    #[tokio::test]
    async fn cap_across_page_boundaries() {
        let storage = MockStorage::new()
            .with_text_objects((0..7).map(|i| format!("obj{i}.txt")))
            .with_page_size(3);

        let documents = loader(config().max_objects(5).build(), &storage)
            .load()
            .await
            .unwrap();

        assert_eq!(
            names(&documents),
            ["obj0.txt", "obj1.txt", "obj2.txt", "obj3.txt", "obj4.txt"]
        );
        assert_eq!(storage.fetched().len(), 5);
        assert_eq!(storage.list_calls(), 2);
    }

    #[tokio::test]
    async fn empty_bucket() {
        let storage = MockStorage::new();
        let documents = loader(config().build(), &storage).load().await.unwrap();

        assert!(documents.is_empty());
        assert_eq!(storage.list_calls(), 1);
        assert!(storage.fetched().is_empty());
    }

    #[tokio::test]
    async fn zero_cap_still_lists_once() {
        let storage = MockStorage::new().with_text_objects(["a.txt"]);
        let documents = loader(config().max_objects(0).build(), &storage)
            .load()
            .await
            .unwrap();

        assert!(documents.is_empty());
        assert_eq!(storage.list_calls(), 1);
        assert!(storage.fetched().is_empty());
    }

    #[tokio::test]
    async fn pagination_is_complete_and_ordered() {
        let expected: Vec<String> = (0..10).map(|i| format!("doc{i:02}.txt")).collect();
        let storage = MockStorage::new()
            .with_text_objects(expected.iter().rev().cloned())
            .with_page_size(4);

        let documents = loader(config().build(), &storage).load().await.unwrap();
        assert_eq!(names(&documents), expected);
        assert_eq!(storage.list_calls(), 3);

        let starts: Vec<_> = storage
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::List { start, limit, .. } => {
                    assert_eq!(limit, MAX_PAGE_SIZE);
                    Some(start)
                }
                StorageCall::Get { .. } => None,
            })
            .collect();
        assert_eq!(
            starts,
            [None, Some("doc03.txt".to_owned()), Some("doc07.txt".to_owned())]
        );
    }

    #[tokio::test]
    async fn dispatches_by_extension() {
        let json = RecordingExtractor::new();
        let pdf = RecordingExtractor::new();
        let vsdx = RecordingExtractor::new();
        let unstructured = RecordingExtractor::new();
        let dispatcher = ContentDispatcher::builder()
            .json(json.clone())
            .pdf(pdf.clone())
            .vsdx(vsdx.clone())
            .unstructured(unstructured.clone())
            .build();

        let storage = MockStorage::new().with_text_objects(["a.json", "b.pdf", "c.vsdx", "d.bin"]);
        let documents = loader(config().build(), &storage)
            .with_dispatcher(dispatcher)
            .load()
            .await
            .unwrap();

        assert_eq!(documents.len(), 4);
        assert_eq!(json.names(), ["a.json"]);
        assert_eq!(pdf.names(), ["b.pdf"]);
        assert_eq!(vsdx.names(), ["c.vsdx"]);
        assert_eq!(unstructured.names(), ["d.bin"]);
    }

    #[tokio::test]
    async fn listing_failure_on_second_page() {
        let storage = MockStorage::new()
            .with_text_objects(["a.txt", "b.txt", "c.txt"])
            .with_page_size(2)
            .fail_list_call(2);

        let err = loader(config().build(), &storage).load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Listing);
        assert_eq!(err.context().bucket.as_deref(), Some("docs"));
        assert_eq!(storage.fetched(), ["a.txt", "b.txt"]);
    }

    async fn load_bucket(
        namespace: &str,
        bucket: &str,
        provider: &MockClientProvider,
    ) -> Result<Vec<Document>> {
        let config = LoaderConfig::builder(namespace, bucket)?.build();
        ContainerLoader::new(config)
            .with_provider(provider.clone())
            .load()
            .await
    }

    #[tokio::test]
    async fn empty_coordinate_fails_before_connecting() {
        let provider = MockClientProvider::new(MockStorage::new().with_text_objects(["a.txt"]));

        for (namespace, bucket) in [("", "docs"), ("ns", ""), ("", "")] {
            let err = load_bucket(namespace, bucket, &provider).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
        assert_eq!(provider.connects(), 0);
        assert!(provider.storage().calls().is_empty());

        let documents = load_bucket("ns", "docs", &provider).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(provider.connects(), 1);
    }

    #[tokio::test]
    async fn staged_files_are_gone() {
        let extractor = RecordingExtractor::new();
        let failing = RecordingExtractor::failing();
        let dispatcher = ContentDispatcher::builder()
            .unstructured(extractor.clone())
            .json(failing.clone())
            .build();
        let storage = MockStorage::new().with_text_objects(["nested/dir/a.txt", "z.json"]);

        let err = loader(config().build(), &storage)
            .with_dispatcher(dispatcher)
            .load()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let calls: Vec<_> = extractor.calls().into_iter().chain(failing.calls()).collect();
        assert_eq!(calls.len(), 2);
        for call in calls {
            assert!(call.existed);
            assert!(!call.path.exists());
        }
    }

    #[tokio::test]
    async fn two_text_objects_with_cap() {
        let storage = MockStorage::new()
            .with_object("object1.txt", Bytes::from("first"))
            .with_object("object2.txt", Bytes::from("second"));

        let documents = loader(config().max_objects(2).build(), &storage)
            .load()
            .await
            .unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].content, "first");
        assert_eq!(documents[0].filename(), Some("object1.txt"));
        assert_eq!(documents[1].content, "second");
        assert_eq!(documents[1].filename(), Some("object2.txt"));
    }

    #[tokio::test]
    async fn retrieval_failure_aborts_by_default() {
        let storage = MockStorage::new()
            .with_text_objects(["a.txt", "b.txt"])
            .fail_get("a.txt");

        let err = loader(config().build(), &storage).load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Retrieval);
        assert_eq!(err.context().object.as_deref(), Some("a.txt"));
        assert_eq!(storage.fetched(), ["a.txt"]);
    }

    #[tokio::test]
    async fn skip_policy_counts_failed_objects() {
        let storage = MockStorage::new()
            .with_text_objects(["a.txt", "b.txt", "c.txt"])
            .fail_get("a.txt");

        let config = config()
            .on_object_error(ObjectErrorPolicy::Skip)
            .max_objects(2)
            .build();
        let documents = loader(config, &storage).load().await.unwrap();

        assert_eq!(names(&documents), ["b.txt"]);
        assert_eq!(storage.fetched(), ["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn metadata_keys_are_attached() {
        let descriptor = ObjectDescriptor::new("report.txt")
            .with_size(6)
            .with_etag("etag-1");
        let storage = MockStorage::new().with_descriptor(descriptor, Bytes::from("report"));

        let config = config()
            .metadata_keys(["size", "etag", "md5", "owner"])
            .build();
        let documents = loader(config, &storage).load().await.unwrap();

        let metadata = documents[0].metadata();
        assert_eq!(metadata.get_u64("size"), Some(6));
        assert_eq!(metadata.get_str("etag"), Some("etag-1"));
        assert_eq!(metadata.get("md5"), Some(&Value::Null));
        assert_eq!(metadata.get("owner"), Some(&Value::Null));
        assert_eq!(metadata.get_str(keys::FILENAME), Some("report.txt"));
    }

    #[tokio::test]
    async fn prefix_is_forwarded() {
        let storage = MockStorage::new().with_text_objects(["logs/a.txt", "reports/b.txt"]);
        let documents = loader(config().prefix("reports/").build(), &storage)
            .load()
            .await
            .unwrap();

        assert_eq!(names(&documents), ["reports/b.txt"]);
    }

    #[tokio::test]
    async fn each_load_connects_and_counts_afresh() {
        let storage = MockStorage::new().with_text_objects(["a.txt", "b.txt"]);
        let provider = MockClientProvider::new(storage.clone());
        let loader = ContainerLoader::new(config().max_objects(1).build())
            .with_provider(provider.clone());

        assert_eq!(names(&loader.load().await.unwrap()), ["a.txt"]);
        assert_eq!(names(&loader.load().await.unwrap()), ["a.txt"]);
        assert_eq!(provider.connects(), 2);
    }

    #[tokio::test]
    async fn client_failure_propagates() {
        let loader = ContainerLoader::new(config().build())
            .with_provider(MockClientProvider::failing(ErrorKind::ClientInit));

        let err = loader.load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInit);
    }

    #[tokio::test]
    async fn object_store_backed_load() {
        use object_store::memory::InMemory;
        use stowage_object::client::ObjectStoreClient;

        let coordinate = BucketCoordinate::new("ns", "docs").unwrap();
        let client = ObjectStoreClient::new().with_store(coordinate.clone(), InMemory::new());
        let objects: [(&str, &[u8]); 4] = [
            ("in/config.json", br#"{"retries": 3}"#),
            ("in/notes.txt", b"plain notes"),
            ("in/raw.bin", &[0xff, 0xfe, 0x00]),
            ("out/skipped.txt", b"outside prefix"),
        ];
        for (name, data) in objects {
            client
                .put(&coordinate, name, Bytes::copy_from_slice(data))
                .await
                .unwrap();
        }

        let config = config()
            .prefix("in/")
            .metadata_keys(["size"])
            .on_object_error(ObjectErrorPolicy::Skip)
            .build();
        let documents = ContainerLoader::new(config)
            .with_provider(client)
            .load()
            .await
            .unwrap();

        assert_eq!(names(&documents), ["in/config.json", "in/notes.txt"]);
        assert_eq!(documents[0].content, r#"{"retries":3}"#);
        assert_eq!(documents[1].metadata().get_u64("size"), Some(11));
        assert_eq!(documents[1].source(), Some("oci://docs@ns/in/notes.txt"));
    }

    #[tokio::test]
    async fn runs_under_injected_dispatch() {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let storage = MockStorage::new().with_text_objects(["a.txt"]);

        let documents = loader(config().build(), &storage)
            .with_dispatch(subscriber)
            .load()
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
    }
}
