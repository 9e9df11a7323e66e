//! Mock client provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stowage_core::{Error, ErrorKind, Result};
use stowage_object::bootstrap::{ClientProvider, Credentials};
use stowage_object::client::SharedStorage;
use stowage_object::types::BucketCoordinate;

use super::MockStorage;

/// [`ClientProvider`] that hands out a [`MockStorage`] or fails.
#[derive(Debug, Clone)]
pub struct MockClientProvider {
    storage: MockStorage,
    failure: Option<ErrorKind>,
    connects: Arc<AtomicUsize>,
}

impl MockClientProvider {
    /// Creates a provider serving `storage`.
    pub fn new(storage: MockStorage) -> Self {
        Self {
            storage,
            failure: None,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a provider whose every connection fails with `kind`.
    pub fn failing(kind: ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::new(MockStorage::new())
        }
    }

    /// Returns the storage handed out by this provider.
    pub fn storage(&self) -> &MockStorage {
        &self.storage
    }

    /// Returns the number of connection attempts.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ClientProvider for MockClientProvider {
    async fn connect(
        &self,
        _credentials: &Credentials,
        coordinate: &BucketCoordinate,
    ) -> Result<SharedStorage> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        match self.failure {
            Some(kind) => Err(Error::new(kind, "mock client provider failure")
                .with_namespace(coordinate.namespace())
                .with_bucket(coordinate.bucket_name())),
            None => Ok(Arc::new(self.storage.clone())),
        }
    }
}
