//! Per-object retrieval, staging and extraction.

use std::fmt;

use stowage_core::{Document, Error, Result, keys};
use stowage_extract::ContentDispatcher;
use stowage_object::client::SharedStorage;
use stowage_object::types::BucketCoordinate;

use crate::TRACING_TARGET;
use crate::staging::StagedObject;

/// Fetches one object and turns it into documents.
///
/// Holds the storage handle of the current load; every object of the load
/// goes through the same handle.
#[derive(Clone)]
pub struct ObjectFetcher {
    storage: SharedStorage,
    dispatcher: ContentDispatcher,
}

impl ObjectFetcher {
    /// Creates a fetcher over `storage`.
    pub fn new(storage: SharedStorage, dispatcher: ContentDispatcher) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Downloads `object_name`, stages it and extracts its documents.
    ///
    /// Documents are stamped with `filename` (unless the extractor set one)
    /// and `source`. The staged copy is gone by the time this returns.
    pub async fn fetch_and_parse(
        &self,
        coordinate: &BucketCoordinate,
        object_name: &str,
    ) -> Result<Vec<Document>> {
        let with_context = |err: Error| {
            err.with_namespace(coordinate.namespace())
                .with_bucket(coordinate.bucket_name())
                .with_object(object_name)
        };

        let data = self
            .storage
            .get_object(coordinate, object_name)
            .await
            .map_err(|e| {
                let message = format!("cannot fetch '{object_name}': {}", e.message());
                with_context(Error::retrieval(message).with_source(e))
            })?;

        tracing::debug!(
            target: TRACING_TARGET,
            object = object_name,
            size = data.len(),
            "Fetched object"
        );

        let staged = StagedObject::write(object_name, &data)
            .await
            .map_err(with_context)?;
        drop(data);

        let mut documents = self
            .dispatcher
            .parse(staged.path(), object_name)
            .map_err(with_context)?;
        drop(staged);

        let source = coordinate.object_uri(object_name);
        for document in &mut documents {
            let metadata = document.metadata_mut();
            metadata.insert_if_absent(keys::FILENAME, object_name);
            metadata.insert_if_absent(keys::SOURCE, source.as_str());
        }

        Ok(documents)
    }
}

impl fmt::Debug for ObjectFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFetcher")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
