//! Client bootstrap: turns [`Credentials`] into a storage handle.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stowage_core::{Error, Result};

use crate::TRACING_TARGET_BOOTSTRAP;
use crate::client::{ObjectStoreClient, SharedStorage};
use crate::providers::{OciConnector, OciCredentials, load_profile};
use crate::types::{BucketCoordinate, StorageError, StorageErrorKind};

/// Where storage credentials come from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "source", content = "value")]
pub enum Credentials {
    /// A flat configuration map (see [`config_keys`](crate::providers::config_keys)).
    Explicit(HashMap<String, String>),
    /// A named profile of the OCI config file; `None` selects `DEFAULT`.
    Profile(Option<String>),
}

impl Credentials {
    /// Credentials from the default profile.
    pub fn default_profile() -> Self {
        Self::Profile(None)
    }

    /// Credentials from the profile `name`.
    pub fn profile(name: impl Into<String>) -> Self {
        Self::Profile(Some(name.into()))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::default_profile()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                f.debug_tuple("Explicit").field(&keys).finish()
            }
            Self::Profile(name) => f.debug_tuple("Profile").field(name).finish(),
        }
    }
}

/// Builds storage handles from credentials.
///
/// [`ContainerLoader`] calls this once per load; substitute an implementation
/// to run the pipeline against something other than OCI.
///
/// [`ContainerLoader`]: https://docs.rs/stowage-loader
#[async_trait::async_trait]
pub trait ClientProvider: Send + Sync + 'static {
    /// Creates a handle able to serve `coordinate`.
    async fn connect(
        &self,
        credentials: &Credentials,
        coordinate: &BucketCoordinate,
    ) -> Result<SharedStorage>;
}

/// Default [`ClientProvider`] for OCI Object Storage.
#[derive(Debug, Clone, Default)]
pub struct OciClientProvider {
    config_file: Option<PathBuf>,
}

impl OciClientProvider {
    /// Creates a provider reading profiles from the default config location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads profiles from `path` instead of the default location.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    async fn build(&self, credentials: &Credentials) -> Result<ObjectStoreClient, StorageError> {
        let oci = match credentials {
            Credentials::Explicit(map) => OciCredentials::from_map(map)?,
            Credentials::Profile(name) => {
                let values = load_profile(self.config_file.as_deref(), name.as_deref()).await?;
                OciCredentials::from_map(&values)?
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_BOOTSTRAP,
            region = %oci.region,
            access_key = ?oci.access_key_masked(),
            endpoint = ?oci.endpoint,
            "Resolved OCI credentials"
        );

        Ok(ObjectStoreClient::with_connector(OciConnector::new(oci)?))
    }
}

#[async_trait::async_trait]
impl ClientProvider for OciClientProvider {
    async fn connect(
        &self,
        credentials: &Credentials,
        coordinate: &BucketCoordinate,
    ) -> Result<SharedStorage> {
        let result = match self.build(credentials).await {
            Ok(client) => client.prepare(coordinate).map(|_| client),
            Err(e) => Err(e),
        };

        match result {
            Ok(client) => {
                tracing::info!(
                    target: TRACING_TARGET_BOOTSTRAP,
                    namespace = coordinate.namespace(),
                    bucket = coordinate.bucket_name(),
                    "Storage client initialized"
                );
                Ok(Arc::new(client))
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_BOOTSTRAP,
                    error = %e,
                    kind = e.kind().as_ref(),
                    "Failed to initialize storage client"
                );
                Err(into_bootstrap_error(e)
                    .with_namespace(coordinate.namespace())
                    .with_bucket(coordinate.bucket_name()))
            }
        }
    }
}

/// A prebuilt client serves every load as is; credentials are ignored.
#[async_trait::async_trait]
impl ClientProvider for ObjectStoreClient {
    async fn connect(
        &self,
        _credentials: &Credentials,
        _coordinate: &BucketCoordinate,
    ) -> Result<SharedStorage> {
        Ok(Arc::new(self.clone()))
    }
}

/// Creates a storage handle from `credentials` with the default provider.
///
/// Stores are built per bucket on first use; use
/// [`ClientProvider::connect`] to validate a specific bucket up front.
pub async fn initialize_client(credentials: &Credentials) -> Result<SharedStorage> {
    match OciClientProvider::new().build(credentials).await {
        Ok(client) => Ok(Arc::new(client)),
        Err(e) => {
            tracing::error!(
                target: TRACING_TARGET_BOOTSTRAP,
                error = %e,
                "Failed to initialize storage client"
            );
            Err(into_bootstrap_error(e))
        }
    }
}

/// A missing config source is a configuration problem, anything else a
/// client construction failure.
fn into_bootstrap_error(err: StorageError) -> Error {
    let message = err.message().to_owned();
    match err.kind() {
        StorageErrorKind::ConfigNotFound => Error::configuration(message).with_source(err),
        _ => Error::client_init(message).with_source(err),
    }
}
