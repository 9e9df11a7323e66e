//! OCI Object Storage through its S3-compatibility API, using
//! [`object_store::aws::AmazonS3Builder`].
//!
//! Each bucket gets its own store; the endpoint is derived from the bucket's
//! namespace and the configured region unless one is given explicitly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};

use crate::client::StoreConnector;
use crate::types::{BucketCoordinate, StorageError};

/// Config keys recognized in an explicit map or a config-file profile.
pub mod config_keys {
    /// OCI region identifier (e.g. `us-ashburn-1`).
    pub const REGION: &str = "region";
    /// Customer secret key access key.
    pub const ACCESS_KEY_ID: &str = "access_key_id";
    /// Customer secret key secret.
    pub const SECRET_ACCESS_KEY: &str = "secret_access_key";
    /// Session token for temporary credentials.
    pub const SESSION_TOKEN: &str = "session_token";
    /// Endpoint override (e.g. `http://localhost:9000` for a local emulator).
    pub const ENDPOINT: &str = "endpoint";
}

/// Typed credentials for OCI Object Storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciCredentials {
    /// OCI region identifier.
    pub region: String,
    /// Customer secret key access key.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Customer secret key secret.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,
    /// Endpoint override; derived from namespace and region when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl OciCredentials {
    /// Creates credentials for `region` with no keys.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            endpoint: None,
        }
    }

    /// Sets the customer secret key pair.
    pub fn with_keys(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Sets the endpoint override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Reads credentials from a flat key/value map.
    ///
    /// Keys not listed in [`config_keys`] (such as the API-signing `user` or
    /// `fingerprint` of an OCI profile) are ignored. Empty values count as
    /// absent.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, StorageError> {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        let Some(region) = get(config_keys::REGION) else {
            return Err(StorageError::invalid_config("missing required key 'region'"));
        };

        let credentials = Self {
            region,
            access_key_id: get(config_keys::ACCESS_KEY_ID),
            secret_access_key: get(config_keys::SECRET_ACCESS_KEY),
            session_token: get(config_keys::SESSION_TOKEN),
            endpoint: get(config_keys::ENDPOINT),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Checks the credentials for problems detectable without network access.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.region.trim().is_empty() {
            return Err(StorageError::invalid_config("region cannot be empty"));
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(StorageError::invalid_config(
                "access_key_id and secret_access_key must be set together",
            ));
        }

        if let Some(endpoint) = &self.endpoint
            && !(endpoint.starts_with("https://") || endpoint.starts_with("http://"))
        {
            return Err(StorageError::invalid_config(format!(
                "endpoint '{endpoint}' must start with http:// or https://"
            )));
        }

        Ok(())
    }

    /// Returns the endpoint serving buckets of `namespace`.
    pub fn endpoint_for(&self, namespace: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_owned(),
            None => format!(
                "https://{namespace}.compat.objectstorage.{}.oraclecloud.com",
                self.region
            ),
        }
    }

    /// Returns a masked version of the access key for logging.
    ///
    /// This shows only the first 4 characters followed by asterisks.
    pub fn access_key_masked(&self) -> Option<String> {
        self.access_key_id.as_ref().map(|key| {
            if key.len() <= 4 {
                "*".repeat(key.len())
            } else {
                format!("{}***", &key[..4])
            }
        })
    }
}

impl fmt::Debug for OciCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciCredentials")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_masked())
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// [`StoreConnector`] building S3-compatible stores for OCI buckets.
#[derive(Debug, Clone)]
pub struct OciConnector {
    credentials: OciCredentials,
}

impl OciConnector {
    /// Identifier used in error labels.
    pub const ID: &str = "oci";

    /// Creates a connector after validating `credentials`.
    pub fn new(credentials: OciCredentials) -> Result<Self, StorageError> {
        credentials.validate()?;
        Ok(Self { credentials })
    }

    /// Returns the connector credentials.
    pub fn credentials(&self) -> &OciCredentials {
        &self.credentials
    }
}

impl StoreConnector for OciConnector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn connect(&self, coordinate: &BucketCoordinate) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let creds = &self.credentials;
        let endpoint = creds.endpoint_for(coordinate.namespace());

        // Keys missing from the config fall back to the AWS_* environment.
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(coordinate.bucket_name())
            .with_region(&creds.region)
            .with_virtual_hosted_style_request(false)
            .with_endpoint(&endpoint);

        if endpoint.starts_with("http://") {
            builder = builder.with_allow_http(true);
        }

        if let Some(access_key) = &creds.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &creds.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if let Some(token) = &creds.session_token {
            builder = builder.with_token(token);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::service(e.to_string(), Self::ID, false).with_source(e))?;

        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageErrorKind;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn from_map_reads_known_keys() {
        let creds = OciCredentials::from_map(&map(&[
            ("region", "eu-frankfurt-1"),
            ("access_key_id", "AKIATEST12345"),
            ("secret_access_key", "secret"),
            ("fingerprint", "aa:bb"),
        ]))
        .unwrap();

        assert_eq!(creds.region, "eu-frankfurt-1");
        assert_eq!(creds.access_key_masked().as_deref(), Some("AKIA***"));
        assert!(creds.endpoint.is_none());
    }

    #[test]
    fn from_map_requires_region() {
        let err = OciCredentials::from_map(&map(&[("region", "  ")])).unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidConfig);
    }

    #[test]
    fn keys_must_be_paired() {
        let err = OciCredentials::from_map(&map(&[
            ("region", "us-ashburn-1"),
            ("access_key_id", "only-half"),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidConfig);
    }

    #[test]
    fn endpoint_derivation() {
        let creds = OciCredentials::new("us-phoenix-1");
        assert_eq!(
            creds.endpoint_for("axaxnpcrorw5"),
            "https://axaxnpcrorw5.compat.objectstorage.us-phoenix-1.oraclecloud.com"
        );

        let creds = creds.with_endpoint("http://localhost:9000/");
        assert_eq!(creds.endpoint_for("ignored"), "http://localhost:9000");
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let creds = OciCredentials::new("us-ashburn-1").with_endpoint("localhost:9000");
        assert!(OciConnector::new(creds).is_err());
    }

    #[test]
    fn debug_masks_secrets() {
        let creds = OciCredentials::new("us-ashburn-1").with_keys("AKIATEST12345", "topsecret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("AKIATEST12345"));
    }

    #[test]
    fn connect_builds_store() {
        let creds = OciCredentials::new("us-ashburn-1")
            .with_keys("access", "secret")
            .with_endpoint("http://localhost:9000");
        let connector = OciConnector::new(creds).unwrap();
        let coordinate = BucketCoordinate::new("ns", "docs").unwrap();
        assert!(connector.connect(&coordinate).is_ok());
    }
}
