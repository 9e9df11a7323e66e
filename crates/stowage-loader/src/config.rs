//! Loader configuration.

use serde::{Deserialize, Serialize};
use stowage_core::Result;
use stowage_object::bootstrap::Credentials;
use stowage_object::types::BucketCoordinate;
use strum::{AsRefStr, Display, EnumString};

/// What to do when a single object cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObjectErrorPolicy {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Log the failure, count the object as processed and continue.
    Skip,
}

/// Immutable description of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Bucket to enumerate.
    pub coordinate: BucketCoordinate,
    /// Only objects whose names start with this string are loaded.
    #[serde(default)]
    pub prefix: String,
    /// Storage credentials.
    #[serde(default)]
    pub credentials: Credentials,
    /// Descriptor fields copied into every document's metadata.
    #[serde(default)]
    pub metadata_keys: Vec<String>,
    /// Upper bound on the number of objects processed per load.
    #[serde(default)]
    pub max_objects: Option<usize>,
    /// Per-object failure handling.
    #[serde(default)]
    pub on_object_error: ObjectErrorPolicy,
}

impl LoaderConfig {
    /// Starts a builder for the bucket `bucket_name` in `namespace`.
    ///
    /// Fails with [`ErrorKind::Configuration`] if either is empty.
    ///
    /// [`ErrorKind::Configuration`]: stowage_core::ErrorKind::Configuration
    pub fn builder(
        namespace: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Result<LoaderConfigBuilder> {
        let namespace = namespace.into();
        let bucket_name = bucket_name.into();
        let coordinate = BucketCoordinate::new(namespace.as_str(), bucket_name.as_str())
            .map_err(|e| e.with_namespace(namespace).with_bucket(bucket_name))?;
        Ok(LoaderConfigBuilder::new(coordinate))
    }

    /// Returns true if `count` processed objects reach the cap.
    pub(crate) fn cap_reached(&self, count: usize) -> bool {
        self.max_objects.is_some_and(|max| count >= max)
    }
}

/// Builder for [`LoaderConfig`].
#[derive(Debug, Clone)]
#[must_use]
pub struct LoaderConfigBuilder {
    config: LoaderConfig,
}

impl LoaderConfigBuilder {
    /// Creates a builder for `coordinate` with default settings.
    pub fn new(coordinate: BucketCoordinate) -> Self {
        Self {
            config: LoaderConfig {
                coordinate,
                prefix: String::new(),
                credentials: Credentials::default(),
                metadata_keys: Vec::new(),
                max_objects: None,
                on_object_error: ObjectErrorPolicy::default(),
            },
        }
    }

    /// Restricts the load to names starting with `prefix`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Sets the storage credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Sets the descriptor fields copied into document metadata.
    pub fn metadata_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.metadata_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Caps the number of objects processed per load.
    pub fn max_objects(mut self, max_objects: usize) -> Self {
        self.config.max_objects = Some(max_objects);
        self
    }

    /// Sets the per-object failure policy.
    pub fn on_object_error(mut self, policy: ObjectErrorPolicy) -> Self {
        self.config.on_object_error = policy;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> LoaderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use stowage_core::ErrorKind;

    use super::*;

    #[test]
    fn empty_namespace_or_bucket() {
        let err = LoaderConfig::builder("", "docs").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.context().bucket.as_deref(), Some("docs"));

        let err = LoaderConfig::builder("ns", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn builder_defaults() {
        let config = LoaderConfig::builder("ns", "docs").unwrap().build();
        assert_eq!(config.prefix, "");
        assert_eq!(config.credentials, Credentials::Profile(None));
        assert_eq!(config.max_objects, None);
        assert_eq!(config.on_object_error, ObjectErrorPolicy::Abort);
        assert!(!config.cap_reached(usize::MAX));
    }

    #[test]
    fn cap() {
        let config = LoaderConfig::builder("ns", "docs")
            .unwrap()
            .max_objects(2)
            .build();
        assert!(!config.cap_reached(1));
        assert!(config.cap_reached(2));

        let config = LoaderConfig::builder("ns", "docs")
            .unwrap()
            .max_objects(0)
            .build();
        assert!(config.cap_reached(0));
    }

    #[test]
    fn deserializes_from_json() {
        let config: LoaderConfig = serde_json::from_str(
            r#"{
                "coordinate": { "namespace": "ns", "bucketName": "docs" },
                "prefix": "reports/",
                "metadataKeys": ["size"],
                "maxObjects": 10,
                "onObjectError": "skip"
            }"#,
        )
        .unwrap();
        assert_eq!(config.coordinate.bucket_name(), "docs");
        assert_eq!(config.on_object_error, ObjectErrorPolicy::Skip);

        let err = serde_json::from_str::<LoaderConfig>(
            r#"{ "coordinate": { "namespace": "", "bucketName": "docs" } }"#,
        );
        assert!(err.is_err());
    }
}
