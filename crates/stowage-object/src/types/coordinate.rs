//! Bucket coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};
use stowage_core::{Error, Result};

/// Identifies a bucket within a storage namespace.
///
/// Both parts are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", rename_all = "camelCase")]
pub struct BucketCoordinate {
    namespace: String,
    bucket_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoordinate {
    namespace: String,
    bucket_name: String,
}

impl TryFrom<RawCoordinate> for BucketCoordinate {
    type Error = Error;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.namespace, raw.bucket_name)
    }
}

impl BucketCoordinate {
    /// Creates a coordinate, rejecting an empty namespace or bucket name.
    pub fn new(namespace: impl Into<String>, bucket_name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let bucket_name = bucket_name.into();

        if namespace.is_empty() || bucket_name.is_empty() {
            return Err(Error::configuration(
                "namespace and bucket name cannot be empty",
            ));
        }

        Ok(Self {
            namespace,
            bucket_name,
        })
    }

    /// Returns the namespace.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the bucket name.
    #[inline]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Returns the `oci://bucket@namespace/object` URI of an object.
    pub fn object_uri(&self, object_name: &str) -> String {
        format!("oci://{}@{}/{}", self.bucket_name, self.namespace, object_name)
    }
}

impl fmt::Display for BucketCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.bucket_name, self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use stowage_core::ErrorKind;

    use super::*;

    #[test]
    fn rejects_empty_parts() {
        let err = BucketCoordinate::new("", "bucket").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = BucketCoordinate::new("ns", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn object_uri() {
        let coordinate = BucketCoordinate::new("axaxnpcrorw5", "reports").unwrap();
        assert_eq!(
            coordinate.object_uri("2024/q1.pdf"),
            "oci://reports@axaxnpcrorw5/2024/q1.pdf"
        );
        assert_eq!(coordinate.to_string(), "reports@axaxnpcrorw5");
    }

    #[test]
    fn deserialize_validates() {
        let ok: BucketCoordinate =
            serde_json::from_str(r#"{ "namespace": "ns", "bucketName": "b" }"#).unwrap();
        assert_eq!(ok.bucket_name(), "b");

        let json = r#"{ "namespace": "", "bucketName": "b" }"#;
        assert!(serde_json::from_str::<BucketCoordinate>(json).is_err());
    }
}
