//! Error type reported by storage backends.

use std::fmt;

use strum::{AsRefStr, IntoStaticStr};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Distinguishable failure categories of a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StorageErrorKind {
    /// The service rejected or failed a request.
    Service,
    /// The requested object or bucket does not exist.
    NotFound,
    /// The configuration source (file, profile) could not be located.
    ConfigNotFound,
    /// The configuration was located but is unusable.
    InvalidConfig,
}

/// A lightweight error carrying a kind, a message, an optional source, and a
/// retryable flag.
pub struct StorageError {
    kind: StorageErrorKind,
    message: String,
    source: Option<BoxedError>,
    retryable: bool,
}

impl StorageError {
    /// Create an error of the given kind formatted as `[{label}] {msg}`.
    pub fn new(
        kind: StorageErrorKind,
        msg: impl fmt::Display,
        label: &str,
        retryable: bool,
    ) -> Self {
        Self {
            kind,
            message: format!("[{label}] {msg}"),
            source: None,
            retryable,
        }
    }

    /// Create a service error.
    pub fn service(msg: impl fmt::Display, label: &str, retryable: bool) -> Self {
        Self::new(StorageErrorKind::Service, msg, label, retryable)
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl fmt::Display, label: &str) -> Self {
        Self::new(StorageErrorKind::NotFound, msg, label, false)
    }

    /// Create a config-source-not-found error.
    pub fn config_not_found(msg: impl fmt::Display) -> Self {
        Self::new(StorageErrorKind::ConfigNotFound, msg, "config", false)
    }

    /// Create an invalid-config error.
    pub fn invalid_config(msg: impl fmt::Display) -> Self {
        Self::new(StorageErrorKind::InvalidConfig, msg, "config", false)
    }

    /// Attach a source error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the failure category.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Returns the formatted message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the caller could retry this operation.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("retryable", &self.retryable)
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Convert an [`object_store::Error`] into a [`StorageError`].
pub(crate) fn from_object_store(err: object_store::Error) -> StorageError {
    let kind = match err {
        object_store::Error::NotFound { .. } => StorageErrorKind::NotFound,
        _ => StorageErrorKind::Service,
    };
    let retryable = !matches!(
        err,
        object_store::Error::NotFound { .. }
            | object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. }
            | object_store::Error::AlreadyExists { .. }
            | object_store::Error::Precondition { .. }
    );
    StorageError::new(kind, err.to_string(), "object-store", retryable).with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_labelled() {
        let err = StorageError::service("bucket unavailable", "oci", true);
        assert_eq!(err.to_string(), "[oci] bucket unavailable");
        assert_eq!(err.kind(), StorageErrorKind::Service);
        assert!(err.is_retryable());
    }

    #[test]
    fn config_kinds() {
        assert_eq!(
            StorageError::config_not_found("missing").kind(),
            StorageErrorKind::ConfigNotFound
        );
        assert_eq!(
            StorageError::invalid_config("bad").kind().as_ref(),
            "invalid_config"
        );
    }

    #[test]
    fn object_store_not_found_is_not_retryable() {
        let err = from_object_store(object_store::Error::NotFound {
            path: "missing.txt".into(),
            source: "no such key".into(),
        });
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert!(!err.is_retryable());
    }
}
