//! Common error type definitions.

use std::fmt;

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source error in [`Error`], so any underlying failure
/// (storage SDK, I/O, parser) can be carried along with its chain intact.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while ingesting a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing credentials, or empty required fields.
    Configuration,
    /// The storage client could not be constructed.
    ClientInit,
    /// A page listing call failed.
    Listing,
    /// A get-object call failed.
    Retrieval,
    /// An extractor could not parse the object content.
    Parse,
    /// The transient local copy of an object could not be written.
    Staging,
}

/// Storage coordinates attached to an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Namespace of the offending bucket.
    pub namespace: Option<String>,
    /// Name of the offending bucket.
    pub bucket: Option<String>,
    /// Name of the offending object.
    pub object: Option<String>,
}

impl ErrorContext {
    /// Returns true if no coordinate has been recorded.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.bucket.is_none() && self.object.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        let parts = [
            ("namespace", &self.namespace),
            ("bucket", &self.bucket),
            ("object", &self.object),
        ];

        f.write_str(" (")?;
        let mut first = true;
        for (label, value) in parts {
            let Some(value) = value else { continue };
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{label}: {value}")?;
            first = false;
        }
        f.write_str(")")
    }
}

/// A structured error type for stowage operations.
#[derive(Debug, Error)]
#[error("{kind}: {message}{context}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Human-readable description, including the underlying cause.
    pub message: String,
    /// Namespace, bucket and object the error relates to.
    pub context: ErrorContext,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Creates a new client initialization error.
    pub fn client_init(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClientInit, message)
    }

    /// Creates a new listing error.
    pub fn listing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Listing, message)
    }

    /// Creates a new retrieval error.
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Retrieval, message)
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    /// Creates a new staging error.
    pub fn staging(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Staging, message)
    }

    /// Records the namespace this error relates to.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.context.namespace = Some(namespace.into());
        self
    }

    /// Records the bucket this error relates to.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.context.bucket = Some(bucket.into());
        self
    }

    /// Records the object this error relates to.
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.context.object = Some(object.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Adds an already boxed source error to this error.
    pub fn with_boxed_source(mut self, source: BoxedError) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the storage coordinates attached to this error.
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }
}
