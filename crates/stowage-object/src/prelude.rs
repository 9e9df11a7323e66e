//! Convenience re-exports.

pub use crate::bootstrap::{ClientProvider, Credentials, OciClientProvider, initialize_client};
pub use crate::client::{
    MAX_PAGE_SIZE, ObjectStorage, ObjectStoreClient, SharedStorage, StoreConnector,
};
pub use crate::providers::{OciConnector, OciCredentials};
pub use crate::types::{
    BucketCoordinate, DescriptorField, ListingPage, ObjectDescriptor, StorageError,
    StorageErrorKind,
};
