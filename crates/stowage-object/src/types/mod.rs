//! Values exchanged with a storage backend.

mod coordinate;
mod descriptor;
pub(crate) mod error;
mod listing;

pub use coordinate::BucketCoordinate;
pub use descriptor::{DescriptorField, ObjectDescriptor};
pub use error::{StorageError, StorageErrorKind};
pub use listing::ListingPage;
