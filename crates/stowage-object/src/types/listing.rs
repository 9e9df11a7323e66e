//! One page of a bucket listing.

use serde::{Deserialize, Serialize};

use super::ObjectDescriptor;

/// A page of listed objects and the cursor to request the next one.
///
/// A present `next_start_with` means more pages may exist; its absence means
/// the listing is complete for the requested prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Listed objects in listing order.
    pub objects: Vec<ObjectDescriptor>,
    /// Opaque continuation token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_start_with: Option<String>,
}

impl ListingPage {
    /// Creates a page.
    pub fn new(objects: Vec<ObjectDescriptor>, next_start_with: Option<String>) -> Self {
        Self {
            objects,
            next_start_with,
        }
    }

    /// Creates a final page (no continuation token).
    pub fn last(objects: Vec<ObjectDescriptor>) -> Self {
        Self::new(objects, None)
    }

    /// Returns true if the page holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns true if no further page should be requested.
    pub fn is_final(&self) -> bool {
        self.next_start_with.is_none()
    }
}
