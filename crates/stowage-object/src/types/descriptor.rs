//! Object descriptors produced by listing.

use object_store::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Fixed set of descriptor fields that may be copied into document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DescriptorField {
    /// Object name (key).
    Name,
    /// Size in bytes.
    Size,
    /// Entity tag.
    Etag,
    /// Base64-encoded MD5 of the content.
    Md5,
    /// Creation time.
    TimeCreated,
    /// Last modification time.
    TimeModified,
    /// Storage tier (e.g. `Standard`, `InfrequentAccess`, `Archive`).
    StorageTier,
    /// Archival state of archived objects.
    ArchivalState,
    /// Backend object version.
    Version,
}

/// Summary of one listed object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Object name (key), may contain `/` separators.
    pub name: String,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Base64-encoded MD5 of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<jiff::Timestamp>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_modified: Option<jiff::Timestamp>,
    /// Storage tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_tier: Option<String>,
    /// Archival state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archival_state: Option<String>,
    /// Backend object version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ObjectDescriptor {
    /// Creates a descriptor carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the entity tag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the last modification time.
    pub fn with_time_modified(mut self, time: jiff::Timestamp) -> Self {
        self.time_modified = Some(time);
        self
    }

    /// Sets the storage tier.
    pub fn with_storage_tier(mut self, tier: impl Into<String>) -> Self {
        self.storage_tier = Some(tier.into());
        self
    }

    /// Returns the value of a known field, or `None` when the backend did
    /// not report it.
    pub fn field(&self, field: DescriptorField) -> Option<Value> {
        let string = |s: &Option<String>| s.as_ref().map(|v| Value::String(v.clone()));
        let timestamp = |t: &Option<jiff::Timestamp>| t.map(|v| Value::String(v.to_string()));

        match field {
            DescriptorField::Name => Some(Value::String(self.name.clone())),
            DescriptorField::Size => self.size.map(Value::from),
            DescriptorField::Etag => string(&self.etag),
            DescriptorField::Md5 => string(&self.md5),
            DescriptorField::TimeCreated => timestamp(&self.time_created),
            DescriptorField::TimeModified => timestamp(&self.time_modified),
            DescriptorField::StorageTier => string(&self.storage_tier),
            DescriptorField::ArchivalState => string(&self.archival_state),
            DescriptorField::Version => string(&self.version),
        }
    }

    /// Looks up a field by its snake_case key.
    ///
    /// Unknown keys and unreported values both yield `None`.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        key.parse::<DescriptorField>()
            .ok()
            .and_then(|field| self.field(field))
    }
}

impl From<&ObjectMeta> for ObjectDescriptor {
    fn from(meta: &ObjectMeta) -> Self {
        let time_modified = meta
            .last_modified
            .timestamp_nanos_opt()
            .and_then(|nanos| jiff::Timestamp::from_nanosecond(i128::from(nanos)).ok());

        Self {
            name: meta.location.to_string(),
            size: Some(meta.size),
            etag: meta.e_tag.clone(),
            time_modified,
            version: meta.version.clone(),
            ..Default::default()
        }
    }
}
