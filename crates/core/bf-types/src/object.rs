//! Object listing entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One object as returned by a bucket listing.
///
/// Serialized with the object store's own field names so that emitted
/// `data` fields look like the raw listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectEntry {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes
    pub size: u64,

    /// Last modified timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    /// Entity tag as reported by the store (quotes included)
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
            storage_class: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = Some(storage_class.into());
        self
    }

    /// The key's file name (after the last `/`).
    pub fn base_name(&self) -> &str {
        base_name(&self.key)
    }
}

/// Substring of `key` after the last `/`, or the whole key.
pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
