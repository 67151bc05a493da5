//! Upload options and results.

use serde::{Deserialize, Serialize};

/// Options for [`S3Storage::upload`](crate::S3Storage::upload) and
/// [`S3Storage::upload_buffer`](crate::S3Storage::upload_buffer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    /// Registry key of the object, before normalization.
    pub key: String,
    /// Content size in bytes, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl UploadOptions {
    /// Creates options for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }

    /// Sets the content size.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// The key as given by the caller, not the normalized store path.
    pub key: String,
}

impl UploadResult {
    /// Creates a result for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}
