//! Storage operation names.

use strum::{AsRefStr, Display};

/// Operation performed by [`S3Storage`](crate::S3Storage).
///
/// Carried by [`StorageError::Status`](crate::StorageError::Status) and used
/// as the `operation` field of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Building the store client.
    Connect,
    /// Upload from a local file.
    Upload,
    /// Upload from an in-memory buffer.
    UploadBuffer,
    /// Download to a local file.
    Download,
    /// Object removal.
    Remove,
    /// Single listing page.
    List,
    /// Aggregated listing across pages.
    ListAll,
}
