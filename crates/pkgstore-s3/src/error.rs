//! Storage error types.

use std::path::PathBuf;

use pkgstore_object::{BoxedError, ClientError, is_retryable_status};

use crate::Operation;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// Every operation is all-or-nothing: an error means nothing was returned,
/// and nothing is retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The request failed before the store sent a response.
    #[error("network error: {message}")]
    Transport {
        /// Failure description.
        message: String,
        /// Underlying transport error, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// The store answered with a non-success status.
    #[error("{operation} failed with status {status}")]
    Status {
        /// Operation that was rejected.
        operation: Operation,
        /// HTTP-level status code.
        status: u16,
    },

    /// The object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A local file could not be read or written.
    #[error("local file error at {}: {source}", path.display())]
    Io {
        /// Local path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The storage configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A truncated listing page did not move the cursor.
    #[error("listing stalled after {pages} page(s): truncated page did not advance past marker {marker:?}")]
    Pagination {
        /// Marker the stalled request was sent with.
        marker: String,
        /// Number of pages fetched, including the stalled one.
        pages: usize,
    },
}

impl StorageError {
    /// Creates a status error.
    pub fn status(operation: Operation, status: u16) -> Self {
        Self::Status { operation, status }
    }

    /// Creates a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Creates a local I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Returns the status code carried by a [`StorageError::Status`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller may reasonably retry the operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::NotFound(_) | Self::Io { .. } | Self::Config(_) | Self::Pagination { .. } => {
                false
            }
        }
    }

    /// Converts a client error raised while performing `operation`.
    pub(crate) fn from_client(operation: Operation, err: ClientError) -> Self {
        match err {
            ClientError::Transport { message, source } => Self::Transport { message, source },
            ClientError::NotFound(path) => Self::not_found(path),
            ClientError::Status { status, .. } => Self::Status { operation, status },
            ClientError::Io { path, source } => Self::Io { path, source },
            ClientError::Config(reason) => Self::Config(reason),
        }
    }
}
