//! Error types for object store client operations.

use std::path::PathBuf;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for all client operations in this crate.
pub type ClientResult<T, E = ClientError> = std::result::Result<T, E>;

/// Errors reported by an [`ObjectClient`](crate::ObjectClient).
///
/// A store that answered a put with a non-success status is *not* an error
/// at this level: the status is returned in
/// [`PutResponse`](crate::PutResponse) so the caller decides what counts
/// as success.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request failed before any response was received.
    #[error("network error: {message}")]
    Transport {
        /// Human-readable failure description.
        message: String,
        /// Underlying transport error, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The store answered with a non-success status.
    #[error("{operation} failed with status {status}")]
    Status {
        /// Name of the request that failed (e.g. `"delete"`).
        operation: &'static str,
        /// HTTP-level status code.
        status: u16,
    },

    /// Reading a local source file failed.
    #[error("local file error at {}: {source}", path.display())]
    Io {
        /// Path of the local file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Creates a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error wrapping `source`.
    pub fn transport_from(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a not found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Creates a status error for `operation`.
    pub fn status(operation: &'static str, status: u16) -> Self {
        Self::Status { operation, status }
    }

    /// Creates a local I/O error for `path`.
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

    /// Whether the caller may reasonably retry the operation.
    ///
    /// Transport failures, throttling and server-side statuses are
    /// retryable; everything else is not. Nothing in this crate retries on
    /// its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::NotFound(_) | Self::Io { .. } | Self::Config(_) => false,
        }
    }
}

/// Whether an HTTP status indicates a transient failure.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_contains_code() {
        let err = ClientError::status("delete", 403);
        assert_eq!(err.to_string(), "delete failed with status 403");
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_classification() {
        assert!(ClientError::transport("connection reset").is_retryable());
        assert!(ClientError::status("list", 503).is_retryable());
        assert!(ClientError::status("list", 429).is_retryable());
        assert!(!ClientError::not_found("pkgs/a.tgz").is_retryable());
        assert!(!ClientError::config("missing bucket").is_retryable());
    }

    #[test]
    fn transport_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClientError::transport_from("put failed", io);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "network error: put failed");
    }
}
