//! Convenience re-exports.

pub use crate::config::StorageConfig;
pub use crate::cursor::ObjectKeys;
pub use crate::error::{StorageError, StorageResult};
pub use crate::options::{UploadOptions, UploadResult};
pub use crate::package::PackageStorage;
pub use crate::storage::S3Storage;
pub use pkgstore_object::{ListPage, ListParams};
