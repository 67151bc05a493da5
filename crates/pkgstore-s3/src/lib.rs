#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod cursor;
mod error;
mod operation;
mod options;
mod package;
mod path;
mod save;
mod storage;

#[cfg(test)]
mod testing;

#[doc(hidden)]
pub mod prelude;

pub use config::StorageConfig;
pub use cursor::{ListCursor, ObjectKeys};
pub use error::{StorageError, StorageResult};
pub use operation::Operation;
pub use options::{UploadOptions, UploadResult};
pub use package::PackageStorage;
pub use path::{KeyNormalizer, escape_key, join_path};
pub use pkgstore_object::{ListEntry, ListPage, ListParams, S3ClientConfig};
pub use save::save_to;
pub use storage::{S3Storage, TARBALL_CONTENT_TYPE};

/// Tracing target for package storage operations.
pub const TRACING_TARGET: &str = "pkgstore_s3";
