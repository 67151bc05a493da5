#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the AWS SDK-backed S3 client.
pub const TRACING_TARGET_S3: &str = "pkgstore_object::s3";

/// Tracing target for the `object_store`-backed client.
pub const TRACING_TARGET_OBJECT_STORE: &str = "pkgstore_object::object_store";

mod client;
mod error;
pub mod providers;
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use client::ObjectClient;
pub use error::{BoxedError, ClientError, ClientResult, is_retryable_status};
pub use providers::{ObjectStoreClient, S3Client, S3ClientConfig};
pub use types::{
    ByteStream, GetResponse, ListEntry, ListPage, ListParams, PutHeaders, PutResponse,
};
