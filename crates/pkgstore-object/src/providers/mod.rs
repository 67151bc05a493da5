//! Object client implementations.

mod s3;
mod store;

pub use s3::{DEFAULT_REGION, S3Client, S3ClientConfig};
pub use store::{DEFAULT_MAX_KEYS, ObjectStoreClient};
