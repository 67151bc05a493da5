//! Convenience re-exports.

pub use crate::client::ObjectClient;
pub use crate::error::{ClientError, ClientResult};
pub use crate::providers::{ObjectStoreClient, S3Client, S3ClientConfig};
pub use crate::types::{
    ByteStream, GetResponse, ListEntry, ListPage, ListParams, PutHeaders, PutResponse,
};
