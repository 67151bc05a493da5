//! S3-compatible provider.

mod client;
mod config;

pub use client::S3Client;
pub use config::{DEFAULT_REGION, S3ClientConfig};
