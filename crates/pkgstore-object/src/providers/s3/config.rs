//! S3 connection configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult};

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible service.
///
/// Works with AWS S3, MinIO, and any S3-compatible service. Credentials
/// left unset are resolved from the default AWS provider chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct S3ClientConfig {
    /// Bucket holding the objects
    #[cfg_attr(feature = "config", arg(long = "s3-bucket", env = "PKGSTORE_S3_BUCKET"))]
    pub bucket: String,

    /// AWS region
    #[serde(default = "default_region")]
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-region", env = "PKGSTORE_S3_REGION", default_value = DEFAULT_REGION)
    )]
    pub region: String,

    /// Endpoint URL for S3-compatible services (e.g. `http://localhost:9000`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "config", arg(long = "s3-endpoint", env = "PKGSTORE_S3_ENDPOINT"))]
    pub endpoint: Option<String>,

    /// Access key ID for static credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-access-key-id", env = "PKGSTORE_S3_ACCESS_KEY_ID")
    )]
    pub access_key_id: Option<String>,

    /// Secret access key for static credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-secret-access-key", env = "PKGSTORE_S3_SECRET_ACCESS_KEY")
    )]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-session-token", env = "PKGSTORE_S3_SESSION_TOKEN")
    )]
    pub session_token: Option<String>,

    /// Use path-style addressing (defaults to on when an endpoint is set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-force-path-style", env = "PKGSTORE_S3_FORCE_PATH_STYLE")
    )]
    pub force_path_style: Option<bool>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl S3ClientConfig {
    /// Creates a configuration for `bucket` in the default region.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            force_path_style: None,
        }
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets a custom endpoint (for S3-compatible storage).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets static access credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Sets the session token for temporary credentials.
    #[must_use]
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Forces path-style (`true`) or virtual-hosted (`false`) addressing.
    #[must_use]
    pub fn with_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = Some(force_path_style);
        self
    }

    /// Whether requests use path-style addressing.
    #[inline]
    pub fn path_style(&self) -> bool {
        self.force_path_style.unwrap_or(self.endpoint.is_some())
    }

    /// Whether static credentials are configured.
    #[inline]
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(ClientError::config("bucket cannot be empty"));
        }

        if self.region.trim().is_empty() {
            return Err(ClientError::config("region cannot be empty"));
        }

        if let Some(endpoint) = &self.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ClientError::config(format!(
                "invalid endpoint URL: {endpoint}"
            )));
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ClientError::config(
                "access key ID and secret access key must be set together",
            ));
        }

        if self.session_token.is_some() && !self.has_static_credentials() {
            return Err(ClientError::config(
                "session token requires static credentials",
            ));
        }

        Ok(())
    }
}
