//! Storage configuration.

#[cfg(feature = "config")]
use clap::Args;
use pkgstore_object::S3ClientConfig;
use serde::{Deserialize, Serialize};

use crate::{Operation, StorageError, StorageResult};

/// Configuration of an [`S3Storage`](crate::S3Storage).
///
/// Connection settings are flattened in, so a single JSON object or a single
/// set of CLI flags configures both the adapter and its client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Folder prefix prepended to every object key
    #[serde(default)]
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-folder", env = "PKGSTORE_FOLDER", default_value = "")
    )]
    pub folder: String,

    /// Storage class applied to file uploads (e.g. `STANDARD_IA`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-class", env = "PKGSTORE_STORAGE_CLASS")
    )]
    pub storage_class: Option<String>,

    /// Connection settings for the S3-compatible service
    #[serde(flatten)]
    #[cfg_attr(feature = "config", command(flatten))]
    pub client: S3ClientConfig,
}

impl StorageConfig {
    /// Creates a configuration for `bucket` with no folder prefix.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self::from_client(S3ClientConfig::new(bucket))
    }

    /// Creates a configuration around existing connection settings.
    pub fn from_client(client: S3ClientConfig) -> Self {
        Self {
            folder: String::new(),
            storage_class: None,
            client,
        }
    }

    /// Sets the folder prefix.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Sets the storage class for file uploads.
    #[must_use]
    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = Some(storage_class.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StorageResult<()> {
        self.client
            .validate()
            .map_err(|e| StorageError::from_client(Operation::Connect, e))?;

        if let Some(storage_class) = &self.storage_class
            && storage_class.trim().is_empty()
        {
            return Err(StorageError::config("storage class cannot be empty"));
        }

        if self.folder.contains('\\') {
            return Err(StorageError::config(format!(
                "folder must use '/' separators: {}",
                self.folder
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StorageConfig::new("registry");
        assert_eq!(config.folder, "");
        assert_eq!(config.storage_class, None);
        assert_eq!(config.client.bucket, "registry");
        config.validate().unwrap();
    }

    #[test]
    fn builders() {
        let config = StorageConfig::new("registry")
            .with_folder("cnpm")
            .with_storage_class("STANDARD_IA");
        assert_eq!(config.folder, "cnpm");
        assert_eq!(config.storage_class.as_deref(), Some("STANDARD_IA"));
    }

    #[test]
    fn validate_rejects_bad_input() {
        let err = StorageConfig::new("").validate().unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));

        let err = StorageConfig::new("registry")
            .with_storage_class(" ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));

        assert!(
            StorageConfig::new("registry")
                .with_folder("a\\b")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn deserialize_flattened() {
        let config: StorageConfig = serde_json::from_str(
            r#"{"folder":"cnpm","storageClass":"STANDARD","bucket":"registry","region":"eu-west-1"}"#,
        )
        .unwrap();
        assert_eq!(config.folder, "cnpm");
        assert_eq!(config.storage_class.as_deref(), Some("STANDARD"));
        assert_eq!(config.client.bucket, "registry");
        assert_eq!(config.client.region, "eu-west-1");
    }

    #[test]
    fn serde_round_trip() {
        let config = StorageConfig::new("registry")
            .with_folder("cnpm")
            .with_storage_class("STANDARD_IA");
        let json = serde_json::to_string(&config).unwrap();
        let back: StorageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
