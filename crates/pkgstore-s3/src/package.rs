//! Registry-facing storage trait.

use std::path::Path;

use bytes::Bytes;
use pkgstore_object::{ListPage, ListParams, ObjectClient};

use crate::cursor::ObjectKeys;
use crate::{S3Storage, StorageResult, UploadOptions, UploadResult};

/// Package storage as seen by the registry server.
///
/// Lets the server hold an `Arc<dyn PackageStorage>` without naming the
/// client type.
#[async_trait::async_trait]
pub trait PackageStorage: Send + Sync {
    /// Uploads the file at `source` under `options.key`.
    async fn upload(
        &self,
        source: &Path,
        options: &UploadOptions,
    ) -> StorageResult<UploadResult>;

    /// Uploads `content` under `options.key`.
    async fn upload_buffer(
        &self,
        content: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<UploadResult>;

    /// Downloads the object under `key` into `save_path`.
    async fn download(&self, key: &str, save_path: &Path) -> StorageResult<()>;

    /// Removes the object under `key`.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// Fetches one listing page.
    async fn list(&self, params: &ListParams) -> StorageResult<ListPage>;

    /// Collects every key across all listing pages.
    async fn list_all(&self, params: ListParams) -> StorageResult<ObjectKeys>;
}

#[async_trait::async_trait]
impl<C: ObjectClient> PackageStorage for S3Storage<C> {
    async fn upload(
        &self,
        source: &Path,
        options: &UploadOptions,
    ) -> StorageResult<UploadResult> {
        S3Storage::upload(self, source, options).await
    }

    async fn upload_buffer(
        &self,
        content: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<UploadResult> {
        S3Storage::upload_buffer(self, content, options).await
    }

    async fn download(&self, key: &str, save_path: &Path) -> StorageResult<()> {
        S3Storage::download(self, key, save_path).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        S3Storage::remove(self, key).await
    }

    async fn list(&self, params: &ListParams) -> StorageResult<ListPage> {
        S3Storage::list(self, params).await
    }

    async fn list_all(&self, params: ListParams) -> StorageResult<ObjectKeys> {
        S3Storage::list_all(self, params).await
    }
}
