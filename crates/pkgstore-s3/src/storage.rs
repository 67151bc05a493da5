//! Package storage over an object store client.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use pkgstore_object::{
    ClientResult, ListPage, ListParams, ObjectClient, PutHeaders, PutResponse, S3Client,
};

use crate::cursor::{ListCursor, ObjectKeys};
use crate::path::KeyNormalizer;
use crate::save::save_to;
use crate::{
    Operation, StorageConfig, StorageError, StorageResult, TRACING_TARGET, UploadOptions,
    UploadResult,
};

/// Content type sent with buffer uploads.
pub const TARBALL_CONTENT_TYPE: &str = "application/x-gzip";

/// Registry package storage backed by an S3-compatible object store.
///
/// Every key is normalized under the configured folder before it reaches
/// the store. Operations issue one request each (one per page for
/// [`list_all`](Self::list_all)), never retry, and return nothing partial
/// on failure. The client sits behind an `Arc`, so clones are cheap and
/// share it.
pub struct S3Storage<C = S3Client> {
    client: Arc<C>,
    normalizer: KeyNormalizer,
    storage_class: Option<String>,
}

impl<C> Clone for S3Storage<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            normalizer: self.normalizer.clone(),
            storage_class: self.storage_class.clone(),
        }
    }
}

impl<C> fmt::Debug for S3Storage<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Storage")
            .field("folder", &self.normalizer.folder())
            .field("storage_class", &self.storage_class)
            .finish_non_exhaustive()
    }
}

impl S3Storage<S3Client> {
    /// Connects to the configured S3-compatible service.
    pub async fn connect(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;

        let client = S3Client::connect(&config.client)
            .await
            .map_err(|e| StorageError::from_client(Operation::Connect, e))?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %config.client.bucket,
            region = %config.client.region,
            endpoint = ?config.client.endpoint,
            folder = %config.folder,
            storage_class = ?config.storage_class,
            "Package storage initialized"
        );

        let mut storage = Self::new(client).with_folder(config.folder);
        storage.storage_class = config.storage_class;
        Ok(storage)
    }
}

impl<C: ObjectClient> S3Storage<C> {
    /// Wraps `client` with no folder prefix and no storage class.
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    /// Wraps a shared client.
    pub fn from_arc(client: Arc<C>) -> Self {
        Self {
            client,
            normalizer: KeyNormalizer::default(),
            storage_class: None,
        }
    }

    /// Sets the folder prefix for object keys.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.normalizer = KeyNormalizer::new(folder);
        self
    }

    /// Sets the storage class applied to file uploads.
    #[must_use]
    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = Some(storage_class.into());
        self
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Returns the folder prefix.
    pub fn folder(&self) -> &str {
        self.normalizer.folder()
    }

    /// Returns the store path for a registry key.
    pub fn object_path(&self, key: &str) -> String {
        self.normalizer.normalize(key)
    }

    /// Uploads the file at `source` under `options.key`.
    ///
    /// The configured storage class, if any, is sent with the request.
    pub async fn upload(
        &self,
        source: &Path,
        options: &UploadOptions,
    ) -> StorageResult<UploadResult> {
        let dest = self.normalizer.normalize(&options.key);
        let mut headers = PutHeaders::new();
        if let Some(storage_class) = &self.storage_class {
            headers = headers.with_storage_class(storage_class);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            key = %options.key,
            path = %dest,
            source = %source.display(),
            size = ?options.size,
            storage_class = ?self.storage_class,
            "Uploading package file"
        );

        let started_at = Instant::now();
        let result = self.client.put_file(source, &dest, &headers).await;
        self.finish_put(Operation::Upload, options, &dest, result, started_at)
    }

    /// Uploads `content` under `options.key` as a gzip tarball.
    pub async fn upload_buffer(
        &self,
        content: impl Into<Bytes>,
        options: &UploadOptions,
    ) -> StorageResult<UploadResult> {
        let content = content.into();
        let dest = self.normalizer.normalize(&options.key);
        let headers = PutHeaders::new().with_content_type(TARBALL_CONTENT_TYPE);

        tracing::debug!(
            target: TRACING_TARGET,
            key = %options.key,
            path = %dest,
            size = content.len(),
            "Uploading package buffer"
        );

        let started_at = Instant::now();
        let result = self.client.put_buffer(content, &dest, &headers).await;
        self.finish_put(Operation::UploadBuffer, options, &dest, result, started_at)
    }

    fn finish_put(
        &self,
        operation: Operation,
        options: &UploadOptions,
        dest: &str,
        result: ClientResult<PutResponse>,
        started_at: Instant,
    ) -> StorageResult<UploadResult> {
        let elapsed = started_at.elapsed();
        let result = result
            .map_err(|e| StorageError::from_client(operation, e))
            .and_then(|response| {
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(StorageError::status(operation, response.status_code))
                }
            });

        match result {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    operation = %operation,
                    key = %options.key,
                    path = %dest,
                    e_tag = ?response.e_tag,
                    elapsed_ms = elapsed.as_millis(),
                    "Package uploaded"
                );
                Ok(UploadResult::new(&options.key))
            }
            Err(error) => {
                log_failure(operation, &options.key, &error, elapsed.as_millis());
                Err(error)
            }
        }
    }

    /// Downloads the object stored under `key` into `save_path`.
    ///
    /// An existing file at `save_path` is overwritten.
    pub async fn download(&self, key: &str, save_path: &Path) -> StorageResult<()> {
        let path = self.normalizer.normalize(key);

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            path = %path,
            destination = %save_path.display(),
            "Downloading package"
        );

        let started_at = Instant::now();
        let result: StorageResult<u64> = async {
            let response = self
                .client
                .get(&path)
                .await
                .map_err(|e| StorageError::from_client(Operation::Download, e))?;

            if !response.is_success() {
                return Err(StorageError::status(
                    Operation::Download,
                    response.status_code,
                ));
            }

            save_to(response.body, save_path).await
        }
        .await;
        let elapsed = started_at.elapsed();

        match result {
            Ok(size) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    key = %key,
                    path = %path,
                    size,
                    elapsed_ms = elapsed.as_millis(),
                    "Package downloaded"
                );
                Ok(())
            }
            Err(error) => {
                log_failure(Operation::Download, key, &error, elapsed.as_millis());
                Err(error)
            }
        }
    }

    /// Removes the object stored under `key`.
    ///
    /// Removing a key that does not exist succeeds.
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.normalizer.normalize(key);

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            path = %path,
            "Removing package"
        );

        let started_at = Instant::now();
        let result = self
            .client
            .delete(&path)
            .await
            .map_err(|e| StorageError::from_client(Operation::Remove, e));
        let elapsed = started_at.elapsed();

        match &result {
            Ok(()) => tracing::debug!(
                target: TRACING_TARGET,
                key = %key,
                path = %path,
                elapsed_ms = elapsed.as_millis(),
                "Package removed"
            ),
            Err(error) => log_failure(Operation::Remove, key, error, elapsed.as_millis()),
        }

        result
    }

    /// Fetches a single listing page.
    ///
    /// Parameters go to the store unchanged and the page comes back as the
    /// store sent it: keys include the folder prefix.
    pub async fn list(&self, params: &ListParams) -> StorageResult<ListPage> {
        tracing::debug!(
            target: TRACING_TARGET,
            prefix = ?params.prefix,
            marker = ?params.marker,
            max_keys = ?params.max_keys,
            "Listing objects"
        );

        let page = self
            .client
            .list(params)
            .await
            .map_err(|e| StorageError::from_client(Operation::List, e))?;

        tracing::debug!(
            target: TRACING_TARGET,
            count = page.contents.len(),
            truncated = page.is_truncated,
            "Objects listed"
        );

        Ok(page)
    }

    /// Collects every key matching `params` across all pages.
    ///
    /// Starts at `params.marker` (the beginning when absent) and follows the
    /// store's truncation flag until the last page. Any failed page fails
    /// the whole listing.
    pub async fn list_all(&self, params: ListParams) -> StorageResult<ObjectKeys> {
        let mut params = params;
        let mut cursor = ListCursor::new(params.marker.take().unwrap_or_default());
        let mut keys = ObjectKeys::new();

        tracing::debug!(
            target: TRACING_TARGET,
            prefix = ?params.prefix,
            marker = %cursor.marker(),
            "Listing all objects"
        );

        let started_at = Instant::now();
        while cursor.has_more() {
            params.marker = Some(cursor.marker().to_owned());

            let page = match self.client.list(&params).await {
                Ok(page) => page,
                Err(e) => {
                    let error = StorageError::from_client(Operation::ListAll, e);
                    tracing::warn!(
                        target: TRACING_TARGET,
                        page = cursor.pages() + 1,
                        marker = %cursor.marker(),
                        error = %error,
                        "Listing page failed"
                    );
                    return Err(error);
                }
            };

            keys.extend(page.keys().map(str::to_owned));
            if let Err(error) = cursor.advance(&page) {
                tracing::error!(
                    target: TRACING_TARGET,
                    page = cursor.pages(),
                    marker = %cursor.marker(),
                    error = %error,
                    "Listing stalled"
                );
                return Err(error);
            }

            tracing::trace!(
                target: TRACING_TARGET,
                page = cursor.pages(),
                count = keys.len(),
                truncated = cursor.has_more(),
                "Listing page collected"
            );
        }

        tracing::debug!(
            target: TRACING_TARGET,
            pages = cursor.pages(),
            count = keys.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "All objects listed"
        );

        Ok(keys)
    }
}

fn log_failure(operation: Operation, key: &str, error: &StorageError, elapsed_ms: u128) {
    match error {
        StorageError::NotFound(_) => tracing::debug!(
            target: TRACING_TARGET,
            operation = %operation,
            key = %key,
            elapsed_ms,
            "Package not found"
        ),
        _ => tracing::error!(
            target: TRACING_TARGET,
            operation = %operation,
            key = %key,
            status = ?error.status_code(),
            error = %error,
            elapsed_ms,
            "Package storage operation failed"
        ),
    }
}
