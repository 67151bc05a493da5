//! Object client trait implemented by every storage backend.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::ClientResult;
use crate::types::{GetResponse, ListPage, ListParams, PutHeaders, PutResponse};

/// Raw request/response access to an object store.
///
/// Implementations own the connection, authentication and wire format.
/// Keys are passed through verbatim: callers are responsible for any
/// namespacing or escaping.
///
/// Put operations return `Ok` for every response the store sent back,
/// successful or not, and reserve `Err` for failures where no response was
/// received.
#[async_trait::async_trait]
pub trait ObjectClient: Send + Sync {
    /// Uploads the local file at `source` to `dest`.
    async fn put_file(
        &self,
        source: &Path,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse>;

    /// Uploads `content` to `dest`.
    async fn put_buffer(
        &self,
        content: Bytes,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse>;

    /// Fetches the object at `path` as a streamed response.
    async fn get(&self, path: &str) -> ClientResult<GetResponse>;

    /// Deletes the object at `path`. Deleting a missing object succeeds.
    async fn delete(&self, path: &str) -> ClientResult<()>;

    /// Fetches a single listing page.
    async fn list(&self, params: &ListParams) -> ClientResult<ListPage>;
}

#[async_trait::async_trait]
impl<T> ObjectClient for Arc<T>
where
    T: ObjectClient + ?Sized,
{
    async fn put_file(
        &self,
        source: &Path,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        (**self).put_file(source, dest, headers).await
    }

    async fn put_buffer(
        &self,
        content: Bytes,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        (**self).put_buffer(content, dest, headers).await
    }

    async fn get(&self, path: &str) -> ClientResult<GetResponse> {
        (**self).get(path).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        (**self).delete(path).await
    }

    async fn list(&self, params: &ListParams) -> ClientResult<ListPage> {
        (**self).list(params).await
    }
}
