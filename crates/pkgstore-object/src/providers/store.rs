//! Object client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` for stores without an S3 wire protocol: the
//! in-memory store, the local filesystem, or any other `object_store`
//! backend. Listing pages are emulated on top of a full listing, so this
//! client is meant for small stores and tests rather than large buckets.

use std::path::Path as LocalPath;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, ObjectMeta, ObjectStore, PutOptions, PutPayload};

use crate::client::ObjectClient;
use crate::types::{GetResponse, ListEntry, ListPage, ListParams, PutHeaders, PutResponse};
use crate::{ClientError, ClientResult, TRACING_TARGET_OBJECT_STORE};

/// Page size used when a listing does not ask for one.
pub const DEFAULT_MAX_KEYS: u32 = 1000;

/// Metadata attribute recording the requested storage class on backends
/// without storage tiers.
const STORAGE_CLASS_METADATA: &str = "storage-class";

/// Cloneable handle to any [`ObjectStore`] backend.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wraps a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Creates a client over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemory::new())
    }

    /// Creates a client storing objects as files under `root`.
    pub fn local(root: impl AsRef<LocalPath>) -> ClientResult<Self> {
        let root = root.as_ref();
        let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            ClientError::config(format!("invalid local store root {}: {e}", root.display()))
        })?;
        Ok(Self::new(store))
    }

    /// Returns the wrapped store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.0
    }

    #[tracing::instrument(
        name = "object_store.put",
        target = "pkgstore_object::object_store",
        skip(self, data, headers),
        fields(size = data.len())
    )]
    async fn put_bytes(
        &self,
        data: Bytes,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        let mut opts = PutOptions::default();
        if let Some(ct) = &headers.content_type {
            opts.attributes
                .insert(Attribute::ContentType, ct.clone().into());
        }
        if let Some(class) = &headers.storage_class {
            opts.attributes.insert(
                Attribute::Metadata(STORAGE_CLASS_METADATA.into()),
                class.clone().into(),
            );
        }

        let Some(location) = object_path("put", dest) else {
            return Ok(PutResponse::new(400));
        };
        let result = self
            .0
            .put_opts(&location, PutPayload::from(data), opts)
            .await;

        match result {
            Ok(put) => Ok(PutResponse::new(200).with_e_tag(put.e_tag)),
            Err(err) => match status_of(&err) {
                Some(status) => Ok(PutResponse::new(status)),
                None => Err(from_object_store("put", dest, err)),
            },
        }
    }
}

#[async_trait::async_trait]
impl ObjectClient for ObjectStoreClient {
    async fn put_file(
        &self,
        source: &LocalPath,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        let data = tokio::fs::read(source)
            .await
            .map_err(|e| ClientError::io(source, e))?;
        self.put_bytes(Bytes::from(data), dest, headers).await
    }

    async fn put_buffer(
        &self,
        content: Bytes,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        self.put_bytes(content, dest, headers).await
    }

    #[tracing::instrument(
        name = "object_store.get",
        target = "pkgstore_object::object_store",
        skip(self)
    )]
    async fn get(&self, path: &str) -> ClientResult<GetResponse> {
        let location = object_path("get", path).ok_or(ClientError::status("get", 400))?;
        let result = self
            .0
            .get(&location)
            .await
            .map_err(|e| from_object_store("get", path, e))?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string());
        let content_length = result.meta.size;
        let body = result
            .into_stream()
            .map_err(|e| ClientError::transport_from("reading object body", e));

        Ok(GetResponse::new(200, Box::pin(body))
            .with_content_length(Some(content_length))
            .with_content_type(content_type))
    }

    #[tracing::instrument(
        name = "object_store.delete",
        target = "pkgstore_object::object_store",
        skip(self)
    )]
    async fn delete(&self, path: &str) -> ClientResult<()> {
        let location =
            object_path("delete", path).ok_or(ClientError::status("delete", 400))?;
        match self.0.delete(&location).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(from_object_store("delete", path, err)),
        }
    }

    #[tracing::instrument(
        name = "object_store.list",
        target = "pkgstore_object::object_store",
        skip(self),
        fields(count)
    )]
    async fn list(&self, params: &ListParams) -> ClientResult<ListPage> {
        let prefix = params.prefix.as_deref().unwrap_or_default();
        // Object store prefixes are whole path segments while S3 prefixes
        // are plain string prefixes: list the enclosing directory and filter.
        let parent = match prefix.rfind('/') {
            Some(idx) => Some(
                object_path("list", &prefix[..idx]).ok_or(ClientError::status("list", 400))?,
            ),
            None => None,
        };

        let mut objects: Vec<ObjectMeta> = self
            .0
            .list(parent.as_ref())
            .try_collect()
            .await
            .map_err(|e| from_object_store("list", prefix, e))?;

        objects.retain(|meta| meta.location.as_ref().starts_with(prefix));
        if let Some(marker) = params.effective_marker() {
            objects.retain(|meta| meta.location.as_ref() > marker);
        }
        objects.sort_by(|a, b| a.location.as_ref().cmp(b.location.as_ref()));

        let max_keys = params.max_keys.unwrap_or(DEFAULT_MAX_KEYS).max(1) as usize;
        let page = paginate(
            objects,
            prefix,
            params.effective_marker(),
            params.delimiter.as_deref(),
            max_keys,
        );

        tracing::Span::current().record("count", page.contents.len() as u64);
        Ok(page)
    }
}

/// One item of an emulated listing: an object or a rolled-up prefix.
enum Item {
    Object(ListEntry),
    Prefix(String),
}

impl Item {
    fn key(&self) -> &str {
        match self {
            Self::Object(entry) => &entry.key,
            Self::Prefix(prefix) => prefix,
        }
    }
}

/// Cuts a sorted listing down to one page of at most `max_keys` items.
///
/// Common prefixes at or before `marker` were returned by an earlier page
/// and are skipped together with every key they cover.
fn paginate(
    objects: Vec<ObjectMeta>,
    prefix: &str,
    marker: Option<&str>,
    delimiter: Option<&str>,
    max_keys: usize,
) -> ListPage {
    let mut items: Vec<Item> = Vec::new();

    for meta in objects {
        let key = meta.location.as_ref();
        let rolled_up = delimiter
            .filter(|d| !d.is_empty())
            .and_then(|d| key[prefix.len()..].find(d).map(|idx| prefix.len() + idx + d.len()))
            .map(|end| key[..end].to_owned());

        match rolled_up {
            Some(common) if marker.is_some_and(|m| common.as_str() <= m) => continue,
            Some(common) => {
                if !matches!(items.last(), Some(Item::Prefix(last)) if *last == common) {
                    items.push(Item::Prefix(common));
                }
            }
            None => items.push(Item::Object(to_entry(&meta))),
        }

        // One item of look-ahead is enough to know whether the page is cut.
        if items.len() > max_keys {
            break;
        }
    }

    let is_truncated = items.len() > max_keys;
    items.truncate(max_keys);

    let next_marker = is_truncated
        .then(|| items.last().map(|item| item.key().to_owned()))
        .flatten();

    let mut page = ListPage::new(Vec::with_capacity(items.len()), is_truncated);
    page.next_marker = next_marker;
    for item in items {
        match item {
            Item::Object(entry) => page.contents.push(entry),
            Item::Prefix(prefix) => page.common_prefixes.push(prefix),
        }
    }
    page
}

fn to_entry(meta: &ObjectMeta) -> ListEntry {
    ListEntry {
        key: meta.location.to_string(),
        size: meta.size,
        last_modified: jiff::Timestamp::new(
            meta.last_modified.timestamp(),
            meta.last_modified.timestamp_subsec_nanos() as i32,
        )
        .ok(),
        e_tag: meta.e_tag.clone(),
        storage_class: None,
    }
}

/// Parses `key` into a store location without re-encoding it.
///
/// Keys the store would rewrite (empty segments, `.` or `..` segments,
/// control characters, leading or trailing `/`) yield `None`; callers
/// answer them with a 400 so listed keys always match the written ones.
fn object_path(operation: &'static str, key: &str) -> Option<Path> {
    match Path::parse(key) {
        Ok(location) if location.as_ref() == key => Some(location),
        _ => {
            tracing::warn!(
                target: TRACING_TARGET_OBJECT_STORE,
                operation,
                key = %key,
                "Object key rejected by the store"
            );
            None
        }
    }
}

/// HTTP status equivalent of an [`object_store::Error`], when there is one.
fn status_of(err: &object_store::Error) -> Option<u16> {
    match err {
        object_store::Error::NotModified { .. } => Some(304),
        object_store::Error::Unauthenticated { .. } => Some(401),
        object_store::Error::PermissionDenied { .. } => Some(403),
        object_store::Error::NotFound { .. } => Some(404),
        object_store::Error::AlreadyExists { .. } => Some(409),
        object_store::Error::Precondition { .. } => Some(412),
        _ => None,
    }
}

/// Converts an [`object_store::Error`] into a [`ClientError`].
fn from_object_store(operation: &'static str, path: &str, err: object_store::Error) -> ClientError {
    if matches!(err, object_store::Error::NotFound { .. }) {
        return ClientError::not_found(path);
    }

    match status_of(&err) {
        Some(status) => ClientError::status(operation, status),
        None => {
            tracing::error!(
                target: TRACING_TARGET_OBJECT_STORE,
                operation,
                path = %path,
                error = %err,
                "Object store request failed"
            );
            ClientError::transport_from(format!("{operation} {path}: {err}"), err)
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    async fn read_body(response: GetResponse) -> Vec<u8> {
        let chunks: Vec<Bytes> = response.body.try_collect().await.unwrap();
        chunks.concat()
    }

    async fn seed(client: &ObjectStoreClient, keys: &[&str]) {
        for key in keys {
            client
                .put_buffer(Bytes::from(key.to_string()), key, &PutHeaders::new())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn put_buffer_and_get() {
        let client = ObjectStoreClient::in_memory();
        let headers = PutHeaders::new().with_content_type("application/x-gzip");
        let put = client
            .put_buffer(Bytes::from("tarball"), "pkgs/a.tgz", &headers)
            .await
            .unwrap();
        assert!(put.is_success());
        assert!(put.e_tag.is_some());

        let response = client.get("pkgs/a.tgz").await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("application/x-gzip"));
        assert_eq!(response.content_length, Some(7));
        assert_eq!(read_body(response).await, b"tarball");
    }

    #[tokio::test]
    async fn put_file_reads_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.tgz");
        tokio::fs::write(&source, b"from disk").await.unwrap();

        let client = ObjectStoreClient::in_memory();
        let headers = PutHeaders::new().with_storage_class("STANDARD_IA");
        client.put_file(&source, "a.tgz", &headers).await.unwrap();

        let stored = client.store().get(&Path::from("a.tgz")).await.unwrap();
        let class = stored
            .attributes
            .get(&Attribute::Metadata(STORAGE_CLASS_METADATA.into()))
            .map(|v| v.to_string());
        assert_eq!(class.as_deref(), Some("STANDARD_IA"));
        assert_eq!(stored.bytes().await.unwrap(), Bytes::from("from disk"));
    }

    #[tokio::test]
    async fn put_file_missing_source() {
        let client = ObjectStoreClient::in_memory();
        let err = client
            .put_file(LocalPath::new("/nonexistent/a.tgz"), "a.tgz", &PutHeaders::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let client = ObjectStoreClient::in_memory();
        let err = client.get("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref path) if path == "missing"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let client = ObjectStoreClient::in_memory();
        seed(&client, &["del.tgz"]).await;
        client.delete("del.tgz").await.unwrap();
        client.delete("del.tgz").await.unwrap();
        assert!(client.get("del.tgz").await.is_err());
    }

    #[tokio::test]
    async fn list_pages_with_marker() {
        let client = ObjectStoreClient::in_memory();
        seed(&client, &["p/e", "p/c", "p/a", "p/d", "p/b"]).await;

        let params = ListParams::new().with_prefix("p/").with_max_keys(2);
        let first = client.list(&params).await.unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["p/a", "p/b"]);
        assert!(first.is_truncated);
        assert_eq!(first.next_marker.as_deref(), Some("p/b"));

        let second = client
            .list(&params.clone().with_marker("p/b"))
            .await
            .unwrap();
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["p/c", "p/d"]);
        assert!(second.is_truncated);

        let last = client
            .list(&params.clone().with_marker("p/d"))
            .await
            .unwrap();
        assert_eq!(last.keys().collect::<Vec<_>>(), vec!["p/e"]);
        assert!(!last.is_truncated);
        assert_eq!(last.next_marker, None);
    }

    #[tokio::test]
    async fn list_prefix_is_a_string_prefix() {
        let client = ObjectStoreClient::in_memory();
        seed(&client, &["pkgs/foo-1.0.0.tgz", "pkgs/foobar-2.0.0.tgz", "pkgs/bar.tgz"]).await;

        let page = client
            .list(&ListParams::new().with_prefix("pkgs/foo"))
            .await
            .unwrap();
        assert_eq!(
            page.keys().collect::<Vec<_>>(),
            vec!["pkgs/foo-1.0.0.tgz", "pkgs/foobar-2.0.0.tgz"]
        );
    }

    #[tokio::test]
    async fn list_rolls_up_delimiter() {
        let client = ObjectStoreClient::in_memory();
        seed(&client, &["a/1", "a/2", "b/1", "top"]).await;

        let page = client
            .list(&ListParams::new().with_delimiter("/"))
            .await
            .unwrap();
        assert_eq!(page.common_prefixes, vec!["a/", "b/"]);
        assert_eq!(page.keys().collect::<Vec<_>>(), vec!["top"]);
        assert!(!page.is_truncated);
    }

    #[tokio::test]
    async fn list_skips_keys_under_returned_prefix() {
        let client = ObjectStoreClient::in_memory();
        seed(&client, &["a/1", "a/2", "b/1"]).await;

        let params = ListParams::new().with_delimiter("/").with_max_keys(1);
        let first = client.list(&params).await.unwrap();
        assert_eq!(first.common_prefixes, vec!["a/"]);
        assert!(first.is_truncated);
        assert_eq!(first.next_marker.as_deref(), Some("a/"));

        let second = client
            .list(&params.clone().with_marker("a/"))
            .await
            .unwrap();
        assert_eq!(second.common_prefixes, vec!["b/"]);
        assert!(second.contents.is_empty());
        assert!(!second.is_truncated);
    }

    #[tokio::test]
    async fn keys_are_stored_verbatim() {
        let client = ObjectStoreClient::in_memory();
        seed(&client, &["cnpm/pkg~1%20.tgz", "cnpm/other.tgz"]).await;

        let page = client
            .list(&ListParams::new().with_prefix("cnpm/pkg~"))
            .await
            .unwrap();
        assert_eq!(page.keys().collect::<Vec<_>>(), vec!["cnpm/pkg~1%20.tgz"]);

        let response = client.get("cnpm/pkg~1%20.tgz").await.unwrap();
        assert_eq!(read_body(response).await, b"cnpm/pkg~1%20.tgz");
    }

    #[tokio::test]
    async fn local_keys_are_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let client = ObjectStoreClient::local(dir.path()).unwrap();
        seed(&client, &["pkgs/pkg~1.tgz"]).await;

        let page = client
            .list(&ListParams::new().with_prefix("pkgs/pkg~"))
            .await
            .unwrap();
        assert_eq!(page.keys().collect::<Vec<_>>(), vec!["pkgs/pkg~1.tgz"]);
    }

    #[tokio::test]
    async fn rewritten_keys_are_rejected() {
        let client = ObjectStoreClient::in_memory();
        for key in ["a//b", "/a", "a/", "a/../b"] {
            let put = client
                .put_buffer(Bytes::from("x"), key, &PutHeaders::new())
                .await
                .unwrap();
            assert_eq!(put.status_code, 400, "{key:?}");
        }

        let err = client.get("a//b").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn list_empty_store() {
        let client = ObjectStoreClient::in_memory();
        let page = client.list(&ListParams::new()).await.unwrap();
        assert!(page.contents.is_empty());
        assert!(!page.is_truncated);
    }

    #[tokio::test]
    async fn local_filesystem_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let client = ObjectStoreClient::local(dir.path()).unwrap();
        seed(&client, &["pkgs/x.tgz"]).await;

        let response = client.get("pkgs/x.tgz").await.unwrap();
        assert_eq!(read_body(response).await, b"pkgs/x.tgz");
    }
}
