//! Streaming object bodies to local files.

use std::path::Path;

use futures::StreamExt;
use pkgstore_object::ByteStream;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::{Operation, StorageError, StorageResult, TRACING_TARGET};

/// Writes `body` to `path`, creating or truncating the file.
///
/// Returns the number of bytes written. On failure the partially written
/// file is removed; the original error is returned even if removal fails.
pub async fn save_to(body: ByteStream, path: &Path) -> StorageResult<u64> {
    let result = write_body(body, path).await;
    if let Err(error) = &result {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %error,
                cleanup_error = %e,
                "Failed to remove partial download"
            ),
        }
    }
    result
}

async fn write_body(mut body: ByteStream, path: &Path) -> StorageResult<u64> {
    let mut file = File::create(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;

    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| StorageError::from_client(Operation::Download, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| StorageError::io(path, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::stream;
    use pkgstore_object::ClientError;

    use super::*;

    fn body(chunks: &[&'static str], error: Option<ClientError>) -> ByteStream {
        let chunks = chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .chain(error.map(Err));
        Box::pin(stream::iter(chunks.collect::<Vec<_>>()))
    }

    #[tokio::test]
    async fn writes_all_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.tgz");

        let written = save_to(body(&["hello ", "world"], None), &path)
            .await
            .unwrap();

        assert_eq!(written, 11);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.tgz");
        tokio::fs::write(&path, b"a much longer previous content")
            .await
            .unwrap();

        save_to(body(&["new"], None), &path).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn body_error_is_transport_and_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.tgz");

        let err = save_to(
            body(&["partial"], Some(ClientError::transport("reset"))),
            &path,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::Transport { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_cleanup_keeps_original_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupied");
        tokio::fs::create_dir(&path).await.unwrap();

        let err = save_to(body(&["x"], None), &path).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { path: ref p, .. } if *p == path));
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("pkg.tgz");

        let err = save_to(body(&["x"], None), &path).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { path: ref p, .. } if *p == path));
    }
}
