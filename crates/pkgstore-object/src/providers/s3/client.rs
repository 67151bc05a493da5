//! S3-compatible client using [`aws_sdk_s3`].
//!
//! Listing uses the `ListObjects` (v1) API so pages are addressed by a
//! key marker and carry `IsTruncated` / `NextMarker` as reported by the
//! store.

use std::path::Path;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream as SdkByteStream;
use aws_sdk_s3::types::StorageClass;
use bytes::Bytes;
use futures::stream;

use super::S3ClientConfig;
use crate::client::ObjectClient;
use crate::types::{
    ByteStream, GetResponse, ListEntry, ListPage, ListParams, PutHeaders, PutResponse,
};
use crate::{ClientError, ClientResult, TRACING_TARGET_S3};

/// Credential provider name reported to the AWS SDK.
const PROVIDER_NAME: &str = "pkgstore";

/// S3-backed object client.
///
/// Cheap to clone; clones share the underlying SDK client.
#[derive(Clone, Debug)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: Arc<str>,
}

impl S3Client {
    /// Builds an SDK client from `config`.
    ///
    /// Static credentials are used when configured, otherwise the default
    /// AWS provider chain (environment, profile, instance metadata).
    pub async fn connect(config: &S3ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = aws_sdk_s3::config::Credentials::new(
                access_key_id,
                secret_access_key,
                config.session_token.clone(),
                None,
                PROVIDER_NAME,
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.path_style())
            .build();

        tracing::info!(
            target: TRACING_TARGET_S3,
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            path_style = config.path_style(),
            "S3 client initialized"
        );

        Ok(Self::from_sdk(
            aws_sdk_s3::Client::from_conf(s3_config),
            config.bucket.as_str(),
        ))
    }

    /// Wraps an already configured SDK client.
    pub fn from_sdk(client: aws_sdk_s3::Client, bucket: impl Into<Arc<str>>) -> Self {
        Self {
            inner: client,
            bucket: bucket.into(),
        }
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        body: SdkByteStream,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        let result = self
            .inner
            .put_object()
            .bucket(self.bucket.as_ref())
            .key(dest)
            .body(body)
            .set_content_type(headers.content_type.clone())
            .set_storage_class(headers.storage_class.as_deref().map(StorageClass::from))
            .send()
            .await;

        match result {
            Ok(output) => Ok(PutResponse::new(200).with_e_tag(output.e_tag().map(str::to_owned))),
            Err(err) => match response_status(&err) {
                Some(status) => {
                    tracing::warn!(
                        target: TRACING_TARGET_S3,
                        dest = %dest,
                        status,
                        error = %DisplayErrorContext(&err),
                        "Put rejected by store"
                    );
                    Ok(PutResponse::new(status))
                }
                None => Err(transport_error("put", err)),
            },
        }
    }
}

#[async_trait::async_trait]
impl ObjectClient for S3Client {
    async fn put_file(
        &self,
        source: &Path,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        // Surface a missing or unreadable source as a local I/O failure
        // before anything goes over the wire.
        tokio::fs::metadata(source)
            .await
            .map_err(|e| ClientError::io(source, e))?;

        let body = SdkByteStream::from_path(source)
            .await
            .map_err(|e| ClientError::io(source, std::io::Error::other(e)))?;

        self.put_object(body, dest, headers).await
    }

    async fn put_buffer(
        &self,
        content: Bytes,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        self.put_object(SdkByteStream::from(content), dest, headers)
            .await
    }

    async fn get(&self, path: &str) -> ClientResult<GetResponse> {
        let result = self
            .inner
            .get_object()
            .bucket(self.bucket.as_ref())
            .key(path)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let no_such_key = err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_key());
                return match response_status(&err) {
                    _ if no_such_key => Err(ClientError::not_found(path)),
                    Some(404) => Err(ClientError::not_found(path)),
                    Some(status) => Ok(GetResponse::empty(status)),
                    None => Err(transport_error("get", err)),
                };
            }
        };

        let content_length = output.content_length().and_then(|n| u64::try_from(n).ok());
        let content_type = output.content_type().map(str::to_owned);

        Ok(GetResponse::new(200, body_stream(output.body))
            .with_content_length(content_length)
            .with_content_type(content_type))
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let result = self
            .inner
            .delete_object()
            .bucket(self.bucket.as_ref())
            .key(path)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match response_status(&err) {
                Some(404) => Ok(()),
                Some(status) => Err(ClientError::status("delete", status)),
                None => Err(transport_error("delete", err)),
            },
        }
    }

    async fn list(&self, params: &ListParams) -> ClientResult<ListPage> {
        let max_keys = params.max_keys.map(|n| i32::try_from(n).unwrap_or(i32::MAX));

        let result = self
            .inner
            .list_objects()
            .bucket(self.bucket.as_ref())
            .set_prefix(params.prefix.clone())
            .set_marker(params.effective_marker().map(str::to_owned))
            .set_max_keys(max_keys)
            .set_delimiter(params.delimiter.clone())
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                return match response_status(&err) {
                    Some(status) => Err(ClientError::status("list", status)),
                    None => Err(transport_error("list", err)),
                };
            }
        };

        let contents = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ListEntry {
                    key: key.to_owned(),
                    size: object.size().and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
                    last_modified: object
                        .last_modified()
                        .and_then(|t| jiff::Timestamp::new(t.secs(), t.subsec_nanos() as i32).ok()),
                    e_tag: object.e_tag().map(str::to_owned),
                    storage_class: object.storage_class().map(|c| c.as_str().to_owned()),
                })
            })
            .collect();

        let common_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_owned))
            .collect();

        Ok(ListPage {
            contents,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_marker: output.next_marker().map(str::to_owned),
            common_prefixes,
        })
    }
}

/// Status code of the response behind `err`, if one was received.
fn response_status<E>(err: &SdkError<E>) -> Option<u16> {
    err.raw_response().map(|raw| raw.status().as_u16())
}

/// Converts an SDK failure without a response into a transport error.
fn transport_error<E>(operation: &'static str, err: SdkError<E>) -> ClientError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = format!("{operation} request failed: {}", DisplayErrorContext(&err));
    tracing::error!(target: TRACING_TARGET_S3, operation, error = %message, "S3 request failed");
    ClientError::transport_from(message, err)
}

/// Adapts the SDK body into the crate's chunk stream.
fn body_stream(body: SdkByteStream) -> ByteStream {
    Box::pin(stream::unfold(body, |mut body| async move {
        let chunk = body.next().await?;
        let chunk = chunk.map_err(|e| ClientError::transport_from("reading response body", e));
        Some((chunk, body))
    }))
}
