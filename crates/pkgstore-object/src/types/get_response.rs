//! Result type for [`ObjectClient::get`](crate::ObjectClient::get).

use bytes::Bytes;
use derive_more::Debug;
use futures::stream::{self, BoxStream};

use crate::ClientResult;

/// Streamed object body, yielded chunk by chunk.
pub type ByteStream = BoxStream<'static, ClientResult<Bytes>>;

/// Response of a [`ObjectClient::get`](crate::ObjectClient::get) call.
///
/// A missing object is reported as
/// [`ClientError::NotFound`](crate::ClientError::NotFound) rather than a
/// response; any other answer from the store ends up here with its status.
#[derive(Debug)]
pub struct GetResponse {
    /// HTTP-level status code of the response.
    pub status_code: u16,
    /// Object size in bytes, if the store reported it.
    pub content_length: Option<u64>,
    /// MIME content-type, if the store reported one.
    pub content_type: Option<String>,
    /// Response body.
    #[debug(skip)]
    pub body: ByteStream,
}

impl GetResponse {
    /// Creates a response with the given status and body.
    pub fn new(status_code: u16, body: ByteStream) -> Self {
        Self {
            status_code,
            content_length: None,
            content_type: None,
            body,
        }
    }

    /// Creates a bodiless response, used for non-success answers.
    pub fn empty(status_code: u16) -> Self {
        Self::new(status_code, Box::pin(stream::empty()))
    }

    /// Sets the content length.
    pub fn with_content_length(mut self, content_length: Option<u64>) -> Self {
        self.content_length = content_length;
        self
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Whether the store answered with `200 OK`.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
