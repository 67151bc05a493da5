//! Request headers and result type for the put operations of
//! [`ObjectClient`](crate::ObjectClient).

/// Optional headers attached to a put request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutHeaders {
    /// `Content-Type` of the uploaded object.
    pub content_type: Option<String>,
    /// Storage tier (`x-amz-storage-class`), e.g. `STANDARD_IA`.
    pub storage_class: Option<String>,
}

impl PutHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the storage class.
    #[must_use]
    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = Some(storage_class.into());
        self
    }
}

/// Response of a put request that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResponse {
    /// HTTP-level status code of the response.
    pub status_code: u16,
    /// Entity tag of the stored object, if the store provides one.
    pub e_tag: Option<String>,
}

impl PutResponse {
    /// Creates a response with the given status and no entity tag.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            e_tag: None,
        }
    }

    /// Sets the entity tag.
    pub fn with_e_tag(mut self, e_tag: Option<String>) -> Self {
        self.e_tag = e_tag;
        self
    }

    /// Whether the store answered with `200 OK`.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
