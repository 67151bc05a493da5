//! Scripted object client for adapter tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;
use futures::stream;
use pkgstore_object::{
    ClientError, ClientResult, GetResponse, ListPage, ListParams, ObjectClient, PutHeaders,
    PutResponse,
};

/// Object client answering from a script and recording every request.
pub(crate) struct ScriptedClient {
    put_status: Option<u16>,
    get_status: u16,
    pages: Mutex<VecDeque<ClientResult<ListPage>>>,
    puts: Mutex<Vec<(String, PutHeaders)>>,
    list_calls: Mutex<Vec<ListParams>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self {
            put_status: Some(200),
            get_status: 200,
            pages: Mutex::new(VecDeque::new()),
            puts: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every put with `status`.
    pub(crate) fn with_put_status(mut self, status: u16) -> Self {
        self.put_status = Some(status);
        self
    }

    /// Fails every put before a response arrives.
    pub(crate) fn with_put_failure(mut self) -> Self {
        self.put_status = None;
        self
    }

    /// Answers every get with `status` and an empty body.
    pub(crate) fn with_get_status(mut self, status: u16) -> Self {
        self.get_status = status;
        self
    }

    /// Queues listing results, served one per call.
    pub(crate) fn with_pages(
        self,
        pages: impl IntoIterator<Item = ClientResult<ListPage>>,
    ) -> Self {
        self.pages.lock().unwrap().extend(pages);
        self
    }

    pub(crate) fn puts(&self) -> Vec<(String, PutHeaders)> {
        self.puts.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> Vec<ListParams> {
        self.list_calls.lock().unwrap().clone()
    }

    fn put(&self, dest: &str, headers: &PutHeaders) -> ClientResult<PutResponse> {
        self.puts
            .lock()
            .unwrap()
            .push((dest.to_string(), headers.clone()));
        match self.put_status {
            Some(status) => Ok(PutResponse::new(status)),
            None => Err(ClientError::transport("connection refused")),
        }
    }
}

#[async_trait::async_trait]
impl ObjectClient for ScriptedClient {
    async fn put_file(
        &self,
        _source: &Path,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        self.put(dest, headers)
    }

    async fn put_buffer(
        &self,
        _content: Bytes,
        dest: &str,
        headers: &PutHeaders,
    ) -> ClientResult<PutResponse> {
        self.put(dest, headers)
    }

    async fn get(&self, _path: &str) -> ClientResult<GetResponse> {
        Ok(GetResponse::new(self.get_status, Box::pin(stream::empty())))
    }

    async fn delete(&self, _path: &str) -> ClientResult<()> {
        Ok(())
    }

    async fn list(&self, params: &ListParams) -> ClientResult<ListPage> {
        self.list_calls.lock().unwrap().push(params.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::transport("no scripted page left")))
    }
}
