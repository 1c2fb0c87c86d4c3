//! api::blob
//!
//! Streaming transfer of state blobs through pre-signed URLs.
//!
//! # Design
//!
//! A download is opened, not read: [`StateDownload`] carries the response
//! body as a stream plus its declared length, and [`BlobTransport::upload`]
//! forwards that stream straight into the PUT request. State never touches
//! disk and is never fully buffered.
//!
//! The HTTP client here has no overall timeout, since state files can be
//! large. Any 2xx status counts as success on both legs.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Response};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from a blob transfer leg.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Non-2xx response from the storage endpoint.
    #[error("{operation} failed with status {status}: {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// The download did not declare its size, so it cannot be re-uploaded
    /// to a pre-signed URL.
    #[error("download has no content length")]
    UnknownLength,

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// An opened state download, ready to be streamed into an upload.
pub struct StateDownload {
    body: Body,
    content_length: Option<u64>,
}

impl StateDownload {
    /// Wrap an in-memory body. Length is taken from the bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let content_length = Some(bytes.len() as u64);
        Self {
            body: Body::from(bytes),
            content_length,
        }
    }

    fn from_response(response: Response) -> Self {
        let content_length = response.content_length();
        Self {
            body: Body::wrap_stream(response.bytes_stream()),
            content_length,
        }
    }

    /// Declared size in bytes, if known.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Consume the download into a request body.
    pub fn into_body(self) -> Body {
        self.body
    }
}

impl std::fmt::Debug for StateDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDownload")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Moves state bytes between pre-signed URLs.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Open a GET on `url` without reading the body.
    async fn open_download(&self, url: &str) -> Result<StateDownload, BlobError>;

    /// PUT the download's bytes to `url`. Returns the number of bytes sent.
    async fn upload(&self, url: &str, download: StateDownload) -> Result<u64, BlobError>;
}

/// HTTP implementation of [`BlobTransport`].
#[derive(Debug, Clone)]
pub struct HttpBlobTransport {
    client: Client,
}

impl HttpBlobTransport {
    pub fn new() -> Result<Self, BlobError> {
        let client = Client::builder()
            .user_agent(super::graphql::USER_AGENT_VALUE)
            .build()
            .map_err(|e| BlobError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

async fn status_error(operation: &'static str, response: Response) -> BlobError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .map(|body| body.trim().to_string())
        .unwrap_or_default();
    BlobError::Status {
        operation,
        status,
        message,
    }
}

#[async_trait]
impl BlobTransport for HttpBlobTransport {
    async fn open_download(&self, url: &str) -> Result<StateDownload, BlobError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BlobError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error("download", response).await);
        }

        Ok(StateDownload::from_response(response))
    }

    async fn upload(&self, url: &str, download: StateDownload) -> Result<u64, BlobError> {
        let length = download.content_length().ok_or(BlobError::UnknownLength)?;

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, length)
            .body(download.into_body())
            .send()
            .await
            .map_err(|e| BlobError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error("upload", response).await);
        }

        Ok(length)
    }
}

/// In-memory transport for tests.
///
/// Serves a fixed body for every download and records every call.
#[derive(Debug, Clone, Default)]
pub struct MockBlobTransport {
    inner: Arc<Mutex<MockBlobInner>>,
}

#[derive(Debug, Default)]
struct MockBlobInner {
    body: Vec<u8>,
    fail_download: bool,
    fail_upload: bool,
    calls: Vec<BlobCall>,
}

/// Recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobCall {
    Download { url: String },
    Upload { url: String, bytes: u64 },
}

impl MockBlobTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body returned by every download.
    pub fn with_body(self, body: impl Into<Vec<u8>>) -> Self {
        self.inner.lock().unwrap().body = body.into();
        self
    }

    pub fn fail_download(self) -> Self {
        self.inner.lock().unwrap().fail_download = true;
        self
    }

    pub fn fail_upload(self) -> Self {
        self.inner.lock().unwrap().fail_upload = true;
        self
    }

    pub fn calls(&self) -> Vec<BlobCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl BlobTransport for MockBlobTransport {
    async fn open_download(&self, url: &str) -> Result<StateDownload, BlobError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(BlobCall::Download {
            url: url.to_string(),
        });
        if inner.fail_download {
            return Err(BlobError::Status {
                operation: "download",
                status: 403,
                message: "AccessDenied".into(),
            });
        }
        Ok(StateDownload::from_bytes(inner.body.clone()))
    }

    async fn upload(&self, url: &str, download: StateDownload) -> Result<u64, BlobError> {
        let bytes = download.content_length().ok_or(BlobError::UnknownLength)?;
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(BlobCall::Upload {
            url: url.to_string(),
            bytes,
        });
        if inner.fail_upload {
            return Err(BlobError::Status {
                operation: "upload",
                status: 500,
                message: "InternalError".into(),
            });
        }
        Ok(bytes)
    }
}
