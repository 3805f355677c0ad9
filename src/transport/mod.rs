//! HTTP transport used by the registry clients
//!
//! The clients only need streamed GET requests. [`Transport`] is the seam;
//! [`HttpTransport`] implements it with `reqwest`, tests plug in their own.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::config::TransportConfig;
use crate::error::{DawaError, Result};
use crate::utils::redact_url;

/// Streamed response body
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Future returned by [`Transport::get`]
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ByteStream>> + Send + 'a>>;

/// A client able to issue GET requests and stream the response body
pub trait Transport: Send + Sync {
    /// Issue a GET request
    ///
    /// Resolves once response headers are in. Non-success statuses must be
    /// reported as [`DawaError::HttpStatus`]; the body is returned unread.
    fn get<'a>(&'a self, url: &'a str, cancel: &'a CancellationToken) -> TransportFuture<'a>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get<'a>(&'a self, url: &'a str, cancel: &'a CancellationToken) -> TransportFuture<'a> {
        (**self).get(url, cancel)
    }
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default())
    }

    /// Create a transport from configuration
    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DawaError::transport("<client builder>", e))?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a str, cancel: &'a CancellationToken) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = cancellable(cancel, self.client.get(url).send())
                .await?
                .map_err(|e| DawaError::transport(redact_url(url), e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DawaError::HttpStatus {
                    url: redact_url(url),
                    status: status.as_u16(),
                });
            }

            let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
            Ok(Box::pin(body) as ByteStream)
        })
    }
}

/// Race a future against the cancellation token
pub async fn cancellable<F: Future>(cancel: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DawaError::Cancelled),
        output = future => Ok(output),
    }
}

/// Issue a GET and wait for the response body, honouring cancellation
pub async fn get_with_cancel<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    cancel: &CancellationToken,
) -> Result<ByteStream> {
    cancellable(cancel, transport.get(url, cancel)).await?
}

/// Read a whole (bounded) body into memory
pub async fn read_body(mut body: ByteStream, cancel: &CancellationToken) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    while let Some(chunk) = cancellable(cancel, body.next()).await? {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer)
}
