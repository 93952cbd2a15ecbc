//! Stream-level capability the client drivers are written against.

use hyper::body::Bytes;
use hyper::StatusCode;
use std::future::Future;
use std::time::Duration;

use crate::client::error::ClientError;

/// A fully received response.
#[derive(Debug, Clone)]
pub struct StreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl StreamResponse {
    /// First `max_chars` characters of the body, lossily decoded.
    pub fn preview(&self, max_chars: usize) -> String {
        String::from_utf8_lossy(&self.body).chars().take(max_chars).collect()
    }
}

/// An open multiplexed session able to start independent GET streams.
pub trait StreamTransport {
    type Stream: InFlightStream;

    /// Issue `GET path` on a new stream.
    ///
    /// Resolves once the request is handed to the session, without waiting
    /// for any part of the response.
    fn open_stream(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<Self::Stream, ClientError>> + Send;
}

/// A stream that has been issued and not yet consumed.
pub trait InFlightStream: Send + 'static {
    /// Cancel the stream (RST_STREAM on HTTP/2).
    ///
    /// Returns `true` if the stream was still waiting for its response.
    /// Cancelling a stream that already finished does nothing and returns
    /// `false`.
    fn cancel(self) -> bool;

    /// Wait for the complete response.
    fn response(self) -> impl Future<Output = Result<StreamResponse, ClientError>> + Send;
}

/// One full request/response cycle, bounded by `timeout`.
///
/// On timeout the stream is dropped, which cancels it.
pub async fn fetch<T: StreamTransport>(
    transport: &mut T,
    path: &str,
    timeout: Duration,
) -> Result<StreamResponse, ClientError> {
    let stream = transport.open_stream(path).await?;
    tokio::time::timeout(timeout, stream.response())
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
}
