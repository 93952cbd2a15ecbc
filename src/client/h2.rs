//! HTTP/2 session over hyper's connection-level client.
//!
//! One `H2Session` is one TCP (optionally TLS) connection. Every
//! `open_stream` starts a new HTTP/2 stream on it. Dropping an unfinished
//! `H2Stream` makes hyper send `RST_STREAM(CANCEL)` for that stream.
//!
//! hyper spawns the h2 connection driver itself, so the session hands it a
//! [`SessionExecutor`] and owns every task hyper starts. Closing or dropping
//! the session therefore closes the socket even while streams are held.

use futures_util::FutureExt;
use http_body_util::{BodyExt, Empty};
use hyper::body::{Bytes, Incoming};
use hyper::client::conn::http2::{self, SendRequest};
use hyper::rt::Executor;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::task::{JoinHandle, JoinSet};
use tokio_rustls::rustls::pki_types::ServerName;
use url::Url;

use crate::client::error::ClientError;
use crate::client::tls;
use crate::client::transport::{InFlightStream, StreamResponse, StreamTransport};

/// How long `close` waits for the connection to wind down before aborting it.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

type ResponseFuture = Pin<Box<dyn Future<Output = hyper::Result<Response<Incoming>>> + Send>>;

/// Parsed server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    tls: bool,
    host: String,
    port: u16,
}

impl Target {
    /// Accepts `https://host[:port]` (TLS) and `http://host[:port]`
    /// (cleartext HTTP/2 with prior knowledge).
    pub fn parse(target: &str) -> Result<Self, ClientError> {
        let invalid = |reason: &str| ClientError::InvalidTarget {
            target: target.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(target).map_err(|e| invalid(&e.to_string()))?;
        let tls = match url.scheme() {
            "https" => true,
            "http" => false,
            _ => return Err(invalid("scheme must be http or https")),
        };
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;

        Ok(Self {
            tls,
            host: host.to_string(),
            port,
        })
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// `host:port`, with IPv6 hosts bracketed.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn scheme(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }

    // Host without IPv6 brackets, for DNS / socket use.
    fn bare_host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    fn uri(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme(), self.authority(), path)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme(), self.authority())
    }
}

/// Executor for the tasks hyper spawns on behalf of one session.
#[derive(Clone, Default)]
struct SessionExecutor {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl<F> Executor<F> for SessionExecutor
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        self.lock().spawn(async move {
            let _ = fut.await;
        });
    }
}

impl SessionExecutor {
    /// Wait until every spawned task has finished, including tasks spawned
    /// while waiting.
    async fn wait(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *self.lock());
            if tasks.is_empty() {
                return;
            }
            while tasks.join_next().await.is_some() {}
        }
    }

    fn abort_all(&self) {
        // Dropping the set aborts its tasks; the lock is released first
        // because aborted futures may hold clones of this executor.
        let tasks = std::mem::take(&mut *self.lock());
        drop(tasks);
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An HTTP/2 connection to the target, released on `close` or drop.
pub struct H2Session {
    target: Target,
    sender: SendRequest<Empty<Bytes>>,
    connection: Option<JoinHandle<()>>,
    tasks: SessionExecutor,
}

impl H2Session {
    /// Connect, run the TLS handshake if needed, then the HTTP/2 handshake.
    /// The whole sequence is bounded by `connect_timeout`.
    pub async fn connect(target: &Target, connect_timeout: Duration) -> Result<Self, ClientError> {
        tokio::time::timeout(connect_timeout, Self::establish(target))
            .await
            .map_err(|_| ClientError::Timeout(connect_timeout))?
    }

    async fn establish(target: &Target) -> Result<Self, ClientError> {
        let tcp = TcpStream::connect((target.bare_host(), target.port))
            .await
            .map_err(|source| ClientError::Connect {
                addr: target.authority(),
                source,
            })?;
        let _ = tcp.set_nodelay(true);

        let tasks = SessionExecutor::default();
        let (sender, connection) = if target.tls {
            let server_name = ServerName::try_from(target.bare_host().to_string()).map_err(|e| {
                ClientError::InvalidTarget {
                    target: target.to_string(),
                    reason: e.to_string(),
                }
            })?;
            let stream = tls::insecure_connector()?
                .connect(server_name, tcp)
                .await
                .map_err(ClientError::TlsHandshake)?;
            handshake(stream, tasks.clone()).await?
        } else {
            handshake(tcp, tasks.clone()).await?
        };

        tracing::debug!(target = %target, "HTTP/2 session established");
        Ok(Self {
            target: target.clone(),
            sender,
            connection: Some(connection),
            tasks,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Release the session: stop issuing streams, let the connection flush
    /// pending frames (resets included), then tear it down. Streams still
    /// held by the caller are cut off once `CLOSE_GRACE` runs out.
    pub async fn close(mut self) {
        let target = self.target.clone();
        let mut connection = self.connection.take();
        let tasks = std::mem::take(&mut self.tasks);
        // Dropping the sender tells hyper no more requests are coming.
        drop(self);

        let drained = tokio::time::timeout(CLOSE_GRACE, async {
            if let Some(connection) = connection.as_mut() {
                let _ = connection.await;
            }
            tasks.wait().await;
        })
        .await
        .is_ok();

        if !drained {
            tracing::debug!(target = %target, "Session did not drain, aborting connection");
        }
        if let Some(connection) = connection {
            connection.abort();
        }
        tasks.abort_all();
    }
}

impl Drop for H2Session {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
        self.tasks.abort_all();
    }
}

impl StreamTransport for H2Session {
    type Stream = H2Stream;

    fn open_stream(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<Self::Stream, ClientError>> + Send {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.target.uri(path))
            .body(Empty::<Bytes>::new());

        async move {
            let request = request?;
            self.sender.ready().await?;
            let response = self.sender.send_request(request);
            Ok(H2Stream {
                response: Box::pin(response),
            })
        }
    }
}

/// One issued HTTP/2 stream.
pub struct H2Stream {
    response: ResponseFuture,
}

impl InFlightStream for H2Stream {
    fn cancel(self) -> bool {
        // A response that is already here means the stream finished first;
        // otherwise dropping the future resets the stream.
        self.response.now_or_never().is_none()
    }

    fn response(self) -> impl Future<Output = Result<StreamResponse, ClientError>> + Send {
        async move {
            let response = self.response.await?;
            let status = response.status();
            let body = response.into_body().collect().await?.to_bytes();
            Ok(StreamResponse { status, body })
        }
    }
}

async fn handshake<I>(
    io: I,
    executor: SessionExecutor,
) -> Result<(SendRequest<Empty<Bytes>>, JoinHandle<()>), ClientError>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sender, connection) = http2::handshake(executor, TokioIo::new(io))
        .await
        .map_err(ClientError::Handshake)?;

    let task = tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::debug!(error = %e, "HTTP/2 connection closed with error");
        }
    });

    Ok((sender, task))
}
