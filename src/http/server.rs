//! HTTP server setup and accept loop.
//!
//! # Responsibilities
//! - Build the Axum router for the fixed route table
//! - Accept connections, optionally terminate TLS, count the ones that
//!   complete the handshake
//! - Serve each connection with hyper (HTTP/2, HTTP/1.1 fallback)
//! - Stop accepting on the shutdown signal

use axum::{
    body::Body,
    http::Request,
    routing::get,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tokio_rustls::TlsAcceptor;
use tower::Service;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::handlers::{metrics_handler, not_found_handler, root_handler};
use crate::http::slow::slow_handler;
use crate::net::{ConnectionGuard, Listener, ListenerError};
use crate::streams::{StreamRecord, StreamRegistry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StreamRegistry>,
    pub slow_delay: Duration,
}

impl AppState {
    pub fn new(registry: Arc<StreamRegistry>, slow_delay: Duration) -> Self {
        Self {
            registry,
            slow_delay,
        }
    }

    /// Register a dispatched stream and log it.
    pub(crate) fn track(&self, method: &'static str, path: &'static str) -> StreamRecord {
        let record = StreamRecord::open(Arc::clone(&self.registry));
        tracing::debug!(
            method,
            path,
            active_streams = record.active_at_open(),
            "Stream dispatched"
        );
        record
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),
}

/// Route table. Unknown paths and non-GET methods fall through to 404.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/slow", get(slow_handler).fallback(not_found_handler))
        .route("/metrics", get(metrics_handler).fallback(not_found_handler))
        .route("/", get(root_handler).fallback(not_found_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the rapid reset testbed.
pub struct HttpServer {
    router: Router,
    registry: Arc<StreamRegistry>,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, Arc::new(StreamRegistry::new()))
    }

    /// Build a server around an existing registry (tests read it directly).
    pub fn with_registry(config: ServerConfig, registry: Arc<StreamRegistry>) -> Self {
        let state = AppState::new(Arc::clone(&registry), config.stream.slow_delay());
        let router = build_router(state);
        Self {
            router,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> Arc<StreamRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept connections until `shutdown` fires.
    ///
    /// Per-connection failures (TLS handshake, protocol errors, resets) are
    /// logged and never end the loop.
    pub async fn run(
        self,
        listener: Listener,
        tls: Option<TlsAcceptor>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(
            address = %addr,
            tls = tls.is_some(),
            slow_delay_ms = self.config.stream.slow_delay_ms,
            "HTTP server starting"
        );

        loop {
            let (tcp, peer, permit) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(ListenerError::Closed) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        continue;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            };

            let registry = Arc::clone(&self.registry);
            let router = self.router.clone();
            let tls = tls.clone();

            tokio::spawn(async move {
                let _permit = permit;
                match tls {
                    Some(acceptor) => match acceptor.accept(tcp).await {
                        Ok(stream) => serve_tracked(stream, peer, router, registry).await,
                        Err(e) => {
                            tracing::debug!(peer = %peer, error = %e, "TLS handshake failed");
                        }
                    },
                    None => serve_tracked(tcp, peer, router, registry).await,
                }
            });
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve one established connection, counted in the registry while it lives.
async fn serve_tracked<I>(io: I, peer: SocketAddr, router: Router, registry: Arc<StreamRegistry>)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let guard = ConnectionGuard::track(registry);
    if let Err(e) = serve_connection(io, router).await {
        tracing::debug!(
            connection_id = %guard.id(),
            peer = %peer,
            error = %e,
            "Connection ended with error"
        );
    }
}

async fn serve_connection<I>(io: I, router: Router) -> Result<(), BoxError>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = hyper::service::service_fn(move |request: Request<Incoming>| {
        router.clone().call(request.map(Body::new))
    });

    auto::Builder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(io), service)
        .await
}
