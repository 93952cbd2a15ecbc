//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use rapid_reset::config::ServerConfig;
use rapid_reset::net::{tls, Listener};
use rapid_reset::{HttpServer, Shutdown, Snapshot, StreamRegistry};

/// A server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<StreamRegistry>,
    pub shutdown: Shutdown,
    tls: bool,
}

impl TestServer {
    pub fn target(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.target(), path)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry.snapshot()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the server without TLS, holding `/slow` for `slow_delay`.
pub async fn start_server(slow_delay: Duration) -> TestServer {
    spawn_server(slow_delay, None).await
}

/// Start the server with the self-signed fixture certificate.
pub async fn start_tls_server(slow_delay: Duration) -> TestServer {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let acceptor = tls::load_acceptor(&fixtures.join("cert.pem"), &fixtures.join("key.pem"))
        .await
        .unwrap();
    spawn_server(slow_delay, Some(acceptor)).await
}

async fn spawn_server(slow_delay: Duration, acceptor: Option<TlsAcceptor>) -> TestServer {
    let mut config = ServerConfig::default();
    config.listener.tls.enabled = acceptor.is_some();
    config.stream.slow_delay_ms = slow_delay.as_millis() as u64;

    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let registry = Arc::new(StreamRegistry::new());
    let server = HttpServer::with_registry(config, Arc::clone(&registry));
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let tls = acceptor.is_some();
    tokio::spawn(async move {
        let _ = server.run(listener, acceptor, server_shutdown).await;
    });

    TestServer {
        addr,
        registry,
        shutdown,
        tls,
    }
}

/// Poll `check` until it holds or `timeout` elapses. Returns the last result.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Run `fut` with a generous upper bound so a hung test fails instead of
/// stalling the suite.
pub async fn bounded<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(20), fut)
        .await
        .expect("test step timed out")
}
