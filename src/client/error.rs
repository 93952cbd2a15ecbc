//! Client error taxonomy.

use hyper::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// TCP connect failed (refused, unreachable, DNS).
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] tokio_rustls::rustls::Error),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(#[source] std::io::Error),

    #[error("HTTP/2 handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    /// Stream-level failure: reset by the server, connection lost mid-stream.
    #[error("stream error: {0}")]
    Stream(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("invalid metrics body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the server was not listening at all.
    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            ClientError::Connect { source, .. }
                if source.kind() == std::io::ErrorKind::ConnectionRefused
        )
    }

    /// Session-level errors end a phase; anything else concerns one request.
    ///
    /// A stream error counts when hyper reports the connection itself as
    /// gone: closed under the request, or the dispatcher dropped it unsent.
    pub fn is_session_error(&self) -> bool {
        match self {
            ClientError::InvalidTarget { .. }
            | ClientError::Connect { .. }
            | ClientError::TlsConfig(_)
            | ClientError::TlsHandshake(_)
            | ClientError::Handshake(_) => true,
            ClientError::Stream(e) => e.is_closed() || e.is_canceled(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_detected() {
        let err = ClientError::Connect {
            addr: "localhost:3000".into(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert!(err.is_connection_refused());
        assert!(err.is_session_error());
        assert!(!ClientError::Timeout(Duration::from_secs(1)).is_connection_refused());
    }

    #[test]
    fn parse_errors_are_not_session_errors() {
        let err: ClientError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(!err.is_session_error());
        assert!(err.to_string().starts_with("invalid metrics body"));
    }

    #[test]
    fn request_level_failures_keep_the_session() {
        assert!(!ClientError::Timeout(Duration::from_secs(30)).is_session_error());
        assert!(!ClientError::Status(StatusCode::BAD_GATEWAY).is_session_error());
    }
}
