//! Immediate handlers: `/metrics`, `/` and the 404 fallback.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;

pub const USAGE: &str = "HTTP/2 Rapid Reset Demo Server\nEndpoints:\n/slow - slow response\n/metrics - server statistics";

/// `GET /metrics`: registry snapshot as pretty JSON.
///
/// The snapshot is taken while this stream is open, so it counts itself.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let record = state.track("GET", "/metrics");

    match serde_json::to_string_pretty(&state.registry.snapshot()) {
        Ok(body) => {
            record.complete();
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            record.fail();
            tracing::warn!(error = %e, "Failed to encode metrics snapshot");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /`: plaintext usage summary.
pub async fn root_handler(State(state): State<AppState>) -> Response {
    let record = state.track("GET", "/");
    record.complete();
    ([(header::CONTENT_TYPE, "text/plain")], USAGE).into_response()
}

/// Everything else. Untracked.
pub async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
