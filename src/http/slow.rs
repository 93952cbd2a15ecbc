//! Deferred response for `GET /slow`.
//!
//! The handler registers the stream, then suspends on a single-shot timer.
//! Two things can happen first:
//! - the timer fires: the body is built and the record resolves `Completed`;
//! - the peer resets the stream: hyper drops this future, which drops the
//!   pending sleep and the record, and the record resolves `Reset`.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::streams::StreamRecord;

/// Body sent when the deferred timer wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowResponse {
    pub message: String,
    /// RFC 3339, millisecond precision, UTC.
    pub timestamp: String,
}

pub async fn slow_handler(State(state): State<AppState>) -> Response {
    let record = state.track("GET", "/slow");

    tokio::time::sleep(state.slow_delay).await;

    deferred_response(&record)
}

fn deferred_response(record: &StreamRecord) -> Response {
    let body = SlowResponse {
        message: "Slow response completed".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    match serde_json::to_vec(&body) {
        Ok(bytes) => {
            record.complete();
            ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => {
            record.fail();
            tracing::warn!(error = %e, "Failed to encode slow response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
