//! Status side-channel handlers.

use axum::Json;
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use voxgate_core::StatusKind;

use crate::sse::status_stream;
use crate::state::AppState;

/// Body returned by `GET /api/status/test`.
#[derive(Debug, Serialize)]
pub struct StatusTestResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Live status stream for one client.
pub async fn stream(State(state): State<AppState>) -> Response {
    status_stream(&state.status)
}

/// Publish a test message, keeping the kind of the current status.
pub async fn test(State(state): State<AppState>) -> Json<StatusTestResponse> {
    let kind = state
        .status
        .current()
        .map_or(StatusKind::Info, |current| current.kind);
    state.status.publish("Test status message", kind, None);

    Json(StatusTestResponse {
        status: "ok",
        message: "Test status sent",
    })
}
