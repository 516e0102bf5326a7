//! Route definitions and router construction.
//!
//! This module defines the HTTP routes and creates the main router.
//! Handlers delegate to the shared `SpeechService` and `StatusBus`.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body; bounds reference clip uploads.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any)
        }
    }
}

/// Build all API routes without `/api` prefix (for nesting under /api).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Custom voice
        .route("/custom-voice", post(handlers::custom_voice::generate))
        .route("/custom-voice/stream", post(handlers::custom_voice::stream))
        // Voice clone (multipart uploads)
        .route("/voice-clone", post(handlers::voice_clone::generate))
        .route("/voice-clone/stream", post(handlers::voice_clone::stream))
        // Voice design
        .route("/voice-design", post(handlers::voice_design::generate))
        .route("/voice-design/stream", post(handlers::voice_design::stream))
        // Status side channel
        .route("/status/stream", get(handlers::status::stream))
        .route("/status/test", get(handlers::status::test))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Create the application router.
///
/// Serves `/health` and the API under `/api`.
pub fn create_router(ctx: AxumContext, cors: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state))
        .layer(build_cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn health_check() -> &'static str {
    "OK"
}
