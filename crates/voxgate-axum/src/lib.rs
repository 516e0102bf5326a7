//! Axum web adapter for voxgate.
//!
//! Exposes the three voice modes as blocking and streaming endpoints plus
//! the status side channel:
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /health` | liveness |
//! | `POST /api/custom-voice[/stream]` | [`handlers::custom_voice`] |
//! | `POST /api/voice-clone[/stream]` | [`handlers::voice_clone`] |
//! | `POST /api/voice-design[/stream]` | [`handlers::voice_design`] |
//! | `GET /api/status/stream`, `GET /api/status/test` | [`handlers::status`] |

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use base64 as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

// Used by the main.rs binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod cli;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use cli::Cli;
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
