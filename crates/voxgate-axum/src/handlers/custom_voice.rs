//! Custom voice handlers: built-in speakers with optional style instructions.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use super::STREAM_BUFFER;
use super::audio::audio_response;
use crate::dto::CustomVoiceBody;
use crate::error::HttpError;
use crate::sse::generation_stream;
use crate::state::AppState;

pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<CustomVoiceBody>,
) -> Result<Response, HttpError> {
    let request = body.into_request()?;
    let audio = state.speech.synthesize(request).await?;
    Ok(audio_response(audio))
}

pub async fn stream(
    State(state): State<AppState>,
    Json(body): Json<CustomVoiceBody>,
) -> Result<Response, HttpError> {
    let session = state.speech.open_stream(body.into_request()?)?;
    Ok(generation_stream(session.spawn(STREAM_BUFFER)).into_response())
}
