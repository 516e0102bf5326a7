//! Voice clone handlers.
//!
//! Both endpoints take a multipart form: text fields plus a `ref_audio`
//! file. Field checks run before the clip is decoded.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use tracing::info;
use voxgate_core::{GenerationRequest, ValidationError};

use super::STREAM_BUFFER;
use super::audio::{audio_response, decode_reference};
use crate::dto::VoiceCloneForm;
use crate::error::HttpError;
use crate::sse::generation_stream;
use crate::state::AppState;

struct Upload {
    file_name: Option<String>,
    bytes: Bytes,
}

async fn read_form(mut multipart: Multipart) -> Result<(VoiceCloneForm, Option<Upload>), HttpError> {
    let mut form = VoiceCloneForm::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidationError::Malformed(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "ref_audio" {
            let file_name = field.file_name().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ValidationError::Malformed(e.to_string()))?;
            upload = Some(Upload { file_name, bytes });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ValidationError::Malformed(e.to_string()))?;
            form.set(&name, value);
        }
    }

    Ok((form, upload))
}

async fn build_request(state: &AppState, multipart: Multipart) -> Result<GenerationRequest, HttpError> {
    let (form, upload) = read_form(multipart).await?;
    form.precheck()?;

    let upload = upload.ok_or_else(|| ValidationError::MissingField("ref_audio".to_string()))?;
    info!(
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = upload.bytes.len(),
        x_vector_only = form.x_vector_only(),
        "Voice clone upload received"
    );

    let reference =
        decode_reference(state.decoder.clone(), upload.file_name, upload.bytes).await?;
    Ok(form.into_request(reference)?)
}

pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let request = build_request(&state, multipart).await?;
    let audio = state.speech.synthesize(request).await?;
    Ok(audio_response(audio))
}

pub async fn stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let request = build_request(&state, multipart).await?;
    let session = state.speech.open_stream(request)?;
    Ok(generation_stream(session.spawn(STREAM_BUFFER)).into_response())
}
