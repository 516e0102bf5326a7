//! Audio plumbing shared by the voice handlers.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::{self, HeaderName};
use axum::response::{IntoResponse, Response};
use tracing::debug;
use voxgate_core::{AudioDecoder, EncodedAudio, ReferenceAudio, ValidationError};
use voxgate_runtime::prepare_reference;

use crate::error::HttpError;

const AUDIO_DURATION: HeaderName = HeaderName::from_static("x-audio-duration");
const SAMPLE_RATE: HeaderName = HeaderName::from_static("x-sample-rate");

/// Complete (non-streamed) audio response.
pub fn audio_response(audio: EncodedAudio) -> Response {
    (
        [
            (header::CONTENT_TYPE, audio.content_type.to_string()),
            (AUDIO_DURATION, audio.duration_secs.to_string()),
            (SAMPLE_RATE, audio.sample_rate.to_string()),
        ],
        audio.bytes,
    )
        .into_response()
}

/// Decode an uploaded reference clip and prepare it for generation.
///
/// The upload is spooled to a temporary file that keeps the original
/// extension so the fallback decoder can recognise the container. Runs on
/// the blocking pool.
pub async fn decode_reference(
    decoder: Arc<dyn AudioDecoder>,
    file_name: Option<String>,
    bytes: Bytes,
) -> Result<ReferenceAudio, HttpError> {
    if bytes.is_empty() {
        return Err(ValidationError::EmptyReferenceAudio.into());
    }

    tokio::task::spawn_blocking(move || -> Result<ReferenceAudio, HttpError> {
        let suffix = file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map_or_else(|| ".tmp".to_string(), |ext| format!(".{ext}"));

        let mut file = tempfile::Builder::new()
            .prefix("voxgate-ref-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| HttpError::Internal(format!("failed to spool upload: {e}")))?;
        file.write_all(&bytes)
            .map_err(|e| HttpError::Internal(format!("failed to spool upload: {e}")))?;

        let decoded = decoder
            .decode(file.path())
            .map_err(ValidationError::from)?;
        debug!(
            channels = decoded.channels,
            sample_rate = decoded.sample_rate,
            frames = decoded.frames(),
            "Reference audio decoded"
        );

        Ok(prepare_reference(decoded).map_err(ValidationError::from)?)
    })
    .await
    .map_err(|e| HttpError::Internal(format!("reference decoding aborted: {e}")))?
}
