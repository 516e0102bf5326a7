//! Error types shared across voxgate crates.
//!
//! Input problems ([`ValidationError`]) are kept apart from runtime failures
//! ([`GenerationError`]) so adapters can map the former to client errors
//! without inspecting messages.

use std::time::Duration;

use thiserror::Error;

use crate::domain::SPEAKERS;

/// A request was rejected before any generation work was admitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Text cannot be empty")]
    EmptyText,

    #[error("Invalid speaker '{0}'. Must be one of: {valid}", valid = SPEAKERS.join(", "))]
    InvalidSpeaker(String),

    #[error("Invalid model size '{0}'")]
    InvalidModelSize(String),

    #[error("Reference text is required unless x_vector_only is enabled")]
    MissingReferenceText,

    #[error("Voice description cannot be empty")]
    MissingVoiceDescription,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Reference audio is empty")]
    EmptyReferenceAudio,

    #[error("Could not read reference audio: {0}")]
    ReferenceAudio(String),

    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// A generation call failed after it was admitted (or while waiting to be).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The deadline expired. The admission slot has already been released.
    #[error("generation timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The generation backend reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The produced audio could not be encoded.
    #[error("audio encoding failed: {0}")]
    Encoding(String),

    /// The blocking worker panicked or was cancelled by the runtime.
    #[error("generation worker aborted: {0}")]
    Worker(String),
}

impl GenerationError {
    /// Whether this error came from an expired deadline.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors raised by audio codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode audio: {0}")]
    Encode(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// A required external tool is not available.
    #[error("{0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CodecError> for GenerationError {
    fn from(err: CodecError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<CodecError> for ValidationError {
    fn from(err: CodecError) -> Self {
        Self::ReferenceAudio(err.to_string())
    }
}

/// Errors surfaced by [`crate::services::SpeechService`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
