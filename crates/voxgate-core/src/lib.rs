//! Core domain types, ports and job orchestration for voxgate.
//!
//! This crate has no HTTP, codec or process dependencies. It provides:
//!
//! - [`text::segment_text`]: sentence-aligned segmentation for streaming
//! - [`inference::ConcurrencyGate`]: bounded, deadline-aware blocking execution
//! - [`status::StatusBus`]: process-wide status fan-out
//! - [`stream::StreamSession`]: ordered per-segment generation with cancellation
//! - [`services::SpeechService`]: the blocking generation path
//!
//! Infrastructure plugs in through the traits in [`ports`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod inference;
pub mod ports;
pub mod services;
pub mod settings;
pub mod status;
pub mod stream;
pub mod text;

// Re-export commonly used types for convenience
pub use domain::{
    DEFAULT_LANGUAGE, DecodedAudio, EncodedAudio, GeneratedAudio, GenerationRequest, ModelSize,
    ReferenceAudio, SPEAKERS, VoiceMode, VoiceParams, parse_flag,
};
pub use error::{CodecError, GenerationError, SpeechError, ValidationError};
pub use inference::{ConcurrencyGate, Deadline};
pub use ports::{AudioDecoder, AudioEncoder, NoopStatusEmitter, SpeechGenerator, StatusEmitter};
pub use services::{SpeechDeps, SpeechService};
pub use settings::{InferenceSettings, SettingsError, validate_settings};
pub use status::{StatusBus, StatusFrame, StatusKind, StatusMessage, StatusPublisher, Subscription};
pub use stream::{SessionState, StreamConfig, StreamEvent, StreamHandle, StreamSession};
pub use text::{collapse_whitespace, segment_text};

#[cfg(test)]
use tokio_test as _;
