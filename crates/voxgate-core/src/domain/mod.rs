//! Domain types for speech generation jobs.

mod audio;
mod request;

pub use audio::{DecodedAudio, EncodedAudio, GeneratedAudio, ReferenceAudio};
pub use request::{
    DEFAULT_LANGUAGE, GenerationRequest, ModelSize, SPEAKERS, VoiceMode, VoiceParams, parse_flag,
};
