//! Runtime adapters for voxgate.
//!
//! Implements the `voxgate-core` ports that touch the outside world:
//!
//! - [`audio`]: WAV encode/decode, the ffmpeg fallback and reference clip preparation
//! - [`generator`]: the subprocess-backed [`voxgate_core::SpeechGenerator`]

#![deny(unused_crate_dependencies)]

pub mod audio;
pub mod generator;

pub use audio::{
    FallbackDecoder, FfmpegDecoder, REFERENCE_SAMPLE_RATE, WavDecoder, WavEncoder, WavFormat,
    prepare_reference,
};
pub use generator::{CommandGenerator, CommandSpec};
