//! Audio buffers passed between the generator, codecs and HTTP adapters.

use crate::error::GenerationError;

/// Raw output of one generation call.
///
/// Mono `f32` samples; the buffer is owned by the call that produced it
/// until it is handed to an encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl GeneratedAudio {
    pub const fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Reject output that cannot be encoded: no samples or a zero rate.
    pub fn ensure_valid(&self) -> Result<(), GenerationError> {
        if self.samples.is_empty() {
            return Err(GenerationError::Failed(
                "generator returned an empty audio buffer".to_string(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(GenerationError::Failed(
                "generator returned a zero sample rate".to_string(),
            ));
        }
        Ok(())
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Audio read back from a container, possibly multi-channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples normalised to `[-1, 1]` by the decoder.
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }
}

/// Prepared voice-clone reference: mono samples at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl ReferenceAudio {
    pub const fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Container bytes ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub duration_secs: f64,
    pub sample_rate: u32,
}
