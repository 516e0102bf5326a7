//! Two-stage decoding: try one decoder, fall back to another on failure.

use std::path::Path;

use tracing::info;
use voxgate_core::{AudioDecoder, CodecError, DecodedAudio};

use super::{FfmpegDecoder, WavDecoder};

/// Tries `primary` first and hands the file to `secondary` when it fails.
pub struct FallbackDecoder<P = WavDecoder, S = FfmpegDecoder> {
    primary: P,
    secondary: S,
}

impl Default for FallbackDecoder {
    fn default() -> Self {
        Self::new(WavDecoder::new(), FfmpegDecoder::default())
    }
}

impl<P, S> FallbackDecoder<P, S> {
    pub const fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: AudioDecoder, S: AudioDecoder> AudioDecoder for FallbackDecoder<P, S> {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError> {
        match self.primary.decode(path) {
            Ok(audio) => Ok(audio),
            Err(primary_err) => {
                info!(
                    path = %path.display(),
                    error = %primary_err,
                    "Primary decoder rejected audio, trying fallback"
                );
                self.secondary.decode(path)
            }
        }
    }
}
