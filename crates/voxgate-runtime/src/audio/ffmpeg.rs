//! Decoding of arbitrary audio containers through an external `ffmpeg`.
//!
//! `ffmpeg` transcodes the input to a 16-bit PCM WAV in a temporary
//! directory, which is then read with [`WavDecoder`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;
use voxgate_core::{AudioDecoder, CodecError, DecodedAudio};

use super::WavDecoder;

/// Shells out to `ffmpeg` for formats `hound` cannot read.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: PathBuf,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError> {
        let workdir = tempfile::tempdir()?;
        let output = workdir.path().join("converted.wav");

        debug!(input = %path.display(), "Transcoding reference audio with ffmpeg");

        let result = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(path)
            .args(["-acodec", "pcm_s16le"])
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CodecError::Unavailable(
                    "ffmpeg is required to decode this audio format".to_string(),
                ));
            }
            Err(e) => return Err(CodecError::Io(e)),
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let reason = last_line(&stderr).unwrap_or("Unknown error");
            return Err(CodecError::Decode(format!("ffmpeg could not convert the file: {reason}")));
        }

        WavDecoder::new().decode(&output)
    }
}

/// Last non-blank line of a process's stderr.
pub(crate) fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}
