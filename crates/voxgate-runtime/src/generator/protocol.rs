//! Wire protocol between [`super::CommandGenerator`] and the generator process.
//!
//! # Protocol
//!
//! The process receives one JSON request on stdin and closes it:
//!
//! ```json
//! {"text": "Hello.", "language": "Auto", "mode": "custom_voice", "speaker": "Vivian", "instruct": null, "model_size": "1.7B"}
//! {"text": "Hello.", "language": "English", "mode": "voice_clone", "ref_audio": "<base64 wav>", "ref_text": "...", "x_vector_only": false, "model_size": "0.6B"}
//! {"text": "Hello.", "language": "Auto", "mode": "voice_design", "voice_description": "a calm narrator"}
//! ```
//!
//! It writes a single WAV file to stdout. Progress goes to stderr as JSON
//! lines; anything else on stderr is treated as diagnostics:
//!
//! ```json
//! {"status": "Loading model", "type": "info"}
//! {"status": "Decoding", "type": "progress", "progress": 40}
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use voxgate_core::{CodecError, GenerationRequest, ModelSize, StatusKind, VoiceParams};

use crate::audio::{WavEncoder, WavFormat};

// ============================================================================
// Request
// ============================================================================

/// JSON request written to the generator's stdin.
#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub text: &'a str,
    pub language: &'a str,
    #[serde(flatten)]
    pub params: WireParams<'a>,
}

/// Mode-specific request fields, tagged by `mode`.
#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WireParams<'a> {
    CustomVoice {
        speaker: &'a str,
        instruct: Option<&'a str>,
        model_size: ModelSize,
    },
    VoiceClone {
        /// Base64 of a 32-bit float mono WAV.
        ref_audio: String,
        ref_text: Option<&'a str>,
        x_vector_only: bool,
        model_size: ModelSize,
    },
    VoiceDesign {
        voice_description: &'a str,
    },
}

impl<'a> WireRequest<'a> {
    /// Build the wire form of a request, embedding any reference clip.
    pub fn from_request(request: &'a GenerationRequest) -> Result<Self, CodecError> {
        let params = match &request.params {
            VoiceParams::CustomVoice {
                speaker,
                instruct,
                model_size,
            } => WireParams::CustomVoice {
                speaker,
                instruct: instruct.as_deref(),
                model_size: *model_size,
            },
            VoiceParams::VoiceClone {
                reference,
                ref_text,
                x_vector_only,
                model_size,
            } => {
                let wav = WavEncoder::new(WavFormat::Float32)
                    .encode_samples(&reference.samples, reference.sample_rate)?;
                WireParams::VoiceClone {
                    ref_audio: STANDARD.encode(wav),
                    ref_text: ref_text.as_deref(),
                    x_vector_only: *x_vector_only,
                    model_size: *model_size,
                }
            }
            VoiceParams::VoiceDesign { voice_description } => WireParams::VoiceDesign {
                voice_description,
            },
        };

        Ok(Self {
            text: &request.text,
            language: &request.language,
            params,
        })
    }
}

// ============================================================================
// Status lines
// ============================================================================

/// A progress report parsed from one stderr line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusLine {
    pub status: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: StatusKind,
    #[serde(default)]
    pub progress: Option<f64>,
}

const fn default_kind() -> StatusKind {
    StatusKind::Info
}

/// Parse a stderr line as a status report.
///
/// Returns `None` for anything that is not a JSON object with a `status`
/// string; those lines are diagnostics.
pub fn parse_status_line(line: &str) -> Option<StatusLine> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    serde_json::from_str(line).ok()
}
