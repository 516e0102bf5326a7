//! Generation request types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::audio::ReferenceAudio;
use crate::error::ValidationError;

/// Built-in speakers available in custom-voice mode.
pub const SPEAKERS: [&str; 9] = [
    "Aiden", "Dylan", "Eric", "Ono_anna", "Ryan", "Serena", "Sohee", "Uncle_fu", "Vivian",
];

/// Language tag used when the client does not provide one.
pub const DEFAULT_LANGUAGE: &str = "Auto";

/// Model variant used for custom-voice and voice-clone generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelSize {
    #[serde(rename = "0.6B")]
    Small,
    #[default]
    #[serde(rename = "1.7B")]
    Large,
}

impl ModelSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "0.6B",
            Self::Large => "1.7B",
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0.6B" => Ok(Self::Small),
            "1.7B" => Ok(Self::Large),
            other => Err(ValidationError::InvalidModelSize(other.to_string())),
        }
    }
}

/// Which generation mode a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    CustomVoice,
    VoiceClone,
    VoiceDesign,
}

impl VoiceMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CustomVoice => "custom_voice",
            Self::VoiceClone => "voice_clone",
            Self::VoiceDesign => "voice_design",
        }
    }
}

impl fmt::Display for VoiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode-specific generation parameters.
#[derive(Debug, Clone)]
pub enum VoiceParams {
    /// A built-in speaker with an optional style instruction.
    CustomVoice {
        speaker: String,
        instruct: Option<String>,
        model_size: ModelSize,
    },
    /// Clone the voice of an uploaded reference clip.
    ///
    /// The reference buffer is shared so per-segment requests do not copy it.
    VoiceClone {
        reference: Arc<ReferenceAudio>,
        ref_text: Option<String>,
        x_vector_only: bool,
        model_size: ModelSize,
    },
    /// Synthesize a new voice from a natural-language description.
    VoiceDesign { voice_description: String },
}

impl VoiceParams {
    pub const fn mode(&self) -> VoiceMode {
        match self {
            Self::CustomVoice { .. } => VoiceMode::CustomVoice,
            Self::VoiceClone { .. } => VoiceMode::VoiceClone,
            Self::VoiceDesign { .. } => VoiceMode::VoiceDesign,
        }
    }
}

/// One generation job: text, language and voice parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text: String,
    pub language: String,
    pub params: VoiceParams,
}

impl GenerationRequest {
    /// Create a request using the default language.
    pub fn new(text: impl Into<String>, params: VoiceParams) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            params,
        }
    }

    /// Set the language tag. Blank values keep the default.
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        if let Some(language) = language.filter(|l| !l.trim().is_empty()) {
            self.language = language;
        }
        self
    }

    /// Copy of this request targeting a different slice of text.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: self.language.clone(),
            params: self.params.clone(),
        }
    }

    pub const fn mode(&self) -> VoiceMode {
        self.params.mode()
    }

    /// Check field-level constraints. Runs before any gate admission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        match &self.params {
            VoiceParams::CustomVoice { speaker, .. } => {
                if !SPEAKERS.contains(&speaker.as_str()) {
                    return Err(ValidationError::InvalidSpeaker(speaker.clone()));
                }
            }
            VoiceParams::VoiceClone {
                reference,
                ref_text,
                x_vector_only,
                ..
            } => {
                let has_transcript = ref_text.as_deref().is_some_and(|t| !t.trim().is_empty());
                if !x_vector_only && !has_transcript {
                    return Err(ValidationError::MissingReferenceText);
                }
                if reference.is_empty() {
                    return Err(ValidationError::EmptyReferenceAudio);
                }
            }
            VoiceParams::VoiceDesign { voice_description } => {
                if voice_description.trim().is_empty() {
                    return Err(ValidationError::MissingVoiceDescription);
                }
            }
        }

        Ok(())
    }
}

/// Parse the loose boolean flags accepted by form fields.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(speaker: &str) -> GenerationRequest {
        GenerationRequest::new(
            "Hello there.",
            VoiceParams::CustomVoice {
                speaker: speaker.to_string(),
                instruct: None,
                model_size: ModelSize::default(),
            },
        )
    }

    fn clone_params(ref_text: Option<&str>, x_vector_only: bool) -> VoiceParams {
        VoiceParams::VoiceClone {
            reference: Arc::new(ReferenceAudio::new(vec![0.1, 0.2], 24_000)),
            ref_text: ref_text.map(str::to_string),
            x_vector_only,
            model_size: ModelSize::Small,
        }
    }

    #[test]
    fn test_model_size_parse_and_display() {
        assert_eq!("0.6B".parse::<ModelSize>(), Ok(ModelSize::Small));
        assert_eq!("1.7B".parse::<ModelSize>(), Ok(ModelSize::Large));
        assert_eq!(
            "3B".parse::<ModelSize>(),
            Err(ValidationError::InvalidModelSize("3B".into()))
        );
        assert_eq!(ModelSize::default().to_string(), "1.7B");
    }

    #[test]
    fn test_model_size_serde_names() {
        let json = serde_json::to_string(&ModelSize::Small).unwrap();
        assert_eq!(json, "\"0.6B\"");
        let parsed: ModelSize = serde_json::from_str("\"1.7B\"").unwrap();
        assert_eq!(parsed, ModelSize::Large);
    }

    #[test]
    fn test_known_speaker_is_valid() {
        for speaker in SPEAKERS {
            assert!(custom(speaker).validate().is_ok(), "{speaker}");
        }
    }

    #[test]
    fn test_unknown_speaker_rejected() {
        assert_eq!(
            custom("aiden").validate(),
            Err(ValidationError::InvalidSpeaker("aiden".into()))
        );
    }

    #[test]
    fn test_blank_text_rejected() {
        let req = custom("Ryan").with_text("   \n ");
        assert_eq!(req.validate(), Err(ValidationError::EmptyText));
    }

    #[test]
    fn test_clone_requires_transcript_unless_x_vector_only() {
        let req = GenerationRequest::new("Hi.", clone_params(None, false));
        assert_eq!(req.validate(), Err(ValidationError::MissingReferenceText));

        let req = GenerationRequest::new("Hi.", clone_params(Some("  "), false));
        assert_eq!(req.validate(), Err(ValidationError::MissingReferenceText));

        let req = GenerationRequest::new("Hi.", clone_params(None, true));
        assert!(req.validate().is_ok());

        let req = GenerationRequest::new("Hi.", clone_params(Some("hello"), false));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_clone_rejects_empty_reference() {
        let params = VoiceParams::VoiceClone {
            reference: Arc::new(ReferenceAudio::new(Vec::new(), 24_000)),
            ref_text: Some("hello".into()),
            x_vector_only: false,
            model_size: ModelSize::Large,
        };
        let req = GenerationRequest::new("Hi.", params);
        assert_eq!(req.validate(), Err(ValidationError::EmptyReferenceAudio));
    }

    #[test]
    fn test_design_requires_description() {
        let req = GenerationRequest::new(
            "Hi.",
            VoiceParams::VoiceDesign {
                voice_description: " ".into(),
            },
        );
        assert_eq!(req.validate(), Err(ValidationError::MissingVoiceDescription));
    }

    #[test]
    fn test_with_text_shares_reference() {
        let req = GenerationRequest::new("One. Two.", clone_params(Some("ref"), false))
            .with_language(Some("English".into()));
        let segment = req.with_text("Two.");

        assert_eq!(segment.text, "Two.");
        assert_eq!(segment.language, "English");
        match (&req.params, &segment.params) {
            (
                VoiceParams::VoiceClone { reference: a, .. },
                VoiceParams::VoiceClone { reference: b, .. },
            ) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected voice clone params"),
        }
    }

    #[test]
    fn test_blank_language_keeps_default() {
        let req = custom("Eric").with_language(Some(String::new()));
        assert_eq!(req.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("YES"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("on"));
    }
}
