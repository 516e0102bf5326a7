//! Request bodies for the voice routes and their conversion into domain requests.

use std::sync::Arc;

use serde::Deserialize;
use voxgate_core::{
    GenerationRequest, ModelSize, ReferenceAudio, ValidationError, VoiceParams, parse_flag,
};

fn model_size(value: Option<&str>) -> Result<ModelSize, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map_or(Ok(ModelSize::default()), str::parse)
}

/// JSON body of `POST /api/custom-voice[/stream]`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomVoiceBody {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    pub speaker: String,
    #[serde(default)]
    pub instruct: Option<String>,
    #[serde(default)]
    pub model_size: Option<String>,
}

impl CustomVoiceBody {
    pub fn into_request(self) -> Result<GenerationRequest, ValidationError> {
        let model_size = model_size(self.model_size.as_deref())?;
        let instruct = self.instruct.filter(|i| !i.trim().is_empty());
        Ok(GenerationRequest::new(
            self.text,
            VoiceParams::CustomVoice {
                speaker: self.speaker,
                instruct,
                model_size,
            },
        )
        .with_language(self.language))
    }
}

/// JSON body of `POST /api/voice-design[/stream]`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceDesignBody {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    pub voice_description: String,
}

impl VoiceDesignBody {
    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest::new(
            self.text,
            VoiceParams::VoiceDesign {
                voice_description: self.voice_description,
            },
        )
        .with_language(self.language)
    }
}

/// Text fields of the multipart `POST /api/voice-clone[/stream]` form.
///
/// The uploaded clip travels separately so it can be decoded only after the
/// cheap checks in [`VoiceCloneForm::precheck`] pass.
#[derive(Debug, Clone, Default)]
pub struct VoiceCloneForm {
    pub text: Option<String>,
    pub language: Option<String>,
    pub model_size: Option<String>,
    pub ref_text: Option<String>,
    pub x_vector_only: Option<String>,
}

impl VoiceCloneForm {
    /// Record a text field by name. Unknown fields are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "text" => &mut self.text,
            "language" => &mut self.language,
            "model_size" => &mut self.model_size,
            "ref_text" => &mut self.ref_text,
            "x_vector_only" => &mut self.x_vector_only,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn x_vector_only(&self) -> bool {
        self.x_vector_only.as_deref().is_some_and(parse_flag)
    }

    /// Reject the form before the reference clip is decoded.
    pub fn precheck(&self) -> Result<(), ValidationError> {
        model_size(self.model_size.as_deref())?;

        let text = self
            .text
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("text".to_string()))?;
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let has_transcript = self
            .ref_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !self.x_vector_only() && !has_transcript {
            return Err(ValidationError::MissingReferenceText);
        }
        Ok(())
    }

    pub fn into_request(self, reference: ReferenceAudio) -> Result<GenerationRequest, ValidationError> {
        self.precheck()?;
        let x_vector_only = self.x_vector_only();
        let model_size = model_size(self.model_size.as_deref())?;
        let ref_text = self.ref_text.filter(|t| !t.trim().is_empty());

        Ok(GenerationRequest::new(
            self.text.unwrap_or_default(),
            VoiceParams::VoiceClone {
                reference: Arc::new(reference),
                ref_text,
                x_vector_only,
                model_size,
            },
        )
        .with_language(self.language))
    }
}
