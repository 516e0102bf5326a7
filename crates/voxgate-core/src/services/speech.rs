//! Speech service: blocking generation and stream construction.
//!
//! Adapters call this instead of touching the gate, generator and encoder
//! directly. Validation always happens here, before a slot is requested.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::domain::{EncodedAudio, GenerationRequest};
use crate::error::{SpeechError, ValidationError};
use crate::inference::{ConcurrencyGate, Deadline};
use crate::ports::{AudioEncoder, SpeechGenerator, StatusEmitter};
use crate::stream::{StreamConfig, StreamSession};

/// Dependencies for [`SpeechService`].
pub struct SpeechDeps {
    pub gate: ConcurrencyGate,
    pub generator: Arc<dyn SpeechGenerator>,
    pub encoder: Arc<dyn AudioEncoder>,
    pub status: Arc<dyn StatusEmitter>,
    pub stream: StreamConfig,
}

/// Entry point for generation jobs.
pub struct SpeechService {
    gate: ConcurrencyGate,
    generator: Arc<dyn SpeechGenerator>,
    encoder: Arc<dyn AudioEncoder>,
    status: Arc<dyn StatusEmitter>,
    stream: StreamConfig,
}

impl SpeechService {
    pub fn new(deps: SpeechDeps) -> Self {
        Self {
            gate: deps.gate,
            generator: deps.generator,
            encoder: deps.encoder,
            status: deps.status,
            stream: deps.stream,
        }
    }

    /// Generate the whole request and return encoded audio.
    ///
    /// Uses the gate's default deadline. Nothing is returned on failure, so
    /// callers never see a partial body.
    pub async fn synthesize(&self, request: GenerationRequest) -> Result<EncodedAudio, SpeechError> {
        request.validate()?;

        let mode = request.mode();
        let chars = request.text.chars().count();
        info!(%mode, chars, language = %request.language, "Generation request");
        self.status.info(&format!("Generating {mode} audio"));

        let started = Instant::now();
        let generator = Arc::clone(&self.generator);
        let result = self
            .gate
            .run(Deadline::Default, move || generator.generate(&request))
            .await
            .and_then(|audio| {
                audio.ensure_valid()?;
                let bytes = self.encoder.encode(&audio)?;
                Ok(EncodedAudio {
                    bytes,
                    content_type: self.encoder.content_type(),
                    duration_secs: audio.duration_secs(),
                    sample_rate: audio.sample_rate,
                })
            });

        match result {
            Ok(encoded) => {
                info!(
                    %mode,
                    duration_s = encoded.duration_secs,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Generation complete"
                );
                self.status.success(&format!(
                    "Generated {:.1}s of {mode} audio",
                    encoded.duration_secs
                ));
                Ok(encoded)
            }
            Err(err) => {
                warn!(%mode, error = %err, "Generation failed");
                self.status.error(&format!("Generation failed: {err}"));
                Err(err.into())
            }
        }
    }

    /// Validate `request` and prepare a streaming session for it.
    pub fn open_stream(&self, request: GenerationRequest) -> Result<StreamSession, ValidationError> {
        request.validate()?;
        Ok(StreamSession::new(
            request,
            self.stream,
            self.gate.clone(),
            Arc::clone(&self.generator),
            Arc::clone(&self.encoder),
        ))
    }

    pub const fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeneratedAudio, ModelSize, VoiceParams};
    use crate::error::{CodecError, GenerationError};
    use crate::ports::MockSpeechGenerator;
    use crate::status::{StatusBus, StatusKind};
    use std::time::Duration;

    struct FixedEncoder;

    impl AudioEncoder for FixedEncoder {
        fn encode(&self, _audio: &GeneratedAudio) -> Result<Vec<u8>, CodecError> {
            Ok(b"WAVE".to_vec())
        }

        fn content_type(&self) -> &'static str {
            "audio/wav"
        }
    }

    fn service(generator: MockSpeechGenerator, bus: &StatusBus) -> SpeechService {
        SpeechService::new(SpeechDeps {
            gate: ConcurrencyGate::new(1, Some(Duration::from_secs(5))),
            generator: Arc::new(generator),
            encoder: Arc::new(FixedEncoder),
            status: Arc::new(bus.clone()),
            stream: StreamConfig {
                segment_chars: 100,
                deadline: Deadline::Unbounded,
            },
        })
    }

    fn custom(speaker: &str) -> GenerationRequest {
        GenerationRequest::new(
            "Good morning.",
            VoiceParams::CustomVoice {
                speaker: speaker.into(),
                instruct: Some("cheerful".into()),
                model_size: ModelSize::Small,
            },
        )
    }

    #[tokio::test]
    async fn test_synthesize_returns_encoded_audio() {
        let mut generator = MockSpeechGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Ok(GeneratedAudio::new(vec![0.1; 48_000], 24_000)));
        let bus = StatusBus::new(Duration::from_secs(15));
        let svc = service(generator, &bus);

        let encoded = svc.synthesize(custom("Ryan")).await.unwrap();

        assert_eq!(encoded.bytes, b"WAVE");
        assert_eq!(encoded.content_type, "audio/wav");
        assert_eq!(encoded.sample_rate, 24_000);
        assert!((encoded.duration_secs - 2.0).abs() < 1e-9);
        assert_eq!(bus.current().unwrap().kind, StatusKind::Success);
    }

    #[tokio::test]
    async fn test_validation_happens_before_generation() {
        let mut generator = MockSpeechGenerator::new();
        generator.expect_generate().times(0);
        let bus = StatusBus::new(Duration::from_secs(15));
        let svc = service(generator, &bus);

        let err = svc.synthesize(custom("Nobody")).await.unwrap_err();

        assert_eq!(
            err,
            SpeechError::Validation(ValidationError::InvalidSpeaker("Nobody".into()))
        );
        assert!(bus.current().is_none());
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let mut generator = MockSpeechGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(GenerationError::Failed("CUDA out of memory".into())));
        let bus = StatusBus::new(Duration::from_secs(15));
        let svc = service(generator, &bus);

        let err = svc.synthesize(custom("Vivian")).await.unwrap_err();

        assert_eq!(
            err,
            SpeechError::Generation(GenerationError::Failed("CUDA out of memory".into()))
        );
        let status = bus.current().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.message, "Generation failed: CUDA out of memory");
        assert_eq!(svc.gate().available(), 1);
    }

    #[test]
    fn test_open_stream_validates() {
        let bus = StatusBus::new(Duration::from_secs(15));
        let svc = service(MockSpeechGenerator::new(), &bus);

        let err = svc.open_stream(custom("Ryan").with_text(" ")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyText);

        let session = svc.open_stream(custom("Ryan")).unwrap();
        assert_eq!(session.total(), 1);
    }
}
