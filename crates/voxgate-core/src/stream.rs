//! Segment-by-segment streaming of one generation request.
//!
//! A [`StreamSession`] splits the request text into segments and renders them
//! strictly in order, emitting one [`StreamEvent`] per segment. The first
//! failure emits a single error event and ends the session. A client
//! disconnect (cancelled token or dropped receiver) is checked between
//! segments; a segment already running finishes and its result is discarded.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::GenerationRequest;
use crate::error::GenerationError;
use crate::inference::{ConcurrencyGate, Deadline};
use crate::ports::{AudioEncoder, SpeechGenerator};
use crate::settings::InferenceSettings;
use crate::text::segment_text;

/// One wire event of a generation stream.
///
/// Serializes to `{index, total, audio}` or `{index, total, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Audio {
        index: usize,
        total: usize,
        /// Base64 of the encoded container bytes.
        audio: String,
    },
    Error {
        index: usize,
        total: usize,
        error: String,
    },
}

impl StreamEvent {
    pub fn audio(index: usize, total: usize, bytes: &[u8]) -> Self {
        Self::Audio {
            index,
            total,
            audio: BASE64.encode(bytes),
        }
    }

    pub fn failure(index: usize, total: usize, err: &GenerationError) -> Self {
        Self::Error {
            index,
            total,
            error: format!("Generation failed: {err}"),
        }
    }

    pub const fn index(&self) -> usize {
        match self {
            Self::Audio { index, .. } | Self::Error { index, .. } => *index,
        }
    }

    pub const fn total(&self) -> usize {
        match self {
            Self::Audio { total, .. } | Self::Error { total, .. } => *total,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// JSON payload for an event-stream `data:` line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Lifecycle of a session. The last three variants are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Segmenting,
    Running { next_index: usize },
    Completed,
    /// The client went away before segment `at_index` was delivered.
    Aborted { at_index: usize },
    Failed { index: usize, error: GenerationError },
}

impl SessionState {
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Aborted { .. } | Self::Failed { .. }
        )
    }
}

/// Streaming knobs taken from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub segment_chars: usize,
    pub deadline: Deadline,
}

impl StreamConfig {
    pub const fn from_settings(settings: &InferenceSettings) -> Self {
        Self {
            segment_chars: settings.stream_segment_chars,
            deadline: Deadline::from_limit(settings.stream_request_timeout),
        }
    }
}

/// A running session's event receiver plus the means to stop it.
#[derive(Debug)]
pub struct StreamHandle {
    pub events: mpsc::Receiver<StreamEvent>,
    /// Cancel to signal a client disconnect.
    pub cancel: CancellationToken,
    pub task: JoinHandle<SessionState>,
}

/// Orchestrates one streaming request.
pub struct StreamSession {
    id: Uuid,
    request: GenerationRequest,
    segments: Vec<String>,
    state: SessionState,
    deadline: Deadline,
    gate: ConcurrencyGate,
    generator: Arc<dyn SpeechGenerator>,
    encoder: Arc<dyn AudioEncoder>,
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("total", &self.segments.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl StreamSession {
    /// Segment `request` and prepare the session.
    ///
    /// If segmentation yields nothing the raw text is used as the only segment.
    pub fn new(
        request: GenerationRequest,
        config: StreamConfig,
        gate: ConcurrencyGate,
        generator: Arc<dyn SpeechGenerator>,
        encoder: Arc<dyn AudioEncoder>,
    ) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            segments: Vec::new(),
            state: SessionState::Segmenting,
            deadline: config.deadline,
            request,
            gate,
            generator,
            encoder,
        };

        let mut segments = segment_text(&session.request.text, config.segment_chars);
        if segments.is_empty() {
            segments.push(session.request.text.clone());
        }
        session.segments = segments;
        session.state = SessionState::Running { next_index: 0 };
        session
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn total(&self) -> usize {
        self.segments.len()
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the session on its own task.
    ///
    /// `buffer` bounds how many rendered segments may wait for the client.
    pub fn spawn(self, buffer: usize) -> StreamHandle {
        let (tx, events) = mpsc::channel(buffer.max(1));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(tx, cancel.clone()));
        StreamHandle {
            events,
            cancel,
            task,
        }
    }

    /// Render every segment in order, sending one event per segment.
    ///
    /// Returns the terminal state.
    pub async fn run(
        mut self,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> SessionState {
        let segments = std::mem::take(&mut self.segments);
        let total = segments.len();

        info!(
            session_id = %self.id,
            mode = %self.request.mode(),
            total,
            "Stream session started"
        );

        for (index, text) in segments.into_iter().enumerate() {
            self.state = SessionState::Running { next_index: index };

            if cancel.is_cancelled() || events.is_closed() {
                return self.abort(index);
            }

            let segment_request = self.request.with_text(text);
            let generator = Arc::clone(&self.generator);
            let generated = self
                .gate
                .run(self.deadline, move || generator.generate(&segment_request))
                .await;

            if cancel.is_cancelled() || events.is_closed() {
                debug!(session_id = %self.id, index, "Discarding segment after disconnect");
                return self.abort(index);
            }

            let encoded = generated.and_then(|audio| {
                audio.ensure_valid()?;
                self.encoder.encode(&audio).map_err(GenerationError::from)
            });

            match encoded {
                Ok(bytes) => {
                    debug!(session_id = %self.id, index, total, bytes = bytes.len(), "Segment ready");
                    if events
                        .send(StreamEvent::audio(index, total, &bytes))
                        .await
                        .is_err()
                    {
                        return self.abort(index);
                    }
                }
                Err(error) => {
                    warn!(session_id = %self.id, index, total, %error, "Segment failed");
                    let _ = events.send(StreamEvent::failure(index, total, &error)).await;
                    self.state = SessionState::Failed { index, error };
                    return self.state;
                }
            }
        }

        info!(session_id = %self.id, total, "Stream session completed");
        self.state = SessionState::Completed;
        self.state
    }

    fn abort(mut self, at_index: usize) -> SessionState {
        debug!(session_id = %self.id, at_index, "Client disconnected; stream aborted");
        self.state = SessionState::Aborted { at_index };
        self.state
    }
}
