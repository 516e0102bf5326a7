//! Speech generation through an external process.
//!
//! Each call spawns the configured command, writes the request to its stdin
//! and reads a WAV file back from stdout. See [`super::protocol`] for the
//! message formats.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};
use voxgate_core::{GeneratedAudio, GenerationError, GenerationRequest, SpeechGenerator, StatusEmitter};

use super::protocol::{WireRequest, parse_status_line};
use crate::audio::{WavDecoder, last_line};

// ============================================================================
// Configuration
// ============================================================================

/// Program and arguments used to launch the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Generator
// ============================================================================

/// [`SpeechGenerator`] backed by one child process per call.
///
/// Status lines the process prints on stderr are forwarded to the
/// configured [`StatusEmitter`] while it runs.
pub struct CommandGenerator {
    spec: CommandSpec,
    status: Arc<dyn StatusEmitter>,
}

impl CommandGenerator {
    pub fn new(spec: CommandSpec, status: Arc<dyn StatusEmitter>) -> Self {
        Self { spec, status }
    }
}

impl SpeechGenerator for CommandGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedAudio, GenerationError> {
        let payload = serde_json::to_vec(&WireRequest::from_request(request)?)
            .map_err(|e| GenerationError::Failed(format!("failed to serialize request: {e}")))?;

        debug!(
            program = %self.spec.program.display(),
            mode = %request.mode(),
            chars = request.text.chars().count(),
            "Spawning generator"
        );

        let mut child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                GenerationError::Failed(format!(
                    "failed to start generator '{}': {e}",
                    self.spec.program.display()
                ))
            })?;

        let (Some(mut stdin), Some(mut stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(GenerationError::Failed(
                "generator pipes were not captured".to_string(),
            ));
        };

        // Writes happen on their own thread so a child that fills stdout
        // before reading stdin cannot deadlock us.
        let writer = thread::spawn(move || stdin.write_all(&payload));

        let status = Arc::clone(&self.status);
        let diagnostics = thread::spawn(move || forward_stderr(stderr, status.as_ref()));

        let mut audio = Vec::new();
        let read = stdout.read_to_end(&mut audio);

        let exit = child
            .wait()
            .map_err(|e| GenerationError::Failed(format!("failed to wait for generator: {e}")))?;
        let last_diagnostic = diagnostics
            .join()
            .map_err(|_| GenerationError::Worker("stderr reader panicked".to_string()))?;

        if let Ok(Err(e)) = writer.join() {
            // The child may legitimately exit without consuming its input.
            debug!(error = %e, "Generator closed stdin early");
        }

        if !exit.success() {
            let reason = last_diagnostic.unwrap_or_else(|| match exit.code() {
                Some(code) => format!("generator exited with status {code}"),
                None => "generator was terminated by a signal".to_string(),
            });
            warn!(status = ?exit.code(), reason = %reason, "Generator failed");
            return Err(GenerationError::Failed(reason));
        }

        read.map_err(|e| GenerationError::Failed(format!("failed to read generator output: {e}")))?;
        if audio.is_empty() {
            return Err(GenerationError::Failed(
                "generator produced no audio".to_string(),
            ));
        }

        let decoded = WavDecoder::new()
            .decode_bytes(&audio)
            .map_err(|e| GenerationError::Failed(format!("generator returned invalid audio: {e}")))?;

        let channels = usize::from(decoded.channels.max(1));
        let samples = if channels == 1 {
            decoded.samples
        } else {
            decoded
                .samples
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(GeneratedAudio::new(samples, decoded.sample_rate))
    }
}

/// Forward status lines and return the last diagnostic line.
fn forward_stderr(stderr: impl Read, status: &dyn StatusEmitter) -> Option<String> {
    let mut last = None;
    for line in BufReader::new(stderr).lines() {
        let Ok(line) = line else { break };
        match parse_status_line(&line) {
            Some(report) => status.emit(&report.status, report.kind, report.progress),
            None => {
                if let Some(text) = last_line(&line) {
                    debug!(target: "voxgate_runtime::generator", "{text}");
                    last = Some(text.to_string());
                }
            }
        }
    }
    last
}
