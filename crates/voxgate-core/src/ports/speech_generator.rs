//! Generation backend port.

use crate::domain::{GeneratedAudio, GenerationRequest};
use crate::error::GenerationError;

/// A speech generation backend.
///
/// Calls are synchronous and may take seconds to minutes. Callers never invoke
/// this directly on an async task; it is driven through
/// [`crate::inference::ConcurrencyGate`], which moves the call onto the
/// blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechGenerator: Send + Sync {
    /// Render `request.text` with the request's voice parameters.
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedAudio, GenerationError>;
}
