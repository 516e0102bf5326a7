//! Status emitter trait for out-of-band progress reporting.
//!
//! Backends and services report what they are doing through this port.
//! Implementations decide how the message reaches observers.

use crate::status::StatusKind;

/// Trait for emitting status messages.
///
/// # Implementations
///
/// - `NoopStatusEmitter` - For tests and contexts without observers
/// - [`crate::status::StatusPublisher`] - Hands messages to the status bus
///
/// Emission is fire-and-forget: implementations must not block and must not
/// fail, and the methods are safe to call from blocking worker threads.
pub trait StatusEmitter: Send + Sync {
    /// Emit a status message.
    fn emit(&self, message: &str, kind: StatusKind, progress: Option<f64>);

    fn info(&self, message: &str) {
        self.emit(message, StatusKind::Info, None);
    }

    fn warning(&self, message: &str) {
        self.emit(message, StatusKind::Warning, None);
    }

    fn error(&self, message: &str) {
        self.emit(message, StatusKind::Error, None);
    }

    fn progress(&self, message: &str, percent: f64) {
        self.emit(message, StatusKind::Progress, Some(percent));
    }

    fn success(&self, message: &str) {
        self.emit(message, StatusKind::Success, None);
    }
}

/// A status emitter that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatusEmitter;

impl NoopStatusEmitter {
    /// Create a new no-op emitter.
    pub const fn new() -> Self {
        Self
    }
}

impl StatusEmitter for NoopStatusEmitter {
    fn emit(&self, _message: &str, _kind: StatusKind, _progress: Option<f64>) {
        // Intentionally do nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, StatusKind, Option<f64>)>>);

    impl StatusEmitter for Recorder {
        fn emit(&self, message: &str, kind: StatusKind, progress: Option<f64>) {
            self.0
                .lock()
                .unwrap()
                .push((message.to_string(), kind, progress));
        }
    }

    #[test]
    fn test_noop_emitter() {
        let emitter = NoopStatusEmitter::new();

        // Should not panic
        emitter.info("loading");
        emitter.progress("loading", 50.0);
    }

    #[test]
    fn test_helpers_forward_kind() {
        let recorder = Arc::new(Recorder::default());
        let emitter: Arc<dyn StatusEmitter> = recorder.clone();

        emitter.warning("slow");
        emitter.progress("half", 50.0);
        emitter.success("done");

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen[0], ("slow".to_string(), StatusKind::Warning, None));
        assert_eq!(seen[1], ("half".to_string(), StatusKind::Progress, Some(50.0)));
        assert_eq!(seen[2], ("done".to_string(), StatusKind::Success, None));
    }
}
