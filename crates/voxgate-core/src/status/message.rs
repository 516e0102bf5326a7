//! Status message wire types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity/category of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Warning,
    Error,
    Progress,
    Success,
}

impl StatusKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Progress => "progress",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status update as delivered to observers.
///
/// Serializes as `{message, type, timestamp, progress?}` with `timestamp` in
/// fractional unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: StatusKind,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl StatusMessage {
    /// Build a message stamped with the current time.
    ///
    /// Progress is clamped to `0..=100`; non-finite values are dropped.
    pub fn new(message: impl Into<String>, kind: StatusKind, progress: Option<f64>) -> Self {
        let now = chrono::Utc::now();
        Self {
            message: message.into(),
            kind,
            timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
            progress: progress
                .filter(|p| p.is_finite())
                .map(|p| p.clamp(0.0, 100.0)),
        }
    }

    /// JSON payload for an event-stream `data:` line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One item of a live status stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusFrame {
    Message(StatusMessage),
    /// Nothing was published within the keep-alive window.
    KeepAlive,
}
