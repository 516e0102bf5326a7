//! Inference settings and validation.
//!
//! Values come from environment variables (a `.env` file is loaded by the
//! binary before this runs). Parsing goes through an injectable lookup so the
//! rules can be tested without touching the process environment.

use std::str::FromStr;
use std::time::Duration;

use crate::inference::Deadline;

/// Default number of generation calls allowed to run at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

/// Default deadline for blocking generation requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_S: i64 = 300;

/// Default deadline for each streamed segment, in seconds.
pub const DEFAULT_STREAM_REQUEST_TIMEOUT_S: i64 = 120;

/// Default maximum characters per streamed segment.
pub const DEFAULT_STREAM_SEGMENT_CHARS: usize = 200;

/// Default idle interval before a status stream sends a keep-alive.
pub const DEFAULT_STATUS_KEEPALIVE_S: u64 = 15;

/// Runtime limits for generation and streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceSettings {
    /// Maximum concurrent generation calls (`MAX_CONCURRENCY`).
    pub max_concurrency: usize,

    /// Deadline for blocking requests (`REQUEST_TIMEOUT_S`, `<= 0` disables).
    pub request_timeout: Option<Duration>,

    /// Deadline per streamed segment (`STREAM_REQUEST_TIMEOUT_S`, `<= 0` disables).
    pub stream_request_timeout: Option<Duration>,

    /// Segment length for streaming (`STREAM_SEGMENT_CHARS`).
    pub stream_segment_chars: usize,

    /// Idle window before a status keep-alive (`STATUS_KEEPALIVE_S`).
    pub status_keepalive: Duration,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: seconds(DEFAULT_REQUEST_TIMEOUT_S),
            stream_request_timeout: seconds(DEFAULT_STREAM_REQUEST_TIMEOUT_S),
            stream_segment_chars: DEFAULT_STREAM_SEGMENT_CHARS,
            status_keepalive: Duration::from_secs(DEFAULT_STATUS_KEEPALIVE_S),
        }
    }
}

impl InferenceSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let settings = Self {
            max_concurrency: parse_var(&lookup, "MAX_CONCURRENCY")?
                .unwrap_or(defaults.max_concurrency),
            request_timeout: parse_var::<i64, _>(&lookup, "REQUEST_TIMEOUT_S")?
                .map_or(defaults.request_timeout, seconds),
            stream_request_timeout: parse_var::<i64, _>(&lookup, "STREAM_REQUEST_TIMEOUT_S")?
                .map_or(defaults.stream_request_timeout, seconds),
            stream_segment_chars: parse_var(&lookup, "STREAM_SEGMENT_CHARS")?
                .unwrap_or(defaults.stream_segment_chars),
            status_keepalive: parse_var(&lookup, "STATUS_KEEPALIVE_S")?
                .map_or(defaults.status_keepalive, Duration::from_secs),
        };

        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} has an invalid value: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("MAX_CONCURRENCY must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("STREAM_SEGMENT_CHARS must be at least 1, got {0}")]
    InvalidSegmentChars(usize),

    #[error("STATUS_KEEPALIVE_S must be at least 1 second")]
    InvalidKeepAlive,
}

/// Validate settings values.
pub fn validate_settings(settings: &InferenceSettings) -> Result<(), SettingsError> {
    if settings.max_concurrency == 0 {
        return Err(SettingsError::InvalidConcurrency(settings.max_concurrency));
    }

    if settings.stream_segment_chars == 0 {
        return Err(SettingsError::InvalidSegmentChars(
            settings.stream_segment_chars,
        ));
    }

    if settings.status_keepalive < Duration::from_secs(1) {
        return Err(SettingsError::InvalidKeepAlive);
    }

    Ok(())
}

/// Convert a seconds value where `<= 0` means "no limit".
fn seconds(secs: i64) -> Option<Duration> {
    Deadline::from_secs(secs).resolve(None)
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| SettingsError::InvalidValue { name, value: raw })
}
