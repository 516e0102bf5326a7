//! HTTP handlers, one module per resource.

pub mod audio;
pub mod custom_voice;
pub mod status;
pub mod voice_clone;
pub mod voice_design;

/// Rendered segments a session may buffer ahead of a slow client.
pub(crate) const STREAM_BUFFER: usize = 1;
