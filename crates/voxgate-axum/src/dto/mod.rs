//! Request bodies for the voice endpoints.

mod voice;

pub use voice::{CustomVoiceBody, VoiceCloneForm, VoiceDesignBody};
