//! Audio container ports.
//!
//! Implementations live in `voxgate-runtime`; core only needs bytes in and
//! samples out.

use std::path::Path;

use crate::domain::{DecodedAudio, GeneratedAudio};
use crate::error::CodecError;

/// Encodes generated samples into a transportable container.
pub trait AudioEncoder: Send + Sync {
    fn encode(&self, audio: &GeneratedAudio) -> Result<Vec<u8>, CodecError>;

    /// MIME type of the produced container.
    fn content_type(&self) -> &'static str;
}

/// Decodes an audio file from disk.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError>;
}
