//! Audio codecs and reference clip preparation.

mod fallback;
mod ffmpeg;
mod reference;
mod wav;

pub use fallback::FallbackDecoder;
pub use ffmpeg::FfmpegDecoder;
pub(crate) use ffmpeg::last_line;
pub use reference::{REFERENCE_SAMPLE_RATE, prepare_reference};
pub use wav::{WavDecoder, WavEncoder, WavFormat};
