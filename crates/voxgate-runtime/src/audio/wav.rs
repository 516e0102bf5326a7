//! WAV encoding and decoding via `hound`.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use voxgate_core::{AudioDecoder, AudioEncoder, CodecError, DecodedAudio, GeneratedAudio};

/// Sample encoding used when writing WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavFormat {
    /// 16-bit signed PCM. What clients expect from the HTTP endpoints.
    #[default]
    Pcm16,
    /// 32-bit IEEE float. Lossless for buffers passed to the generator.
    Float32,
}

/// Mono WAV encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder {
    format: WavFormat,
}

impl WavEncoder {
    pub const fn new(format: WavFormat) -> Self {
        Self { format }
    }

    /// Encode raw mono samples.
    pub fn encode_samples(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
        if sample_rate == 0 {
            return Err(CodecError::Encode("sample rate must be positive".to_string()));
        }

        let spec = match self.format {
            WavFormat::Pcm16 => WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            WavFormat::Float32 => WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
        };

        let mut buffer = Cursor::new(Vec::with_capacity(44 + samples.len() * 4));
        let mut writer =
            WavWriter::new(&mut buffer, spec).map_err(|e| CodecError::Encode(e.to_string()))?;

        for &sample in samples {
            let sample = if sample.is_finite() { sample } else { 0.0 };
            let written = match self.format {
                WavFormat::Pcm16 => {
                    #[allow(clippy::cast_possible_truncation)]
                    let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                    writer.write_sample(value)
                }
                WavFormat::Float32 => writer.write_sample(sample),
            };
            written.map_err(|e| CodecError::Encode(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, audio: &GeneratedAudio) -> Result<Vec<u8>, CodecError> {
        self.encode_samples(&audio.samples, audio.sample_rate)
    }

    fn content_type(&self) -> &'static str {
        "audio/wav"
    }
}

/// WAV decoder; the primary path of [`super::FallbackDecoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    pub const fn new() -> Self {
        Self
    }

    /// Decode an in-memory WAV file.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedAudio, CodecError> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(to_decode_error)?;
        read_samples(reader)
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError> {
        let reader = WavReader::open(path).map_err(to_decode_error)?;
        read_samples(reader)
    }
}

fn to_decode_error(err: hound::Error) -> CodecError {
    match err {
        hound::Error::IoError(io) => CodecError::Io(io),
        other => CodecError::Decode(other.to_string()),
    }
}

fn read_samples<R: Read + Seek>(mut reader: WavReader<R>) -> Result<DecodedAudio, CodecError> {
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(to_decode_error)?
        }
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(to_decode_error)?,
    };

    Ok(DecodedAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}
