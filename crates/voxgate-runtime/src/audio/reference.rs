//! Reference clip preparation for voice cloning.
//!
//! Decoded uploads are normalised into the shape the generator expects:
//! mono, finite, 24 kHz and within `[-1.0, 1.0]`.

use rubato::{FftFixedIn, Resampler as _};
use voxgate_core::{CodecError, DecodedAudio, ReferenceAudio};

/// Sample rate every reference clip is resampled to.
pub const REFERENCE_SAMPLE_RATE: u32 = 24_000;

const RESAMPLE_CHUNK: usize = 1024;

/// Turn a decoded upload into a generator-ready [`ReferenceAudio`].
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the clip holds no samples or the
/// resampler rejects the input rate.
pub fn prepare_reference(audio: DecodedAudio) -> Result<ReferenceAudio, CodecError> {
    if audio.sample_rate == 0 {
        return Err(CodecError::Decode("reference audio has no sample rate".to_string()));
    }

    let mut samples = downmix(&audio.samples, audio.channels);
    if samples.is_empty() {
        return Err(CodecError::Decode("reference audio contains no samples".to_string()));
    }

    for sample in &mut samples {
        if !sample.is_finite() {
            *sample = 0.0;
        }
    }

    if audio.sample_rate != REFERENCE_SAMPLE_RATE {
        samples = resample(&samples, audio.sample_rate, REFERENCE_SAMPLE_RATE)?;
    }

    let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    if peak > 1.0 {
        for sample in &mut samples {
            *sample /= peak;
        }
    }
    for sample in &mut samples {
        *sample = sample.clamp(-1.0, 1.0);
    }

    Ok(ReferenceAudio::new(samples, REFERENCE_SAMPLE_RATE))
}

/// Average interleaved channels into one.
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, CodecError> {
    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .map_err(resample_err)?;

    let mut output = Vec::with_capacity(samples.len() * to_rate as usize / from_rate as usize + 1);

    let mut chunks = samples.chunks_exact(RESAMPLE_CHUNK);
    for chunk in chunks.by_ref() {
        let result = resampler
            .process(&[chunk], None)
            .map_err(resample_err)?;
        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    let remaining = chunks.remainder();
    if !remaining.is_empty() {
        let mut padded = vec![0.0_f32; RESAMPLE_CHUNK];
        padded[..remaining.len()].copy_from_slice(remaining);

        let result = resampler
            .process(&[&padded], None)
            .map_err(resample_err)?;
        if let Some(channel) = result.first() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let wanted =
                (remaining.len() as f64 * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize;
            output.extend_from_slice(&channel[..wanted.min(channel.len())]);
        }
    }

    Ok(output)
}

fn resample_err(err: impl std::fmt::Display) -> CodecError {
    CodecError::Decode(format!("resampling failed: {err}"))
}
