//! Audio decoding and preparation for Whisper inference

pub mod vad;

use std::path::Path;

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::error::{AudioError, Result};

pub use vad::{suppress_silence, VadConfig, VoiceActivityDetector};

/// Sample rate expected by Whisper models (Hz)
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decoded audio at its source sample rate
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Source sample rate (Hz)
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Duration of the source audio in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples at the Whisper input rate, resampling when needed
    pub fn into_whisper_input(self) -> Result<Vec<f32>> {
        if self.sample_rate == WHISPER_SAMPLE_RATE {
            return Ok(self.samples);
        }
        resample(&self.samples, self.sample_rate, WHISPER_SAMPLE_RATE)
    }
}

/// Decode a WAV file into normalized mono samples
pub fn load_wav(path: &Path) -> Result<DecodedAudio> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| AudioError::Open(e.to_string()))?;

    let spec = reader.spec();
    debug!(
        "WAV format: {} channels, {} Hz, {} bits",
        spec.channels, spec.sample_rate, spec.bits_per_sample
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
        hound::SampleFormat::Int => {
            if spec.bits_per_sample > 32 {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{} bits per sample",
                    spec.bits_per_sample
                ))
                .into());
            }
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    let mono = downmix(samples, spec.channels);
    if mono.is_empty() {
        return Err(AudioError::Empty.into());
    }

    debug!(
        "Loaded {} samples ({:.2}s)",
        mono.len(),
        mono.len() as f64 / spec.sample_rate as f64
    );

    Ok(DecodedAudio {
        samples: mono,
        sample_rate: spec.sample_rate,
    })
}

/// Average interleaved channels down to mono
fn downmix(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono audio between sample rates
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>> {
    if from == to {
        return Ok(samples.to_vec());
    }

    debug!("Resampling {} Hz -> {} Hz", from, to);

    let mut resampler = FftFixedIn::<f32>::new(
        from as usize,
        to as usize,
        1024, // chunk size
        1,    // sub-chunks
        1,    // channels
    )
    .map_err(|e| AudioError::Resampling(e.to_string()))?;

    let chunk_size = resampler.input_frames_next();

    // Pad the tail so the final partial chunk is not dropped
    let mut padded = samples.to_vec();
    let remainder = padded.len() % chunk_size;
    if remainder != 0 {
        padded.resize(padded.len() + chunk_size - remainder, 0.0);
    }

    let expected = (samples.len() as u64 * to as u64 / from as u64) as usize;
    let mut output = Vec::with_capacity(expected + chunk_size);

    for chunk in padded.chunks(chunk_size) {
        let processed = resampler
            .process(&[chunk.to_vec()], None)
            .map_err(|e| AudioError::Resampling(e.to_string()))?;

        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }
    }

    output.truncate(expected);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let interleaved = vec![0.2, 0.4, -0.2, -0.4];
        let mono = downmix(interleaved, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(samples.clone(), 1), samples);
    }

    #[test]
    fn test_duration() {
        let audio = DecodedAudio {
            samples: vec![0.0; 32_000],
            sample_rate: 16_000,
        };
        assert!((audio.duration_secs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.5; 1000];
        let out = resample(&samples, 16_000, 16_000).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples = vec![0.1; 32_000];
        let out = resample(&samples, 32_000, 16_000).unwrap();
        // Allow some tolerance for resampler flushing
        assert!(
            out.len() > 14_000 && out.len() <= 16_000,
            "Expected ~16000 samples, got {}",
            out.len()
        );
    }
}
