//! PCM buffer operations for the merge step
//!
//! Segments arrive as WAV files from the provider; they are decoded to
//! mono f32 at the output sample rate so that concatenation and duration
//! math stay exact regardless of what the provider actually returned.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

use crate::PipelineError;

/// Mono PCM buffer at a fixed sample rate
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create an empty buffer
    pub fn empty(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    /// Decode a WAV file, downmix to mono, and resample to `target_rate`
    pub fn from_wav_file(path: &Path, target_rate: u32) -> Result<Self, PipelineError> {
        let mut reader = WavReader::open(path).map_err(|e| {
            PipelineError::Encoding(format!("failed to open {}: {}", path.display(), e))
        })?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(PipelineError::Encoding(format!(
                "{}: zero channels",
                path.display()
            )));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => {
                let samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
                samples.map_err(|e| {
                    PipelineError::Encoding(format!("failed to decode {}: {}", path.display(), e))
                })?
            }
            SampleFormat::Int => {
                let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                let samples: Result<Vec<f32>, _> = reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max))
                    .collect();
                samples.map_err(|e| {
                    PipelineError::Encoding(format!("failed to decode {}: {}", path.display(), e))
                })?
            }
        };

        let mono = downmix(&interleaved, channels);
        let samples = if spec.sample_rate == target_rate {
            mono
        } else {
            resample_linear(&mono, spec.sample_rate, target_rate)
        };

        Ok(Self {
            samples,
            sample_rate: target_rate,
        })
    }

    /// Duration of the buffered audio in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append another buffer. Both sides carry the same sample rate by
    /// construction (`from_wav_file` always resamples to the target rate).
    pub fn append(&mut self, other: &AudioBuffer) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Append `ms` milliseconds of silence
    pub fn append_silence(&mut self, ms: u64) {
        let count = (ms * self.sample_rate as u64 / 1000) as usize;
        self.samples.extend(std::iter::repeat(0.0f32).take(count));
    }

    /// Write the buffer as 16-bit mono WAV
    pub fn write_wav(&self, path: &Path) -> Result<(), PipelineError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).map_err(|e| {
            PipelineError::Encoding(format!("failed to create {}: {}", path.display(), e))
        })?;

        for &sample in &self.samples {
            let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(scaled).map_err(|e| {
                PipelineError::Encoding(format!("failed to write {}: {}", path.display(), e))
            })?;
        }

        writer.finalize().map_err(|e| {
            PipelineError::Encoding(format!("failed to finalize {}: {}", path.display(), e))
        })
    }
}

/// Average interleaved channels down to mono
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampler
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if samples.is_empty() || from_rate == to_rate {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).round() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let a = samples[idx.min(samples.len() - 1)];
        let b = samples[(idx + 1).min(samples.len() - 1)];
        out.push(a + (b - a) * frac);
    }
    out
}
