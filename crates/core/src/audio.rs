//! Audio waveform types and utilities
//!
//! Every decoder in the pipeline funnels into [`Waveform`]: mono f32
//! samples normalized to [-1.0, 1.0] at the pipeline rate of 16 kHz.
//! Recognizers, the chunker, and gender estimation all assume that shape.

use crate::error::{PipelineError, Result};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline-wide sample rate (Hz). Recognition services expect 16 kHz mono.
pub const SAMPLE_RATE: u32 = 16_000;

/// Audio container extensions the pipeline accepts
pub const AUDIO_EXTENSIONS: [&str; 5] = ["wav", "mp3", "m4a", "flac", "ogg"];

/// Video container extensions the pipeline accepts (audio track is extracted)
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

const PCM16_NORMALIZE: f32 = 32768.0;
const PCM16_SCALE: f32 = 32767.0;

/// Mono audio at a single sample rate
///
/// Internally stores samples as f32 for processing efficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a waveform from mono f32 samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0);
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a waveform from interleaved multi-channel samples,
    /// downmixing to mono by averaging channels
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Self {
        if channels <= 1 {
            return Self::new(samples.to_vec(), sample_rate);
        }
        let mono = samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::new(mono, sample_rate)
    }

    /// Convert from PCM16 bytes (little-endian)
    pub fn from_pcm16(bytes: &[u8], sample_rate: u32) -> Self {
        let samples: Vec<f32> = bytes
            .chunks_exact(2)
            .map(|chunk| {
                let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
                sample as f32 / PCM16_NORMALIZE
            })
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Convert to PCM16 bytes (little-endian)
    pub fn to_pcm16(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|&sample| {
                let clamped = sample.clamp(-1.0, 1.0);
                let pcm16 = (clamped * PCM16_SCALE) as i16;
                pcm16.to_le_bytes()
            })
            .collect()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy out the span between two points in time.
    ///
    /// Bounds are clamped to the waveform, so a window that runs past the
    /// end yields whatever audio remains instead of panicking.
    pub fn slice_seconds(&self, start_secs: f64, end_secs: f64) -> Waveform {
        let start = ((start_secs * self.sample_rate as f64) as usize).min(self.samples.len());
        let end = ((end_secs * self.sample_rate as f64) as usize).clamp(start, self.samples.len());
        Waveform::new(self.samples[start..end].to_vec(), self.sample_rate)
    }

    /// Encode as a 16-bit PCM WAV file in memory
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| PipelineError::Backend {
                backend: "wav-encode",
                message: e.to_string(),
            })?;
        for &sample in &self.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * PCM16_SCALE) as i16)
                .map_err(|e| PipelineError::Backend {
                    backend: "wav-encode",
                    message: e.to_string(),
                })?;
        }
        writer.finalize().map_err(|e| PipelineError::Backend {
            backend: "wav-encode",
            message: e.to_string(),
        })?;
        Ok(cursor.into_inner())
    }

    /// High-quality resampling using Rubato's FFT resampler.
    ///
    /// Falls back to linear interpolation for very short inputs or if
    /// Rubato fails.
    pub fn resample(&self, target_rate: u32) -> Waveform {
        use rubato::{FftFixedIn, Resampler};

        if self.sample_rate == target_rate || self.samples.is_empty() {
            return Waveform::new(self.samples.clone(), target_rate);
        }

        // For very short inputs, use linear fallback
        if self.samples.len() < 64 {
            return self.resample_linear(target_rate);
        }

        const CHUNK: usize = 1024;

        let mut resampler = match FftFixedIn::<f64>::new(
            self.sample_rate as usize,
            target_rate as usize,
            CHUNK,
            2,
            1,
        ) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Rubato init failed, using linear fallback: {}", e);
                return self.resample_linear(target_rate);
            }
        };

        // Zero-pad the tail so the final partial chunk still fits the
        // fixed input size, then trim the output back to length.
        let mut input: Vec<f64> = self.samples.iter().map(|&s| s as f64).collect();
        let pad = (CHUNK - input.len() % CHUNK) % CHUNK;
        input.extend(std::iter::repeat(0.0).take(pad));

        let ratio = target_rate as f64 / self.sample_rate as f64;
        let mut output: Vec<f32> =
            Vec::with_capacity((self.samples.len() as f64 * ratio) as usize + CHUNK);

        for chunk in input.chunks(CHUNK) {
            let frames = vec![chunk.to_vec()];
            match resampler.process(&frames, None) {
                Ok(mut out) => {
                    output.extend(out.remove(0).into_iter().map(|s| s as f32));
                }
                Err(e) => {
                    tracing::warn!("Rubato processing failed, using linear fallback: {}", e);
                    return self.resample_linear(target_rate);
                }
            }
        }

        let expected = (self.samples.len() as f64 * ratio).round() as usize;
        output.truncate(expected);

        Waveform::new(output, target_rate)
    }

    /// Linear interpolation fallback for edge cases
    fn resample_linear(&self, target_rate: u32) -> Waveform {
        let ratio = target_rate as f64 / self.sample_rate as f64;
        let new_len = (self.samples.len() as f64 * ratio) as usize;

        let mut resampled = Vec::with_capacity(new_len);
        for i in 0..new_len {
            let src_idx = i as f64 / ratio;
            let idx_floor = src_idx.floor() as usize;
            let idx_ceil = (idx_floor + 1).min(self.samples.len().saturating_sub(1));
            let frac = src_idx - idx_floor as f64;

            let sample = self.samples[idx_floor] * (1.0 - frac as f32)
                + self.samples[idx_ceil] * frac as f32;
            resampled.push(sample);
        }

        Waveform::new(resampled, target_rate)
    }
}

/// An input file on disk together with its format hint
#[derive(Debug, Clone)]
pub struct MediaAsset {
    path: PathBuf,
    extension: Option<String>,
}

impl MediaAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        Self { path, extension }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase file extension, if the path has one
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// File stem used to derive output names
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio")
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn is_audio(&self) -> bool {
        matches!(self.extension(), Some(ext) if AUDIO_EXTENSIONS.contains(&ext))
    }

    pub fn is_video(&self) -> bool {
        matches!(self.extension(), Some(ext) if VIDEO_EXTENSIONS.contains(&ext))
    }

    /// True when the extension is one the pipeline accepts at all
    pub fn is_supported(&self) -> bool {
        self.is_audio() || self.is_video()
    }
}

/// Voice gender used for synthesis voice selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Male,
    Female,
}

impl VoiceGender {
    /// Parse a form-field value, defaulting to male for anything unrecognized
    pub fn from_str_loose(s: &str) -> VoiceGender {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => VoiceGender::Female,
            _ => VoiceGender::Male,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Male => "male",
            VoiceGender::Female => "female",
        }
    }
}

/// A synthesized audio file written to disk
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub path: PathBuf,
    pub language: Language,
    pub gender: VoiceGender,
    /// Which synthesis backend produced the file
    pub backend: &'static str,
}
