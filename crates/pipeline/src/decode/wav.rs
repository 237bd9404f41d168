//! Plain WAV decode via hound
//!
//! Sits after ffmpeg in the ladder so WAV files still decode on hosts
//! without an ffmpeg binary.

use std::io::Cursor;

use anuvaad_core::{MediaAsset, PipelineError, Result, Waveform, SAMPLE_RATE};
use async_trait::async_trait;

use super::DecodeBackend;

pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WavDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecodeBackend for WavDecoder {
    fn name(&self) -> &'static str {
        "wav"
    }

    async fn decode(&self, asset: &MediaAsset) -> Result<Waveform> {
        let data = tokio::fs::read(asset.path()).await?;
        decode_wav_bytes(&data)
    }
}

fn decode_wav_bytes(data: &[u8]) -> Result<Waveform> {
    let mut reader =
        hound::WavReader::new(Cursor::new(data)).map_err(|e| PipelineError::Backend {
            backend: "wav",
            message: format!("open: {}", e),
        })?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PipelineError::Backend {
                backend: "wav",
                message: format!("read: {}", e),
            })?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| PipelineError::Backend {
                    backend: "wav",
                    message: format!("read: {}", e),
                })?
        }
    };

    if samples.is_empty() {
        return Err(PipelineError::Backend {
            backend: "wav",
            message: "no audio samples decoded".to_string(),
        });
    }

    let wave = Waveform::from_interleaved(&samples, spec.channels as usize, spec.sample_rate);
    Ok(wave.resample(SAMPLE_RATE))
}
