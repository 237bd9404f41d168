//! Container-aware decode via symphonia
//!
//! Handles the common audio containers (wav, mp3, m4a, flac, ogg)
//! without shelling out. Video containers fall through to ffmpeg.

use std::io::Cursor;

use anuvaad_core::{MediaAsset, PipelineError, Result, Waveform, SAMPLE_RATE};
use async_trait::async_trait;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::DecodeBackend;

/// Symphonia decode rung
///
/// Runs twice in the default ladder: first with the file extension as a
/// format hint, and once more at the very end without any hint, which
/// rescues files whose extension lies about their contents.
pub struct SymphoniaDecoder {
    use_hint: bool,
}

impl SymphoniaDecoder {
    /// Probe with the file extension as a format hint
    pub fn hinted() -> Self {
        Self { use_hint: true }
    }

    /// Probe with no hint at all
    pub fn probed() -> Self {
        Self { use_hint: false }
    }
}

#[async_trait]
impl DecodeBackend for SymphoniaDecoder {
    fn name(&self) -> &'static str {
        if self.use_hint {
            "symphonia"
        } else {
            "symphonia-probe"
        }
    }

    async fn decode(&self, asset: &MediaAsset) -> Result<Waveform> {
        let data = tokio::fs::read(asset.path()).await?;
        let extension = if self.use_hint {
            asset.extension().map(|e| e.to_string())
        } else {
            None
        };
        decode_bytes(data, extension.as_deref(), self.name())
    }
}

/// Decode a whole in-memory file to a 16 kHz mono waveform
pub(crate) fn decode_bytes(
    data: Vec<u8>,
    extension: Option<&str>,
    backend: &'static str,
) -> Result<Waveform> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| PipelineError::Backend {
            backend,
            message: format!("probe: {}", e),
        })?;

    let mut format = probed.format;

    let track = format.default_track().ok_or_else(|| PipelineError::Backend {
        backend,
        message: "no audio track found".to_string(),
    })?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| PipelineError::Backend {
            backend,
            message: "unknown sample rate".to_string(),
        })?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &decoder_opts)
        .map_err(|e| PipelineError::Backend {
            backend,
            message: format!("codec: {}", e),
        })?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(PipelineError::Backend {
                    backend,
                    message: format!("packet: {}", e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(PipelineError::Backend {
                    backend,
                    message: format!("decode: {}", e),
                });
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        all_samples.extend_from_slice(sample_buf.samples());
    }

    if all_samples.is_empty() {
        return Err(PipelineError::Backend {
            backend,
            message: "no audio samples decoded".to_string(),
        });
    }

    let wave = Waveform::from_interleaved(&all_samples, channels, source_rate);
    Ok(wave.resample(SAMPLE_RATE))
}
