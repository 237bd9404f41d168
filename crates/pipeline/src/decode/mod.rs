//! Audio normalization
//!
//! Turns any supported input file into a 16 kHz mono [`Waveform`] by
//! trying a fixed ladder of decode backends in order. A backend that
//! errors, or that produces implausibly little audio, hands the file to
//! the next rung; only when every rung has failed does the caller see an
//! error, carrying the whole attempt chain.

use anuvaad_config::Settings;
use anuvaad_core::{DecodeAttempt, MediaAsset, PipelineError, Result, Waveform};
use async_trait::async_trait;

mod ffmpeg;
mod symphonia;
mod wav;

pub use self::ffmpeg::FfmpegDecoder;
pub use self::symphonia::SymphoniaDecoder;
pub use self::wav::WavDecoder;

/// One rung of the decode ladder
#[async_trait]
pub trait DecodeBackend: Send + Sync {
    /// Backend name used in logs and failure chains
    fn name(&self) -> &'static str;

    /// Decode the asset into 16 kHz mono audio
    async fn decode(&self, asset: &MediaAsset) -> Result<Waveform>;
}

/// The default ladder: container-aware decode with the file's extension
/// as a hint, then ffmpeg for everything symphonia cannot open (notably
/// video containers), then plain WAV, then a last hint-free probe for
/// files with a lying extension.
pub fn default_backends() -> Vec<Box<dyn DecodeBackend>> {
    vec![
        Box::new(SymphoniaDecoder::hinted()),
        Box::new(FfmpegDecoder::new()),
        Box::new(WavDecoder::new()),
        Box::new(SymphoniaDecoder::probed()),
    ]
}

/// Decode ladder driver
pub struct AudioNormalizer {
    backends: Vec<Box<dyn DecodeBackend>>,
    /// Decoded PCM below this many bytes counts as a failed rung
    min_output_bytes: u64,
}

impl AudioNormalizer {
    pub fn new(backends: Vec<Box<dyn DecodeBackend>>, min_output_bytes: u64) -> Self {
        Self {
            backends,
            min_output_bytes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(default_backends(), settings.pipeline.min_decode_bytes)
    }

    /// Run the ladder until one backend yields plausible audio
    pub async fn normalize(&self, asset: &MediaAsset) -> Result<Waveform> {
        let mut attempts = Vec::new();

        for backend in &self.backends {
            match backend.decode(asset).await {
                Ok(wave) => {
                    // PCM16 is two bytes per sample
                    let pcm_bytes = (wave.len() * 2) as u64;
                    if pcm_bytes < self.min_output_bytes {
                        tracing::debug!(
                            backend = backend.name(),
                            bytes = pcm_bytes,
                            "decode output too small, trying next backend"
                        );
                        attempts.push(DecodeAttempt::new(
                            backend.name(),
                            format!("implausibly small output ({} bytes)", pcm_bytes),
                        ));
                        continue;
                    }
                    tracing::debug!(
                        backend = backend.name(),
                        seconds = wave.duration_secs(),
                        "decoded input"
                    );
                    return Ok(wave);
                }
                Err(err) => {
                    let message = match err {
                        PipelineError::Backend { message, .. } => message,
                        other => other.to_string(),
                    };
                    tracing::debug!(
                        backend = backend.name(),
                        error = %message,
                        "decode backend failed, trying next"
                    );
                    attempts.push(DecodeAttempt::new(backend.name(), message));
                }
            }
        }

        Err(PipelineError::Decode {
            path: asset.path().to_path_buf(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anuvaad_core::SAMPLE_RATE;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedBackend {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        result: fn() -> Result<Waveform>,
    }

    #[async_trait]
    impl DecodeBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn decode(&self, _asset: &MediaAsset) -> Result<Waveform> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn failing(name: &'static str, calls: Arc<AtomicUsize>) -> Box<dyn DecodeBackend> {
        Box::new(ScriptedBackend {
            name,
            calls,
            result: || {
                Err(PipelineError::Backend {
                    backend: "test",
                    message: "refused".to_string(),
                })
            },
        })
    }

    fn succeeding(name: &'static str, calls: Arc<AtomicUsize>) -> Box<dyn DecodeBackend> {
        Box::new(ScriptedBackend {
            name,
            calls,
            result: || Ok(Waveform::new(vec![0.1; 16_000], SAMPLE_RATE)),
        })
    }

    fn tiny_output(name: &'static str, calls: Arc<AtomicUsize>) -> Box<dyn DecodeBackend> {
        Box::new(ScriptedBackend {
            name,
            calls,
            result: || Ok(Waveform::new(vec![0.0; 8], SAMPLE_RATE)),
        })
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let normalizer = AudioNormalizer::new(
            vec![
                succeeding("one", first.clone()),
                succeeding("two", second.clone()),
            ],
            100,
        );

        let wave = normalizer
            .normalize(&MediaAsset::new("input.mp3"))
            .await
            .unwrap();
        assert_eq!(wave.len(), 16_000);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_rung_falls_through() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let normalizer = AudioNormalizer::new(
            vec![
                failing("one", first.clone()),
                succeeding("two", second.clone()),
            ],
            100,
        );

        let wave = normalizer
            .normalize(&MediaAsset::new("input.mp3"))
            .await
            .unwrap();
        assert!(!wave.is_empty());
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tiny_output_counts_as_failure() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let normalizer = AudioNormalizer::new(
            vec![
                tiny_output("one", first.clone()),
                succeeding("two", second.clone()),
            ],
            100,
        );

        let wave = normalizer
            .normalize(&MediaAsset::new("input.mp3"))
            .await
            .unwrap();
        assert_eq!(wave.len(), 16_000);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_normalization_yields_identical_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..SAMPLE_RATE / 2 {
            let t = i as f64 / SAMPLE_RATE as f64;
            let sample = (0.4 * (2.0 * std::f64::consts::PI * 220.0 * t).sin() * 32767.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let normalizer = AudioNormalizer::new(default_backends(), 100);
        let asset = MediaAsset::new(path);

        let first = normalizer.normalize(&asset).await.unwrap();
        let second = normalizer.normalize(&asset).await.unwrap();
        assert_eq!(first.sample_rate(), SAMPLE_RATE);
        assert_eq!(first.len(), second.len());
        assert_eq!(first.samples(), second.samples());
    }

    #[tokio::test]
    async fn test_exhausted_ladder_reports_attempt_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let normalizer = AudioNormalizer::new(
            vec![
                failing("one", calls.clone()),
                tiny_output("two", calls.clone()),
            ],
            100,
        );

        let err = normalizer
            .normalize(&MediaAsset::new("broken.ogg"))
            .await
            .unwrap_err();
        match err {
            PipelineError::Decode { path, attempts } => {
                assert_eq!(path, std::path::PathBuf::from("broken.ogg"));
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].backend, "one");
                assert_eq!(attempts[0].message, "refused");
                assert!(attempts[1].message.contains("implausibly small"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
