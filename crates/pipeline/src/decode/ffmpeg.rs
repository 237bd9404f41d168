//! ffmpeg subprocess decode
//!
//! The catch-all rung. ffmpeg opens everything the pipeline accepts,
//! including the video containers, and writes raw 16 kHz mono PCM16 to a
//! temp file that is removed on every exit path.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anuvaad_core::{MediaAsset, PipelineError, Result, Waveform, SAMPLE_RATE};
use async_trait::async_trait;
use tokio::process::Command;

use super::DecodeBackend;

pub struct FfmpegDecoder {
    binary: String,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }

    /// Override the binary name, mainly for tests
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn temp_output_path() -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let unique_id = format!("{}_{}", std::process::id(), timestamp);
        std::env::temp_dir().join(format!("anuvaad_pcm_{}.raw", unique_id))
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecodeBackend for FfmpegDecoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn decode(&self, asset: &MediaAsset) -> Result<Waveform> {
        let output_path = Self::temp_output_path();

        let output = Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(asset.path())
            .args(["-ar", "16000", "-ac", "1", "-f", "s16le", "-acodec", "pcm_s16le"])
            .arg(&output_path)
            .output()
            .await
            .map_err(|e| PipelineError::Backend {
                backend: "ffmpeg",
                message: format!("failed to launch {}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // ffmpeg prints a banner; the last line carries the actual error
            let brief = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("")
                .to_string();
            tracing::warn!(input = %asset.path().display(), error = %brief, "ffmpeg conversion failed");
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(PipelineError::Backend {
                backend: "ffmpeg",
                message: format!("exit {}: {}", output.status, brief),
            });
        }

        let pcm_bytes = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&output_path).await;
                return Err(PipelineError::Backend {
                    backend: "ffmpeg",
                    message: format!("failed to read converted output: {}", e),
                });
            }
        };

        let _ = tokio::fs::remove_file(&output_path).await;

        Ok(Waveform::from_pcm16(&pcm_bytes, SAMPLE_RATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_reports_launch_failure() {
        let decoder = FfmpegDecoder::with_binary("anuvaad-no-such-binary");
        let err = decoder
            .decode(&MediaAsset::new("input.mp4"))
            .await
            .unwrap_err();
        match err {
            PipelineError::Backend { backend, message } => {
                assert_eq!(backend, "ffmpeg");
                assert!(message.contains("failed to launch"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let a = FfmpegDecoder::temp_output_path();
        let b = FfmpegDecoder::temp_output_path();
        assert_ne!(a, b);
    }
}
