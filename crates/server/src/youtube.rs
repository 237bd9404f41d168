//! YouTube audio acquisition
//!
//! Downloads the audio track of a video with an external `yt-dlp` binary
//! into a unique temp path. The returned asset is request-scoped; the
//! caller removes it once the pipeline has consumed it.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anuvaad_core::{MediaAsset, PipelineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.|m\.)?(youtube\.com|youtu\.be)/\S+").unwrap()
});

/// Accepts watch pages, shorts, and youtu.be share links.
pub fn is_youtube_url(url: &str) -> bool {
    YOUTUBE_URL.is_match(url)
}

pub struct YoutubeFetcher {
    binary: String,
}

impl YoutubeFetcher {
    pub fn new() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
        }
    }

    /// Overrides the downloader binary, mainly for tests.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Downloads the best audio-only stream and returns the file path the
    /// downloader reports. The output template keeps the stream's native
    /// extension, so `--print after_move:filepath` is the only reliable
    /// way to learn the final name.
    pub async fn fetch_audio(&self, url: &str) -> Result<MediaAsset> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let template = std::env::temp_dir().join(format!(
            "anuvaad_yt_{}_{}.%(ext)s",
            std::process::id(),
            timestamp
        ));

        let output = Command::new(&self.binary)
            .arg("-f")
            .arg("bestaudio/best")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-simulate")
            .arg("--print")
            .arg("after_move:filepath")
            .arg("-o")
            .arg(&template)
            .arg(url)
            .output()
            .await
            .map_err(|e| PipelineError::Backend {
                backend: "yt-dlp",
                message: format!("failed to launch {}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let brief = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("")
                .trim();
            tracing::warn!(status = %output.status, error = brief, "download failed");
            return Err(PipelineError::Backend {
                backend: "yt-dlp",
                message: format!("exit {}: {}", output.status, brief),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(str::trim)
            .ok_or_else(|| PipelineError::Backend {
                backend: "yt-dlp",
                message: "downloader reported no output file".to_string(),
            })?;

        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(PipelineError::Backend {
                backend: "yt-dlp",
                message: format!("downloaded file missing: {}", path.display()),
            });
        }

        tracing::info!(path = %path.display(), "downloaded audio track");
        Ok(MediaAsset::new(path))
    }
}

impl Default for YoutubeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_video_urls() {
        assert!(is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_youtube_url("https://youtube.com/shorts/abc123"));
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_youtube_url("http://m.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_rejects_other_urls() {
        assert!(!is_youtube_url(""));
        assert!(!is_youtube_url("youtube.com/watch?v=abc"));
        assert!(!is_youtube_url("https://example.com/watch?v=abc"));
        assert!(!is_youtube_url("ftp://youtube.com/video"));
        assert!(!is_youtube_url("https://youtube.com/"));
    }

    #[tokio::test]
    async fn test_missing_binary_reports_launch_failure() {
        let fetcher = YoutubeFetcher::with_binary("anuvaad-no-such-binary");
        let err = fetcher
            .fetch_audio("https://youtu.be/abc")
            .await
            .unwrap_err();
        match err {
            PipelineError::Backend { backend, message } => {
                assert_eq!(backend, "yt-dlp");
                assert!(message.contains("failed to launch"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
