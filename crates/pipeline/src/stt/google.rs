//! Hosted recognition sidecar client
//!
//! Sends a WAV-encoded window as multipart form data. The `language`
//! field is only attached when the caller asks for a specific locale;
//! leaving it off tells the service to auto-detect.

use std::time::Duration;

use anuvaad_core::{PipelineError, Result, SpeechRecognizer, Waveform};
use async_trait::async_trait;
use serde::Deserialize;

pub struct GoogleRecognizer {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f32,
}

impl GoogleRecognizer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Backend {
                backend: "google-stt",
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleRecognizer {
    async fn recognize(&self, audio: &Waveform, locale: Option<&str>) -> Result<Option<String>> {
        let wav_bytes = audio.to_wav_bytes()?;

        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| PipelineError::Backend {
                backend: "google-stt",
                message: format!("failed to build form: {}", e),
            })?;

        let mut form = reqwest::multipart::Form::new().part("audio", part);
        if let Some(locale) = locale {
            form = form.text("language", locale.to_string());
        }

        let response = self
            .client
            .post(format!("{}/transcribe", self.url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Backend {
                backend: "google-stt",
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Backend {
                backend: "google-stt",
                message: format!("service returned {}: {}", status, body),
            });
        }

        let result: RecognizeResponse =
            response.json().await.map_err(|e| PipelineError::Backend {
                backend: "google-stt",
                message: format!("failed to parse response: {}", e),
            })?;

        if result.transcript.trim().is_empty() {
            return Ok(None);
        }

        tracing::debug!(
            confidence = result.confidence,
            locale = locale.unwrap_or("auto"),
            "recognized speech"
        );
        Ok(Some(result.transcript))
    }

    fn backend_name(&self) -> &'static str {
        "google-stt"
    }
}
