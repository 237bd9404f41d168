//! Whisper sidecar client
//!
//! Ships raw f32 samples base64-encoded in a JSON body. Whisper wants a
//! bare language code rather than a BCP-47 locale, so `hi-IN` becomes
//! `hi`; with no locale at all the model auto-detects.

use std::time::Duration;

use anuvaad_core::{PipelineError, Result, SpeechRecognizer, Waveform, SAMPLE_RATE};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

pub struct WhisperRecognizer {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl WhisperRecognizer {
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Backend {
                backend: "whisper",
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }
}

/// First subtag of a BCP-47 locale: `hi-IN` -> `hi`
fn primary_subtag(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

fn build_payload(audio_b64: String, model: &str, language: Option<&str>) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "audio": audio_b64,
        "sample_rate": SAMPLE_RATE,
        "model": model,
    });
    if let Some(lang) = language {
        payload["language"] = serde_json::Value::String(lang.to_string());
    }
    payload
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, audio: &Waveform, locale: Option<&str>) -> Result<Option<String>> {
        let audio_bytes: Vec<u8> = audio
            .samples()
            .iter()
            .flat_map(|&f| f.to_le_bytes())
            .collect();
        let audio_b64 = BASE64.encode(&audio_bytes);

        let language = locale.map(primary_subtag);
        let payload = build_payload(audio_b64, &self.model, language);

        let response = self
            .client
            .post(format!("{}/transcribe", self.url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipelineError::Backend {
                backend: "whisper",
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Backend {
                backend: "whisper",
                message: format!("service returned {}: {}", status, body),
            });
        }

        let result: serde_json::Value =
            response.json().await.map_err(|e| PipelineError::Backend {
                backend: "whisper",
                message: format!("failed to parse response: {}", e),
            })?;

        let text = result["text"].as_str().unwrap_or("").trim().to_string();
        let proc_time = result["processing_time_seconds"].as_f64().unwrap_or(0.0);

        if text.is_empty() {
            return Ok(None);
        }

        tracing::debug!(
            seconds = proc_time,
            language = language.unwrap_or("auto"),
            "whisper transcribed window"
        );
        Ok(Some(text))
    }

    fn backend_name(&self) -> &'static str {
        "whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("hi-IN"), "hi");
        assert_eq!(primary_subtag("en-US"), "en");
        assert_eq!(primary_subtag("ur-PK"), "ur");
        assert_eq!(primary_subtag("ta"), "ta");
    }

    #[test]
    fn test_payload_includes_language_only_when_asked() {
        let with_lang = build_payload("QUJD".to_string(), "base", Some("hi"));
        assert_eq!(with_lang["language"], "hi");
        assert_eq!(with_lang["model"], "base");
        assert_eq!(with_lang["sample_rate"], 16_000);

        let auto = build_payload("QUJD".to_string(), "base", None);
        assert!(auto.get("language").is_none());
    }
}
