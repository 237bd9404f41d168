//! Text translation via the public translate endpoint
//!
//! Uses the undocumented `translate_a/single` API with `client=gtx`. The
//! response is a nested JSON array where element 0 holds the translated
//! segments; everything else in the payload is ignored.

use std::time::Duration;

use anuvaad_config::Settings;
use anuvaad_core::{PipelineError, Result, TextTranslator};
use async_trait::async_trait;
use serde_json::Value;

pub struct HttpTranslator {
    client: reqwest::Client,
    url: String,
}

impl HttpTranslator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Backend {
                backend: "http-translate",
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.backends.translate_url.clone(),
            Duration::from_secs(settings.backends.request_timeout_seconds),
        )
    }
}

/// Pulls the translated text out of the `translate_a/single` response.
///
/// The payload looks like `[[["hola", "hello", ...], ["mundo", ...]], ...]`;
/// each inner array's first element is one translated segment and the
/// segments concatenate directly.
pub(crate) fn parse_translation(value: &Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let mut text = String::new();
    for segment in segments {
        if let Some(piece) = segment.get(0).and_then(Value::as_str) {
            text.push_str(piece);
        }
    }
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl TextTranslator for HttpTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(PipelineError::Translation {
                language: target.to_string(),
                message: "empty input text".to_string(),
            });
        }

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Translation {
                language: target.to_string(),
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::Translation {
                language: target.to_string(),
                message: format!("service returned {}", response.status()),
            });
        }

        let body: Value = response.json().await.map_err(|e| PipelineError::Translation {
            language: target.to_string(),
            message: format!("failed to parse response: {}", e),
        })?;

        parse_translation(&body).ok_or_else(|| PipelineError::Translation {
            language: target.to_string(),
            message: "malformed response".to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "http-translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_concatenates_segments() {
        let body = json!([
            [
                ["नमस्ते ", "hello ", null, null],
                ["दुनिया", "world", null, null]
            ],
            null,
            "en"
        ]);
        assert_eq!(parse_translation(&body).as_deref(), Some("नमस्ते दुनिया"));
    }

    #[test]
    fn test_parse_single_segment() {
        let body = json!([[["bonjour", "hello"]]]);
        assert_eq!(parse_translation(&body).as_deref(), Some("bonjour"));
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert_eq!(parse_translation(&json!(null)), None);
        assert_eq!(parse_translation(&json!([])), None);
        assert_eq!(parse_translation(&json!([null])), None);
        assert_eq!(parse_translation(&json!([[["   "]]])), None);
        assert_eq!(parse_translation(&json!("just a string")), None);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_any_request() {
        let translator =
            HttpTranslator::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = translator.translate("   ", "hi").await.unwrap_err();
        match err {
            PipelineError::Translation { language, message } => {
                assert_eq!(language, "hi");
                assert!(message.contains("empty input"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
