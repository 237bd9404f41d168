//! Neural TTS sidecar client

use std::path::Path;
use std::time::Duration;

use anuvaad_core::{Language, PipelineError, Result, SpeechSynthesizer, VoiceGender};
use async_trait::async_trait;

use super::{neural_voice, write_audio};

pub struct NeuralTts {
    client: reqwest::Client,
    url: String,
}

impl NeuralTts {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Backend {
                backend: "neural-tts",
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for NeuralTts {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        gender: VoiceGender,
        out_path: &Path,
    ) -> Result<()> {
        let voice = neural_voice(language, gender).ok_or_else(|| PipelineError::Synthesis {
            language: language.code().to_string(),
            message: format!("no neural voice for {:?}", gender),
        })?;

        let response = self
            .client
            .post(format!("{}/synthesize", self.url))
            .json(&serde_json::json!({
                "text": text,
                "voice": voice,
            }))
            .send()
            .await
            .map_err(|e| PipelineError::Synthesis {
                language: language.code().to_string(),
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::Synthesis {
                language: language.code().to_string(),
                message: format!("service returned {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| PipelineError::Synthesis {
            language: language.code().to_string(),
            message: format!("failed to read audio body: {}", e),
        })?;

        if bytes.is_empty() {
            return Err(PipelineError::Synthesis {
                language: language.code().to_string(),
                message: "service returned no audio".to_string(),
            });
        }

        tracing::debug!(
            voice,
            bytes = bytes.len(),
            path = %out_path.display(),
            "neural synthesis complete"
        );
        write_audio(out_path, &bytes).await
    }

    fn backend_name(&self) -> &'static str {
        "neural-tts"
    }
}
