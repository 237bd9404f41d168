//! Basic TTS via the public translate endpoint
//!
//! The endpoint caps request length, so long text is split into chunks at
//! word boundaries and the returned MP3 payloads are concatenated. MP3
//! frames are self-contained, so concatenation plays back cleanly. This
//! backend has one voice per language and ignores the requested gender.

use std::path::Path;
use std::time::Duration;

use anuvaad_core::{Language, PipelineError, Result, SpeechSynthesizer, VoiceGender};
use async_trait::async_trait;

use super::{fallback_language, write_audio};

/// Maximum characters per request accepted by the endpoint.
const MAX_CHUNK_CHARS: usize = 200;

pub struct BasicTts {
    client: reqwest::Client,
    url: String,
}

impl BasicTts {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Backend {
                backend: "basic-tts",
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

/// Splits text into chunks of at most `max_chars` characters, breaking at
/// word boundaries. A single word longer than the limit is hard-split.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        let current_chars = current.chars().count();

        if word_chars > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut piece = String::new();
            for ch in word.chars() {
                if piece.chars().count() == max_chars {
                    chunks.push(std::mem::take(&mut piece));
                }
                piece.push(ch);
            }
            if !piece.is_empty() {
                current = piece;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current_chars + 1 + word_chars <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl SpeechSynthesizer for BasicTts {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        _gender: VoiceGender,
        out_path: &Path,
    ) -> Result<()> {
        let effective = fallback_language(language);
        if effective != language {
            tracing::info!(
                requested = language.code(),
                spoken = effective.code(),
                "language not available on basic backend, substituting"
            );
        }

        let mut audio = Vec::new();
        for chunk in chunk_text(text, MAX_CHUNK_CHARS) {
            let response = self
                .client
                .get(&self.url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("tl", effective.code()),
                    ("client", "tw-ob"),
                    ("q", chunk.as_str()),
                ])
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
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(PipelineError::Synthesis {
                language: language.code().to_string(),
                message: "service returned no audio".to_string(),
            });
        }

        write_audio(out_path, &audio).await
    }

    fn backend_name(&self) -> &'static str {
        "basic-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("hello world", 200);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_splits_at_word_boundaries() {
        let chunks = chunk_text("one two three four", 9);
        assert_eq!(chunks, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_oversized_word_hard_split() {
        let chunks = chunk_text("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(chunk_text("", 200).is_empty());
        assert!(chunk_text("   ", 200).is_empty());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Devanagari characters are multi-byte; the limit is per character.
        let text = "नमस्ते दुनिया";
        let chunks = chunk_text(text, 6);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "नमस्ते");
        assert_eq!(chunks[1], "दुनिया");
    }
}
