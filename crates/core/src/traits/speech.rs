//! Speech processing traits

use crate::audio::{VoiceGender, Waveform};
use crate::language::Language;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Speech-to-text interface
///
/// Implementations:
/// - `GoogleRecognizer` - hosted recognition sidecar (default)
/// - `WhisperRecognizer` - local Whisper sidecar
///
/// # Example
///
/// ```ignore
/// let stt: Box<dyn SpeechRecognizer> = Box::new(GoogleRecognizer::new(config));
/// if let Some(text) = stt.recognize(&waveform, Some("hi-IN")).await? {
///     println!("Recognized: {}", text);
/// }
/// ```
#[async_trait]
pub trait SpeechRecognizer: Send + Sync + 'static {
    /// Recognize speech in a 16 kHz mono waveform
    ///
    /// # Arguments
    /// * `audio` - Waveform to transcribe
    /// * `locale` - Recognition locale such as `hi-IN`, or `None` to let
    ///   the backend auto-detect the language
    ///
    /// # Returns
    /// `Ok(Some(text))` on a successful transcription, `Ok(None)` when the
    /// backend processed the audio but found no intelligible speech
    async fn recognize(&self, audio: &Waveform, locale: Option<&str>) -> Result<Option<String>>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Text-to-speech interface
///
/// Implementations:
/// - `NeuralTts` - neural voices with per-language gender selection
/// - `BasicTts` - single-voice fallback, ignores gender
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize text and write the resulting audio file to `out_path`
    ///
    /// # Arguments
    /// * `text` - Text to speak
    /// * `language` - Language the text is written in
    /// * `gender` - Preferred voice gender (backends without gendered
    ///   voices may ignore it)
    /// * `out_path` - Destination file, created or replaced atomically
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        gender: VoiceGender,
        out_path: &Path,
    ) -> Result<()>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SAMPLE_RATE;

    struct MockRecognizer;

    #[async_trait]
    impl SpeechRecognizer for MockRecognizer {
        async fn recognize(
            &self,
            _audio: &Waveform,
            locale: Option<&str>,
        ) -> Result<Option<String>> {
            match locale {
                Some("hi-IN") => Ok(Some("नमस्ते".to_string())),
                _ => Ok(None),
            }
        }

        fn backend_name(&self) -> &'static str {
            "mock-stt"
        }
    }

    #[tokio::test]
    async fn test_recognizer_as_trait_object() {
        let stt: Box<dyn SpeechRecognizer> = Box::new(MockRecognizer);
        let wave = Waveform::new(vec![0.0; 160], SAMPLE_RATE);

        let hit = stt.recognize(&wave, Some("hi-IN")).await.unwrap();
        assert_eq!(hit.as_deref(), Some("नमस्ते"));

        let miss = stt.recognize(&wave, None).await.unwrap();
        assert!(miss.is_none());
        assert_eq!(stt.backend_name(), "mock-stt");
    }
}
