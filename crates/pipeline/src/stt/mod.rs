//! Speech recognition backends
//!
//! Both backends are HTTP sidecars that accept 16 kHz mono audio. Which
//! one the pipeline talks to is a configuration choice, not a code path.

use std::sync::Arc;
use std::time::Duration;

use anuvaad_config::{RecognizerKind, Settings};
use anuvaad_core::{Result, SpeechRecognizer};

mod google;
mod whisper;

pub use google::GoogleRecognizer;
pub use whisper::WhisperRecognizer;

/// Build the recognizer selected in settings
pub fn build_recognizer(settings: &Settings) -> Result<Arc<dyn SpeechRecognizer>> {
    let timeout = Duration::from_secs(settings.backends.request_timeout_seconds);

    let recognizer: Arc<dyn SpeechRecognizer> = match settings.pipeline.recognizer {
        RecognizerKind::Google => Arc::new(GoogleRecognizer::new(
            settings.backends.google_stt_url.as_str(),
            timeout,
        )?),
        RecognizerKind::Whisper => Arc::new(WhisperRecognizer::new(
            settings.backends.whisper_url.as_str(),
            settings.pipeline.whisper_model.as_str(),
            timeout,
        )?),
    };

    tracing::info!(backend = recognizer.backend_name(), "speech recognizer ready");
    Ok(recognizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_honors_recognizer_setting() {
        let mut settings = Settings::default();

        settings.pipeline.recognizer = RecognizerKind::Google;
        let recognizer = build_recognizer(&settings).unwrap();
        assert_eq!(recognizer.backend_name(), "google-stt");

        settings.pipeline.recognizer = RecognizerKind::Whisper;
        let recognizer = build_recognizer(&settings).unwrap();
        assert_eq!(recognizer.backend_name(), "whisper");
    }
}
