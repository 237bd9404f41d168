//! Chunked transcription with language fallbacks
//!
//! Long recordings are cut into fixed windows before recognition since the
//! hosted recognizers reject or silently truncate long audio. Each window
//! is tried against a ladder of locales: the caller's hint first, then
//! auto-detect, then English and Hindi. A window where every rung comes
//! back empty is dropped rather than failing the whole file.

use std::sync::Arc;

use anuvaad_config::Settings;
use anuvaad_core::{SpeechRecognizer, Transcript, TranscriptSegment, Waveform};

/// Half-open slice of the source audio, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkWindow {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// Cuts `duration_secs` of audio into windows of at most `max_chunk_secs`.
///
/// The final window absorbs the remainder, so a 100s file at 45s chunks
/// yields windows of 45, 45 and 10 seconds.
pub fn plan_windows(duration_secs: f64, max_chunk_secs: f64) -> Vec<ChunkWindow> {
    if duration_secs <= 0.0 || max_chunk_secs <= 0.0 {
        return Vec::new();
    }
    if duration_secs <= max_chunk_secs {
        return vec![ChunkWindow {
            start_secs: 0.0,
            end_secs: duration_secs,
        }];
    }
    let mut windows = Vec::new();
    let mut offset = 0.0;
    while offset < duration_secs {
        let end = (offset + max_chunk_secs).min(duration_secs);
        windows.push(ChunkWindow {
            start_secs: offset,
            end_secs: end,
        });
        offset += max_chunk_secs;
    }
    windows
}

/// Locale ladder for one window. `None` means auto-detect.
///
/// The hint rung is kept even when it duplicates a later rung: retrying
/// `en-US` after auto-detect failed costs one request and keeps the order
/// predictable.
pub fn recognition_ladder(hint: Option<&str>) -> Vec<Option<String>> {
    let mut ladder = Vec::with_capacity(4);
    if let Some(locale) = hint {
        ladder.push(Some(locale.to_string()));
    }
    ladder.push(None);
    ladder.push(Some("en-US".to_string()));
    ladder.push(Some("hi-IN".to_string()));
    ladder
}

pub struct ChunkedTranscriber {
    recognizer: Arc<dyn SpeechRecognizer>,
    max_chunk_seconds: f64,
}

impl ChunkedTranscriber {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, max_chunk_seconds: f64) -> Self {
        Self {
            recognizer,
            max_chunk_seconds,
        }
    }

    pub fn from_settings(recognizer: Arc<dyn SpeechRecognizer>, settings: &Settings) -> Self {
        Self::new(recognizer, settings.pipeline.max_chunk_seconds)
    }

    /// Transcribes the full waveform window by window.
    ///
    /// Windows where no ladder rung produced text are skipped, so the
    /// returned transcript can be empty without this being an error.
    pub async fn transcribe(&self, audio: &Waveform, hint: Option<&str>) -> Transcript {
        let windows = plan_windows(audio.duration_secs(), self.max_chunk_seconds);
        let mut transcript = Transcript::new();
        let mut windows_failed = 0usize;

        for window in &windows {
            let chunk = audio.slice_seconds(window.start_secs, window.end_secs);
            match self.recognize_with_fallbacks(&chunk, hint).await {
                Some((text, locale)) => {
                    transcript.push(TranscriptSegment {
                        start_secs: window.start_secs,
                        end_secs: window.end_secs,
                        text,
                        language_used: locale,
                    });
                }
                None => {
                    windows_failed += 1;
                    tracing::debug!(
                        start_secs = window.start_secs,
                        end_secs = window.end_secs,
                        "no speech recognized in window"
                    );
                }
            }
        }

        if windows_failed > 0 {
            tracing::warn!(
                windows = windows.len(),
                windows_failed,
                "some windows produced no transcript"
            );
        }
        transcript
    }

    /// Runs one window down the locale ladder. Returns the recognized text
    /// and the locale that produced it (`None` for auto-detect).
    async fn recognize_with_fallbacks(
        &self,
        chunk: &Waveform,
        hint: Option<&str>,
    ) -> Option<(String, Option<String>)> {
        for locale in recognition_ladder(hint) {
            match self.recognizer.recognize(chunk, locale.as_deref()).await {
                Ok(Some(text)) => {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        return Some((text, locale));
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        locale = locale.as_deref().unwrap_or("auto"),
                        error = %e,
                        "recognition attempt failed"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anuvaad_core::{PipelineError, Result, SAMPLE_RATE};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays a scripted sequence of responses and records the locale of
    /// every call it receives.
    struct ScriptedRecognizer {
        responses: Mutex<VecDeque<Result<Option<String>>>>,
        locales_seen: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedRecognizer {
        fn new(responses: Vec<Result<Option<String>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                locales_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechRecognizer for ScriptedRecognizer {
        async fn recognize(
            &self,
            _audio: &Waveform,
            locale: Option<&str>,
        ) -> Result<Option<String>> {
            self.locales_seen.lock().push(locale.map(String::from));
            self.responses
                .lock()
                .pop_front()
                .unwrap_or(Ok(Some("overflow".to_string())))
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn one_second_audio() -> Waveform {
        Waveform::new(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE)
    }

    #[test]
    fn test_plan_windows_splits_remainder() {
        let windows = plan_windows(100.0, 45.0);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0], ChunkWindow { start_secs: 0.0, end_secs: 45.0 });
        assert_eq!(windows[1], ChunkWindow { start_secs: 45.0, end_secs: 90.0 });
        assert_eq!(windows[2], ChunkWindow { start_secs: 90.0, end_secs: 100.0 });
    }

    #[test]
    fn test_plan_windows_short_audio_single_window() {
        assert_eq!(plan_windows(30.0, 45.0).len(), 1);
        assert_eq!(plan_windows(45.0, 45.0).len(), 1);
    }

    #[test]
    fn test_plan_windows_empty_audio() {
        assert!(plan_windows(0.0, 45.0).is_empty());
        assert!(plan_windows(-1.0, 45.0).is_empty());
    }

    #[test]
    fn test_ladder_order() {
        let with_hint = recognition_ladder(Some("ta-IN"));
        assert_eq!(with_hint.len(), 4);
        assert_eq!(with_hint[0].as_deref(), Some("ta-IN"));
        assert_eq!(with_hint[1], None);
        assert_eq!(with_hint[2].as_deref(), Some("en-US"));
        assert_eq!(with_hint[3].as_deref(), Some("hi-IN"));

        let without = recognition_ladder(None);
        assert_eq!(without.len(), 3);
        assert_eq!(without[0], None);
    }

    #[tokio::test]
    async fn test_falls_back_to_auto_after_hint_error() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![
            Err(PipelineError::Recognition("hint rung down".to_string())),
            Ok(Some("नमस्ते".to_string())),
        ]));
        let transcriber = ChunkedTranscriber::new(recognizer.clone(), 45.0);

        let transcript = transcriber.transcribe(&one_second_audio(), Some("mr-IN")).await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.segments()[0].text, "नमस्ते");
        // Auto-detect produced the text, so no locale is recorded.
        assert_eq!(transcript.segments()[0].language_used, None);

        let locales = recognizer.locales_seen.lock();
        assert_eq!(locales.len(), 2);
        assert_eq!(locales[0].as_deref(), Some("mr-IN"));
        assert_eq!(locales[1], None);
    }

    #[tokio::test]
    async fn test_all_rungs_empty_gives_empty_transcript() {
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![
            Ok(None),
            Ok(None),
            Ok(None),
        ]));
        let transcriber = ChunkedTranscriber::new(recognizer, 45.0);

        let transcript = transcriber.transcribe(&one_second_audio(), None).await;
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn test_long_audio_segmented_with_window_bounds() {
        let samples = vec![0.0f32; 100 * SAMPLE_RATE as usize];
        let audio = Waveform::new(samples, SAMPLE_RATE);
        let recognizer = Arc::new(ScriptedRecognizer::new(vec![
            Ok(Some("one".to_string())),
            Ok(Some("two".to_string())),
            Ok(Some("three".to_string())),
        ]));
        let transcriber = ChunkedTranscriber::new(recognizer, 45.0);

        let transcript = transcriber.transcribe(&audio, Some("en-US")).await;
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.text(), "one two three");
        assert_eq!(transcript.segments()[2].start_secs, 90.0);
        assert_eq!(transcript.segments()[2].end_secs, 100.0);
        assert_eq!(
            transcript.segments()[0].language_used.as_deref(),
            Some("en-US")
        );
    }
}
