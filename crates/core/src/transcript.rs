//! Transcript types

use serde::{Deserialize, Serialize};

/// Text recognized from one audio window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Window start, seconds from the beginning of the input
    pub start_secs: f64,
    /// Window end, seconds from the beginning of the input
    pub end_secs: f64,
    /// Recognized text, never empty for a stored segment
    pub text: String,
    /// Recognition locale that produced the text, `None` when the
    /// recognizer auto-detected the language
    pub language_used: Option<String>,
}

/// Ordered, non-overlapping transcript of a whole input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Segments must arrive in playback order.
    pub fn push(&mut self, segment: TranscriptSegment) {
        debug_assert!(segment.start_secs <= segment.end_secs);
        if let Some(last) = self.segments.last() {
            debug_assert!(segment.start_secs >= last.end_secs - 1e-9);
        }
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when no window produced any text
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Full recognized text, segment texts joined with single spaces
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_secs: start,
            end_secs: end,
            text: text.to_string(),
            language_used: Some("hi-IN".to_string()),
        }
    }

    #[test]
    fn test_text_joins_segments_with_spaces() {
        let mut transcript = Transcript::new();
        transcript.push(segment(0.0, 45.0, "पहला हिस्सा"));
        transcript.push(segment(45.0, 90.0, "दूसरा हिस्सा"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.text(), "पहला हिस्सा दूसरा हिस्सा");
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.text(), "");
    }

    #[test]
    fn test_segments_preserve_window_bounds() {
        let mut transcript = Transcript::new();
        transcript.push(segment(45.0, 90.0, "text"));
        let stored = &transcript.segments()[0];
        assert_eq!(stored.start_secs, 45.0);
        assert_eq!(stored.end_secs, 90.0);
    }
}
