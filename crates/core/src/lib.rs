//! Core traits and types for the speech translation pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - Core traits for pluggable backends (recognition, translation, synthesis)
//! - Audio waveform types and processing
//! - Language definitions (12 languages with recognition locales)
//! - Transcript types
//! - Error types

pub mod audio;
pub mod error;
pub mod language;
pub mod traits;
pub mod transcript;

// Re-exports from type modules
pub use audio::{
    MediaAsset, SynthesizedAudio, VoiceGender, Waveform, AUDIO_EXTENSIONS, SAMPLE_RATE,
    VIDEO_EXTENSIONS,
};
pub use error::{DecodeAttempt, PipelineError, Result};
pub use language::Language;
pub use transcript::{Transcript, TranscriptSegment};

// Trait re-exports
pub use traits::{SpeechRecognizer, SpeechSynthesizer, TextTranslator};
