//! Core traits for the translation pipeline
//!
//! All external services sit behind these traits to enable:
//! - Pluggable backends (swap implementations without code changes)
//! - Testing with mocks
//! - Runtime switching based on configuration
//!
//! # Trait Hierarchy
//!
//! ```text
//! Speech Processing:
//!   - SpeechRecognizer: Audio -> Text transcription
//!   - SpeechSynthesizer: Text -> Audio file
//!
//! Translation:
//!   - TextTranslator: Text -> Text between languages
//! ```

mod speech;
mod translate;

pub use speech::{SpeechRecognizer, SpeechSynthesizer};
pub use translate::TextTranslator;
