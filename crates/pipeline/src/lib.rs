//! Speech translation pipeline stages
//!
//! Everything between raw input media and finished output audio: the
//! decode ladder, chunked speech recognition, text translation, speech
//! synthesis routing, speaker gender estimation, and the batch driver
//! that runs whole directories.

pub mod batch;
pub mod decode;
pub mod gender;
pub mod runner;
pub mod stt;
pub mod transcribe;
pub mod translate;
pub mod tts;

pub use self::batch::{BatchDriver, BatchSummary};
pub use self::decode::{default_backends, AudioNormalizer, DecodeBackend};
pub use self::gender::estimate_gender;
pub use self::runner::{FileReport, LanguageReport, PipelineRunner};
pub use self::stt::{build_recognizer, GoogleRecognizer, WhisperRecognizer};
pub use self::transcribe::{plan_windows, recognition_ladder, ChunkWindow, ChunkedTranscriber};
pub use self::translate::HttpTranslator;
pub use self::tts::{fallback_language, neural_voice, BasicTts, NeuralTts, SynthesisRouter};
