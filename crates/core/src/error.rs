//! Error types shared across the pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the workspace
pub type Result<T> = std::result::Result<T, PipelineError>;

/// One failed decode backend attempt, recorded in order of trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    /// Backend that was tried
    pub backend: &'static str,
    /// What the backend reported
    pub message: String,
}

impl DecodeAttempt {
    pub fn new(backend: &'static str, message: impl Into<String>) -> Self {
        Self {
            backend,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.backend, self.message)
    }
}

fn join_attempts(attempts: &[DecodeAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Every decode backend failed for this input. The attempt chain
    /// preserves trial order so logs show which rung rejected the file.
    #[error("could not decode {}: {}", .path.display(), join_attempts(.attempts))]
    Decode {
        path: PathBuf,
        attempts: Vec<DecodeAttempt>,
    },

    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("translation to {language} failed: {message}")]
    Translation { language: String, message: String },

    #[error("speech synthesis for {language} failed: {message}")]
    Synthesis { language: String, message: String },

    #[error("{backend} error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
