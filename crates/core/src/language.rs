//! Language definitions for the translation pipeline
//!
//! The twelve supported languages cover the major Indian languages plus
//! English. Variant order here is load-bearing: batch report columns and
//! user-facing language listings follow `Language::ALL`.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported target or source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "pa")]
    Punjabi,
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "kn")]
    Kannada,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "gu")]
    Gujarati,
    #[serde(rename = "ml")]
    Malayalam,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "or")]
    Odia,
    #[serde(rename = "ur")]
    Urdu,
}

impl Language {
    /// All supported languages in canonical (report column) order
    pub const ALL: [Language; 12] = [
        Language::English,
        Language::Hindi,
        Language::Punjabi,
        Language::Marathi,
        Language::Kannada,
        Language::Telugu,
        Language::Tamil,
        Language::Gujarati,
        Language::Malayalam,
        Language::Bengali,
        Language::Odia,
        Language::Urdu,
    ];

    /// ISO 639-1 code used in translation requests and file names
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Punjabi => "pa",
            Language::Marathi => "mr",
            Language::Kannada => "kn",
            Language::Telugu => "te",
            Language::Tamil => "ta",
            Language::Gujarati => "gu",
            Language::Malayalam => "ml",
            Language::Bengali => "bn",
            Language::Odia => "or",
            Language::Urdu => "ur",
        }
    }

    /// Human-readable name for logs and CLI listings
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Punjabi => "Punjabi",
            Language::Marathi => "Marathi",
            Language::Kannada => "Kannada",
            Language::Telugu => "Telugu",
            Language::Tamil => "Tamil",
            Language::Gujarati => "Gujarati",
            Language::Malayalam => "Malayalam",
            Language::Bengali => "Bengali",
            Language::Odia => "Odia",
            Language::Urdu => "Urdu",
        }
    }

    /// BCP-47 locale handed to speech recognizers.
    ///
    /// Urdu maps to `ur-PK` rather than an Indian locale because the
    /// recognition services only ship a Pakistani Urdu model.
    pub fn recognition_locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Punjabi => "pa-IN",
            Language::Marathi => "mr-IN",
            Language::Kannada => "kn-IN",
            Language::Telugu => "te-IN",
            Language::Tamil => "ta-IN",
            Language::Gujarati => "gu-IN",
            Language::Malayalam => "ml-IN",
            Language::Bengali => "bn-IN",
            Language::Odia => "or-IN",
            Language::Urdu => "ur-PK",
        }
    }

    /// Look up a language by its ISO code, case-insensitively
    pub fn from_code(code: &str) -> Option<Language> {
        let code = code.trim().to_ascii_lowercase();
        Language::ALL.iter().copied().find(|l| l.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| PipelineError::UnknownLanguage(s.to_string()))
    }
}
