//! Speech synthesis backends and routing
//!
//! Two backends, tried in order: the neural sidecar with per-language
//! voices, then the basic public endpoint as a fallback. The fallback
//! cannot speak Punjabi or Odia, so those substitute Hindi.

mod basic;
mod neural;

pub use self::basic::BasicTts;
pub use self::neural::NeuralTts;

use std::path::Path;
use std::time::Duration;

use anuvaad_config::Settings;
use anuvaad_core::{
    Language, PipelineError, Result, SpeechSynthesizer, SynthesizedAudio, VoiceGender,
};

/// Neural voice names, one per language and gender.
///
/// Punjabi and Odia each have a single neural voice, used for both
/// genders. Urdu uses the Pakistani voice pair.
const NEURAL_VOICES: [(Language, VoiceGender, &str); 24] = [
    (Language::English, VoiceGender::Male, "en-US-GuyNeural"),
    (Language::English, VoiceGender::Female, "en-US-AriaNeural"),
    (Language::Hindi, VoiceGender::Male, "hi-IN-MadhurNeural"),
    (Language::Hindi, VoiceGender::Female, "hi-IN-SwaraNeural"),
    (Language::Punjabi, VoiceGender::Male, "pa-IN-GurpreetNeural"),
    (Language::Punjabi, VoiceGender::Female, "pa-IN-GurpreetNeural"),
    (Language::Marathi, VoiceGender::Male, "mr-IN-ManoharNeural"),
    (Language::Marathi, VoiceGender::Female, "mr-IN-AarohiNeural"),
    (Language::Kannada, VoiceGender::Male, "kn-IN-GaganNeural"),
    (Language::Kannada, VoiceGender::Female, "kn-IN-SapnaNeural"),
    (Language::Telugu, VoiceGender::Male, "te-IN-MohanNeural"),
    (Language::Telugu, VoiceGender::Female, "te-IN-ShrutiNeural"),
    (Language::Tamil, VoiceGender::Male, "ta-IN-ValluvarNeural"),
    (Language::Tamil, VoiceGender::Female, "ta-IN-PallaviNeural"),
    (Language::Gujarati, VoiceGender::Male, "gu-IN-NiranjanNeural"),
    (Language::Gujarati, VoiceGender::Female, "gu-IN-DhwaniNeural"),
    (Language::Malayalam, VoiceGender::Male, "ml-IN-MidhunNeural"),
    (Language::Malayalam, VoiceGender::Female, "ml-IN-SobhanaNeural"),
    (Language::Bengali, VoiceGender::Male, "bn-IN-BashkarNeural"),
    (Language::Bengali, VoiceGender::Female, "bn-IN-TanishaaNeural"),
    (Language::Odia, VoiceGender::Male, "or-IN-LekhaNeural"),
    (Language::Odia, VoiceGender::Female, "or-IN-LekhaNeural"),
    (Language::Urdu, VoiceGender::Male, "ur-PK-AsadNeural"),
    (Language::Urdu, VoiceGender::Female, "ur-PK-UzmaNeural"),
];

/// Languages the basic endpoint cannot speak, with their stand-ins.
const FALLBACK_SUBSTITUTES: [(Language, Language); 2] = [
    (Language::Punjabi, Language::Hindi),
    (Language::Odia, Language::Hindi),
];

pub fn neural_voice(language: Language, gender: VoiceGender) -> Option<&'static str> {
    NEURAL_VOICES
        .iter()
        .find(|(lang, g, _)| *lang == language && *g == gender)
        .map(|(_, _, voice)| *voice)
}

/// Language actually spoken by the basic backend for `language`.
pub fn fallback_language(language: Language) -> Language {
    FALLBACK_SUBSTITUTES
        .iter()
        .find(|(from, _)| *from == language)
        .map(|(_, to)| *to)
        .unwrap_or(language)
}

/// Tries each synthesis backend in order until one produces audio.
pub struct SynthesisRouter {
    backends: Vec<Box<dyn SpeechSynthesizer>>,
}

impl SynthesisRouter {
    pub fn new(backends: Vec<Box<dyn SpeechSynthesizer>>) -> Self {
        Self { backends }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.backends.request_timeout_seconds);
        Ok(Self::new(vec![
            Box::new(NeuralTts::new(
                settings.backends.neural_tts_url.clone(),
                timeout,
            )?),
            Box::new(BasicTts::new(
                settings.backends.basic_tts_url.clone(),
                timeout,
            )?),
        ]))
    }

    pub async fn synthesize(
        &self,
        text: &str,
        language: Language,
        gender: VoiceGender,
        out_path: &Path,
    ) -> Result<SynthesizedAudio> {
        let mut last_error = None;
        for backend in &self.backends {
            match backend.synthesize(text, language, gender, out_path).await {
                Ok(()) => {
                    return Ok(SynthesizedAudio {
                        path: out_path.to_path_buf(),
                        language,
                        gender,
                        backend: backend.backend_name(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        backend = backend.backend_name(),
                        language = language.code(),
                        error = %e,
                        "synthesis backend failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| PipelineError::Synthesis {
            language: language.code().to_string(),
            message: "no synthesis backends configured".to_string(),
        }))
    }
}

/// Writes synthesized bytes to `out_path` atomically via a sibling
/// temporary file, creating parent directories as needed.
pub(crate) async fn write_audio(out_path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = out_path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent).await?;

    let parent = parent.to_path_buf();
    let out_path = out_path.to_path_buf();
    let bytes = bytes.to_vec();
    tokio::task::spawn_blocking(move || -> Result<()> {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&out_path).map_err(|e| PipelineError::Io(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| PipelineError::Synthesis {
        language: String::new(),
        message: format!("write task failed: {}", e),
    })?
}
