//! End-to-end pipeline over a single input file
//!
//! Normalizes the input to 16 kHz mono, transcribes it, then fans out per
//! target language: translate, synthesize, report. Translation and
//! synthesis failures are recorded per language so one bad target does
//! not lose the others; decode and recognition failures abort the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anuvaad_config::Settings;
use anuvaad_core::{
    Language, MediaAsset, PipelineError, Result, SynthesizedAudio, TextTranslator, VoiceGender,
    Waveform,
};

use crate::decode::AudioNormalizer;
use crate::stt::build_recognizer;
use crate::transcribe::ChunkedTranscriber;
use crate::translate::HttpTranslator;
use crate::tts::SynthesisRouter;

/// Outcome for one target language of one input file.
#[derive(Debug, Clone)]
pub struct LanguageReport {
    pub language: Language,
    pub translated_text: Option<String>,
    pub audio_path: Option<PathBuf>,
    pub synthesis_backend: Option<&'static str>,
    pub error: Option<String>,
}

/// Outcome for one input file across all target languages.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub recognized_text: String,
    pub languages: Vec<LanguageReport>,
}

pub struct PipelineRunner {
    normalizer: AudioNormalizer,
    transcriber: ChunkedTranscriber,
    translator: Arc<dyn TextTranslator>,
    synthesizer: SynthesisRouter,
}

impl PipelineRunner {
    pub fn new(
        normalizer: AudioNormalizer,
        transcriber: ChunkedTranscriber,
        translator: Arc<dyn TextTranslator>,
        synthesizer: SynthesisRouter,
    ) -> Self {
        Self {
            normalizer,
            transcriber,
            translator,
            synthesizer,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let recognizer = build_recognizer(settings)?;
        Ok(Self::new(
            AudioNormalizer::from_settings(settings),
            ChunkedTranscriber::from_settings(recognizer, settings),
            Arc::new(HttpTranslator::from_settings(settings)?),
            SynthesisRouter::from_settings(settings)?,
        ))
    }

    pub async fn decode(&self, asset: &MediaAsset) -> Result<Waveform> {
        self.normalizer.normalize(asset).await
    }

    /// Full transcript of the waveform, joined across windows.
    ///
    /// An empty transcript is an error here: callers past this point need
    /// text to translate.
    pub async fn transcribe(&self, audio: &Waveform, hint: Option<&str>) -> Result<String> {
        let transcript = self.transcriber.transcribe(audio, hint).await;
        if transcript.is_empty() {
            return Err(PipelineError::Recognition(
                "no speech recognized in any window".to_string(),
            ));
        }
        Ok(transcript.text())
    }

    pub async fn translate(&self, text: &str, target: &str) -> Result<String> {
        self.translator.translate(text, target).await
    }

    pub async fn synthesize(
        &self,
        text: &str,
        language: Language,
        gender: VoiceGender,
        out_path: &Path,
    ) -> Result<SynthesizedAudio> {
        self.synthesizer
            .synthesize(text, language, gender, out_path)
            .await
    }

    /// Runs the whole pipeline for one file.
    ///
    /// Output audio lands at `output_dir/{stem}_{lang}.mp3`. Per-language
    /// failures are captured in the report's `error` field.
    pub async fn process_file(
        &self,
        asset: &MediaAsset,
        targets: &[Language],
        gender: VoiceGender,
        output_dir: &Path,
        hint: Option<&str>,
    ) -> Result<FileReport> {
        tracing::info!(input = %asset.path().display(), "processing file");

        let audio = self.normalizer.normalize(asset).await?;
        let recognized_text = self.transcribe(&audio, hint).await?;

        let mut languages = Vec::with_capacity(targets.len());
        for target in targets {
            let translated = match self.translator.translate(&recognized_text, target.code()).await
            {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        language = target.code(),
                        error = %e,
                        "translation failed"
                    );
                    languages.push(LanguageReport {
                        language: *target,
                        translated_text: None,
                        audio_path: None,
                        synthesis_backend: None,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let out_path = output_dir.join(format!("{}_{}.mp3", asset.stem(), target.code()));
            match self
                .synthesizer
                .synthesize(&translated, *target, gender, &out_path)
                .await
            {
                Ok(synth) => languages.push(LanguageReport {
                    language: *target,
                    translated_text: Some(translated),
                    audio_path: Some(synth.path),
                    synthesis_backend: Some(synth.backend),
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!(
                        language = target.code(),
                        error = %e,
                        "synthesis failed"
                    );
                    languages.push(LanguageReport {
                        language: *target,
                        translated_text: Some(translated),
                        audio_path: None,
                        synthesis_backend: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(FileReport {
            input: asset.path().to_path_buf(),
            recognized_text,
            languages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::default_backends;
    use anuvaad_core::{SpeechRecognizer, SpeechSynthesizer, SAMPLE_RATE};
    use async_trait::async_trait;

    struct FixedRecognizer {
        text: Option<&'static str>,
    }

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        async fn recognize(
            &self,
            _audio: &Waveform,
            _locale: Option<&str>,
        ) -> Result<Option<String>> {
            Ok(self.text.map(String::from))
        }

        fn backend_name(&self) -> &'static str {
            "fixed"
        }
    }

    /// Fails for one target language, succeeds for the rest.
    struct SelectiveTranslator {
        fail_for: &'static str,
    }

    #[async_trait]
    impl TextTranslator for SelectiveTranslator {
        async fn translate(&self, text: &str, target: &str) -> Result<String> {
            if target == self.fail_for {
                return Err(PipelineError::Translation {
                    language: target.to_string(),
                    message: "scripted failure".to_string(),
                });
            }
            Ok(format!("[{target}] {text}"))
        }

        fn backend_name(&self) -> &'static str {
            "selective"
        }
    }

    struct FileWritingSynth;

    #[async_trait]
    impl SpeechSynthesizer for FileWritingSynth {
        async fn synthesize(
            &self,
            _text: &str,
            _language: Language,
            _gender: VoiceGender,
            out_path: &Path,
        ) -> Result<()> {
            crate::tts::write_audio(out_path, b"mp3-bytes").await
        }

        fn backend_name(&self) -> &'static str {
            "file-writing"
        }
    }

    fn wav_fixture(dir: &Path) -> MediaAsset {
        let path = dir.join("input.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..SAMPLE_RATE {
            let t = i as f64 / SAMPLE_RATE as f64;
            let sample = (0.4 * (2.0 * std::f64::consts::PI * 220.0 * t).sin() * 32767.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        MediaAsset::new(path)
    }

    fn runner(recognized: Option<&'static str>, fail_translation_for: &'static str) -> PipelineRunner {
        PipelineRunner::new(
            AudioNormalizer::new(default_backends(), 100),
            ChunkedTranscriber::new(Arc::new(FixedRecognizer { text: recognized }), 45.0),
            Arc::new(SelectiveTranslator {
                fail_for: fail_translation_for,
            }),
            SynthesisRouter::new(vec![Box::new(FileWritingSynth)]),
        )
    }

    #[tokio::test]
    async fn test_process_file_reports_per_language() {
        let dir = tempfile::TempDir::new().unwrap();
        let asset = wav_fixture(dir.path());
        let out_dir = dir.path().join("out");

        let report = runner(Some("hello world"), "ta")
            .process_file(
                &asset,
                &[Language::Hindi, Language::Tamil],
                VoiceGender::Male,
                &out_dir,
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.recognized_text, "hello world");
        assert_eq!(report.languages.len(), 2);

        let hindi = &report.languages[0];
        assert_eq!(hindi.language, Language::Hindi);
        assert_eq!(hindi.translated_text.as_deref(), Some("[hi] hello world"));
        assert_eq!(hindi.synthesis_backend, Some("file-writing"));
        assert!(hindi.error.is_none());
        let audio = hindi.audio_path.as_ref().unwrap();
        assert_eq!(audio.file_name().unwrap(), "input_hi.mp3");
        assert!(audio.exists());

        let tamil = &report.languages[1];
        assert!(tamil.translated_text.is_none());
        assert!(tamil.audio_path.is_none());
        assert!(tamil.error.as_deref().unwrap().contains("scripted failure"));
    }

    #[tokio::test]
    async fn test_no_speech_aborts_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let asset = wav_fixture(dir.path());

        let err = runner(None, "")
            .process_file(
                &asset,
                &[Language::Hindi],
                VoiceGender::Male,
                dir.path(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Recognition(_)));
    }
}
