//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which speech recognition backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerKind {
    /// Hosted recognition sidecar, locale-aware
    #[default]
    Google,
    /// Local Whisper sidecar
    Whisper,
}

impl RecognizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognizerKind::Google => "google",
            RecognizerKind::Whisper => "whisper",
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Pipeline behavior (chunking, recognizer selection)
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// External service endpoints
    #[serde(default)]
    pub backends: BackendConfig,

    /// Directory layout for inputs, outputs and logs
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Recognition backend to use
    #[serde(default)]
    pub recognizer: RecognizerKind,

    /// Whisper model size handed to the sidecar (tiny, base, small, ...)
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,

    /// Longest audio window sent to a recognizer in one request, seconds
    #[serde(default = "default_max_chunk_seconds")]
    pub max_chunk_seconds: f64,

    /// Decoded outputs smaller than this many bytes of PCM are treated
    /// as a failed decode and the next backend is tried
    #[serde(default = "default_min_decode_bytes")]
    pub min_decode_bytes: u64,

    /// Window length for the YouTube flow, seconds
    #[serde(default = "default_youtube_chunk_seconds")]
    pub youtube_chunk_seconds: f64,

    /// The YouTube flow transcribes at most this much audio, seconds
    #[serde(default = "default_youtube_max_seconds")]
    pub youtube_max_seconds: f64,
}

fn default_whisper_model() -> String {
    "base".to_string()
}
fn default_max_chunk_seconds() -> f64 {
    45.0
}
fn default_min_decode_bytes() -> u64 {
    100
}
fn default_youtube_chunk_seconds() -> f64 {
    8.0
}
fn default_youtube_max_seconds() -> f64 {
    60.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recognizer: RecognizerKind::default(),
            whisper_model: default_whisper_model(),
            max_chunk_seconds: default_max_chunk_seconds(),
            min_decode_bytes: default_min_decode_bytes(),
            youtube_chunk_seconds: default_youtube_chunk_seconds(),
            youtube_max_seconds: default_youtube_max_seconds(),
        }
    }
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Hosted speech recognition sidecar
    #[serde(default = "default_google_stt_url")]
    pub google_stt_url: String,

    /// Whisper sidecar
    #[serde(default = "default_whisper_url")]
    pub whisper_url: String,

    /// Text translation endpoint
    #[serde(default = "default_translate_url")]
    pub translate_url: String,

    /// Neural TTS sidecar (gendered voices)
    #[serde(default = "default_neural_tts_url")]
    pub neural_tts_url: String,

    /// Single-voice TTS fallback endpoint
    #[serde(default = "default_basic_tts_url")]
    pub basic_tts_url: String,

    /// Per-request timeout, seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_google_stt_url() -> String {
    "http://127.0.0.1:8090".to_string()
}
fn default_whisper_url() -> String {
    "http://127.0.0.1:8091".to_string()
}
fn default_translate_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}
fn default_neural_tts_url() -> String {
    "http://127.0.0.1:8092".to_string()
}
fn default_basic_tts_url() -> String {
    "https://translate.google.com/translate_tts".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            google_stt_url: default_google_stt_url(),
            whisper_url: default_whisper_url(),
            translate_url: default_translate_url(),
            neural_tts_url: default_neural_tts_url(),
            basic_tts_url: default_basic_tts_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Batch input directory scanned for audio files
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Synthesized audio output directory (batch and realtime)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Batch run report directory
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Temp storage for uploaded files (web)
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Synthesized audio served over HTTP (web)
    #[serde(default = "default_web_audio_dir")]
    pub web_audio_dir: String,

    /// Upper bound on files processed per batch run
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
}

fn default_input_dir() -> String {
    "data".to_string()
}
fn default_output_dir() -> String {
    "outputs".to_string()
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_upload_dir() -> String {
    "uploads".to_string()
}
fn default_web_audio_dir() -> String {
    "static".to_string()
}
fn default_max_batch_files() -> usize {
    45
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            log_dir: default_log_dir(),
            upload_dir: default_upload_dir(),
            web_audio_dir: default_web_audio_dir(),
            max_batch_files: default_max_batch_files(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Largest accepted upload, megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    30
}
fn default_max_upload_mb() -> usize {
    50
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            max_upload_mb: default_max_upload_mb(),
            cors_enabled: default_true(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_pipeline()?;
        self.validate_backends()?;
        self.validate_storage()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_pipeline(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;

        if pipeline.max_chunk_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_chunk_seconds".to_string(),
                message: format!("Must be positive, got {}", pipeline.max_chunk_seconds),
            });
        }

        if pipeline.max_chunk_seconds > 300.0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_chunk_seconds".to_string(),
                message: "Windows above 300s exceed what recognizers accept".to_string(),
            });
        }

        if pipeline.max_chunk_seconds > 60.0 {
            tracing::warn!(
                "pipeline.max_chunk_seconds ({}) is above 60s, hosted recognizers may reject \
                 long windows",
                pipeline.max_chunk_seconds
            );
        }

        // One PCM16 sample is two bytes; anything below that cannot hold audio
        if pipeline.min_decode_bytes < 2 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.min_decode_bytes".to_string(),
                message: "Must be at least 2".to_string(),
            });
        }

        if pipeline.whisper_model.is_empty() {
            return Err(ConfigError::MissingField(
                "pipeline.whisper_model".to_string(),
            ));
        }

        if pipeline.youtube_chunk_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.youtube_chunk_seconds".to_string(),
                message: format!("Must be positive, got {}", pipeline.youtube_chunk_seconds),
            });
        }

        if pipeline.youtube_max_seconds < pipeline.youtube_chunk_seconds {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.youtube_max_seconds".to_string(),
                message: format!(
                    "Cannot be smaller than youtube_chunk_seconds ({})",
                    pipeline.youtube_chunk_seconds
                ),
            });
        }

        Ok(())
    }

    fn validate_backends(&self) -> Result<(), ConfigError> {
        let urls = [
            ("backends.google_stt_url", &self.backends.google_stt_url),
            ("backends.whisper_url", &self.backends.whisper_url),
            ("backends.translate_url", &self.backends.translate_url),
            ("backends.neural_tts_url", &self.backends.neural_tts_url),
            ("backends.basic_tts_url", &self.backends.basic_tts_url),
        ];

        for (field, url) in urls {
            if url.is_empty() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be an http(s) URL, got '{}'", url),
                });
            }
        }

        if self.backends.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backends.request_timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_storage(&self) -> Result<(), ConfigError> {
        let dirs = [
            ("storage.input_dir", &self.storage.input_dir),
            ("storage.output_dir", &self.storage.output_dir),
            ("storage.log_dir", &self.storage.log_dir),
            ("storage.upload_dir", &self.storage.upload_dir),
            ("storage.web_audio_dir", &self.storage.web_audio_dir),
        ];

        for (field, dir) in dirs {
            if dir.is_empty() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
        }

        if self.storage.max_batch_files == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_batch_files".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.max_upload_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_mb".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (ANUVAAD_ prefix)
/// 2. config/{env}.toml (if env specified)
/// 3. config/default.toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("ANUVAAD")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.pipeline.recognizer, RecognizerKind::Google);
        assert_eq!(settings.pipeline.max_chunk_seconds, 45.0);
        assert_eq!(settings.storage.max_batch_files, 45);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_recognizer_kind_deserializes_lowercase() {
        let kind: RecognizerKind = serde_json::from_str("\"whisper\"").unwrap();
        assert_eq!(kind, RecognizerKind::Whisper);
        assert_eq!(kind.as_str(), "whisper");
    }

    #[test]
    fn test_chunk_length_bounds() {
        let mut settings = Settings::default();

        settings.pipeline.max_chunk_seconds = 0.0;
        assert!(settings.validate_pipeline().is_err());

        settings.pipeline.max_chunk_seconds = 500.0;
        assert!(settings.validate_pipeline().is_err());

        settings.pipeline.max_chunk_seconds = 45.0;
        assert!(settings.validate_pipeline().is_ok());
    }

    #[test]
    fn test_min_decode_bytes_floor() {
        let mut settings = Settings::default();
        settings.pipeline.min_decode_bytes = 1;
        assert!(settings.validate_pipeline().is_err());

        settings.pipeline.min_decode_bytes = 2;
        assert!(settings.validate_pipeline().is_ok());
    }

    #[test]
    fn test_youtube_window_consistency() {
        let mut settings = Settings::default();

        settings.pipeline.youtube_chunk_seconds = 0.0;
        assert!(settings.validate_pipeline().is_err());
        settings.pipeline.youtube_chunk_seconds = 8.0;

        settings.pipeline.youtube_max_seconds = 4.0;
        assert!(settings.validate_pipeline().is_err());

        settings.pipeline.youtube_max_seconds = 60.0;
        assert!(settings.validate_pipeline().is_ok());
    }

    #[test]
    fn test_backend_urls_must_be_http() {
        let mut settings = Settings::default();

        settings.backends.translate_url = String::new();
        assert!(settings.validate_backends().is_err());

        settings.backends.translate_url = "ftp://example.com".to_string();
        assert!(settings.validate_backends().is_err());

        settings.backends.translate_url = "https://example.com/translate".to_string();
        assert!(settings.validate_backends().is_ok());
    }

    #[test]
    fn test_backend_timeout_floor() {
        let mut settings = Settings::default();
        settings.backends.request_timeout_seconds = 0;
        assert!(settings.validate_backends().is_err());
    }

    #[test]
    fn test_storage_validation() {
        let mut settings = Settings::default();

        settings.storage.input_dir = String::new();
        assert!(settings.validate_storage().is_err());
        settings.storage.input_dir = "data".to_string();

        settings.storage.max_batch_files = 0;
        assert!(settings.validate_storage().is_err());
        settings.storage.max_batch_files = 45;

        assert!(settings.validate_storage().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();

        settings.server.port = 0;
        assert!(settings.validate_server().is_err());
        settings.server.port = 8080;

        settings.server.max_upload_mb = 0;
        assert!(settings.validate_server().is_err());
        settings.server.max_upload_mb = 50;

        settings.server.timeout_seconds = 0;
        assert!(settings.validate_server().is_err());
        settings.server.timeout_seconds = 30;

        assert!(settings.validate_server().is_ok());
    }
}
