//! HTTP Endpoints
//!
//! REST API for the translation pipeline. Handlers return
//! `(StatusCode, Json<Value>)` with an `{"error": ...}` body on failure:
//! unusable input and unintelligible audio are 4xx, failing translation
//! and synthesis backends are 5xx.

use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use anuvaad_core::{
    Language, MediaAsset, PipelineError, VoiceGender, Waveform, AUDIO_EXTENSIONS, VIDEO_EXTENSIONS,
};
use anuvaad_pipeline::{estimate_gender, plan_windows};

use crate::state::AppState;
use crate::youtube::{is_youtube_url, YoutubeFetcher};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = if state.settings.server.cors_enabled {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };
    let body_limit = state.settings.server.max_upload_mb * 1024 * 1024;
    let timeout = Duration::from_secs(state.settings.server.timeout_seconds);

    Router::new()
        .route("/upload", post(upload))
        .route("/translate_text", post(translate_text))
        .route("/mic_record", post(mic_record))
        .route("/youtube_translate", post(youtube_translate))
        .route("/health", get(health))
        .nest_service(
            "/audio",
            ServeDir::new(&state.settings.storage.web_audio_dir),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn error_response(err: &PipelineError) -> (StatusCode, Json<Value>) {
    let status = match err {
        PipelineError::InvalidInput(_)
        | PipelineError::UnknownLanguage(_)
        | PipelineError::Decode { .. }
        | PipelineError::Recognition(_) => StatusCode::BAD_REQUEST,
        PipelineError::Translation { .. }
        | PipelineError::Synthesis { .. }
        | PipelineError::Backend { .. } => StatusCode::BAD_GATEWAY,
        PipelineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

/// Strips any path components from a client-supplied name and replaces
/// characters that are unsafe in a filesystem path.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "audio".to_string()
    } else {
        cleaned
    }
}

/// Recognition locale hinted by a language code appearing as a whole
/// token in the file name, e.g. `speech_hi_01.wav` hints Hindi. Tokens
/// avoid false hits like the `or` inside `recording.wav`.
fn language_hint_from_name(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(|token| Language::from_code(token).map(|lang| lang.recognition_locale()))
}

/// Target language from the request, defaulting to Hindi like the UI.
fn parse_target(lang: Option<&str>) -> Result<Language, PipelineError> {
    match lang {
        Some(code) if !code.trim().is_empty() => Language::from_code(code)
            .ok_or_else(|| PipelineError::UnknownLanguage(code.to_string())),
        _ => Ok(Language::Hindi),
    }
}

/// An explicit gender field wins; an absent one falls back to pitch
/// analysis when there is audio to analyze, otherwise Male.
fn resolve_gender(gender: Option<&str>, audio: Option<&Waveform>) -> VoiceGender {
    match gender {
        Some(g) if !g.trim().is_empty() => VoiceGender::from_str_loose(g),
        _ => audio.map(estimate_gender).unwrap_or_default(),
    }
}

/// `/audio/{file}?t={mtime}` so browsers refetch outputs that reuse a
/// name across requests.
async fn cache_busted_url(path: &Path, file_name: &str) -> String {
    let mtime = tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    format!("/audio/{}?t={}", file_name, mtime)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "recognizer": state.settings.pipeline.recognizer.as_str(),
            "languages": Language::ALL.len(),
        })),
    )
}

/// Handle file upload and translation.
///
/// Multipart fields: `file` (or `audio`) carries the media, `lang` the
/// target code, `gender` the voice selector.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut lang = None;
    let mut gender = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("malformed multipart body: {}", e) })),
                )
            }
        };
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" | "audio" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((file_name, bytes.to_vec())),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": format!("failed to read upload: {}", e) })),
                        )
                    }
                }
            }
            "lang" => lang = field.text().await.ok(),
            "gender" => gender = field.text().await.ok(),
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no file provided (expected form field 'file' or 'audio')" })),
        );
    };
    if file_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no file selected" })),
        );
    }

    let file_name = sanitize_filename(&file_name);
    let saved_path = PathBuf::from(&state.settings.storage.upload_dir).join(&file_name);
    let asset = MediaAsset::new(saved_path.clone());
    if !asset.is_supported() {
        let allowed: Vec<&str> = AUDIO_EXTENSIONS
            .iter()
            .chain(VIDEO_EXTENSIONS.iter())
            .copied()
            .collect();
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("file type not allowed, expected one of: {}", allowed.join(", "))
            })),
        );
    }

    if let Err(e) = tokio::fs::create_dir_all(&state.settings.storage.upload_dir).await {
        return error_response(&PipelineError::Io(e));
    }
    if let Err(e) = tokio::fs::write(&saved_path, &bytes).await {
        return error_response(&PipelineError::Io(e));
    }
    tracing::info!(file = %file_name, bytes = bytes.len(), "received upload");

    let target = match parse_target(lang.as_deref()) {
        Ok(target) => target,
        Err(e) => return error_response(&e),
    };

    let wave = match state.runner.decode(&asset).await {
        Ok(wave) => wave,
        Err(e) => return error_response(&e),
    };
    let gender = resolve_gender(gender.as_deref(), Some(&wave));
    let hint = language_hint_from_name(&file_name);

    let original_text = match state.runner.transcribe(&wave, hint).await {
        Ok(text) => text,
        Err(e) => return error_response(&e),
    };
    let translated_text = match state.runner.translate(&original_text, target.code()).await {
        Ok(text) => text,
        Err(e) => return error_response(&e),
    };

    let tts_name = format!("translated_{}_{}.mp3", target.code(), asset.stem());
    let tts_path = PathBuf::from(&state.settings.storage.web_audio_dir).join(&tts_name);
    if let Err(e) = state
        .runner
        .synthesize(&translated_text, target, gender, &tts_path)
        .await
    {
        return error_response(&e);
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "original_text": original_text,
            "translated_text": translated_text,
            "target_language": target.code(),
            "audio_url": format!("/audio/{}", tts_name),
        })),
    )
}

#[derive(Debug, Deserialize)]
struct TranslateTextRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

/// Translate typed text directly and synthesize it.
///
/// Synthesis failure still returns the translation, with a null audio
/// URL, so the UI can show text even when no TTS backend is reachable.
async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateTextRequest>,
) -> (StatusCode, Json<Value>) {
    let text = request.text.trim();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no text provided" })),
        );
    }
    let target = match parse_target(request.lang.as_deref()) {
        Ok(target) => target,
        Err(e) => return error_response(&e),
    };
    let gender = resolve_gender(request.gender.as_deref(), None);

    let translated_text = match state.runner.translate(text, target.code()).await {
        Ok(text) => text,
        Err(e) => return error_response(&e),
    };

    let tts_name = format!("translated_live_{}.mp3", target.code());
    let tts_path = PathBuf::from(&state.settings.storage.web_audio_dir).join(&tts_name);
    let audio_url = match state
        .runner
        .synthesize(&translated_text, target, gender, &tts_path)
        .await
    {
        Ok(_) => Value::String(cache_busted_url(&tts_path, &tts_name).await),
        Err(e) => {
            tracing::warn!(error = %e, "synthesis failed, returning text only");
            Value::Null
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "translated_text": translated_text,
            "audio_url": audio_url,
        })),
    )
}

/// Accept microphone audio (multipart field `audio`) and translate it.
///
/// Optional `source_lang` gives the recognizer a locale hint. The shared
/// live output name means each new recording replaces the previous one.
async fn mic_record(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut lang = None;
    let mut gender = None;
    let mut source_lang: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("malformed multipart body: {}", e) })),
                )
            }
        };
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "audio" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("mic_audio.wav")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((file_name, bytes.to_vec())),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": format!("failed to read upload: {}", e) })),
                        )
                    }
                }
            }
            "lang" => lang = field.text().await.ok(),
            "gender" => gender = field.text().await.ok(),
            "source_lang" => source_lang = field.text().await.ok(),
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no audio provided" })),
        );
    };

    let file_name = sanitize_filename(&file_name);
    let saved_path = PathBuf::from(&state.settings.storage.upload_dir).join(&file_name);
    if let Err(e) = tokio::fs::create_dir_all(&state.settings.storage.upload_dir).await {
        return error_response(&PipelineError::Io(e));
    }
    if let Err(e) = tokio::fs::write(&saved_path, &bytes).await {
        return error_response(&PipelineError::Io(e));
    }
    tracing::info!(file = %file_name, bytes = bytes.len(), "received mic audio");

    let target = match parse_target(lang.as_deref()) {
        Ok(target) => target,
        Err(e) => return error_response(&e),
    };

    let asset = MediaAsset::new(saved_path);
    let wave = match state.runner.decode(&asset).await {
        Ok(wave) => wave,
        Err(e) => return error_response(&e),
    };
    let gender = resolve_gender(gender.as_deref(), Some(&wave));
    let hint = source_lang
        .as_deref()
        .and_then(Language::from_code)
        .map(|lang| lang.recognition_locale());

    let original_text = match state.runner.transcribe(&wave, hint).await {
        Ok(text) => text,
        Err(e) => return error_response(&e),
    };
    let translated_text = match state.runner.translate(&original_text, target.code()).await {
        Ok(text) => text,
        Err(e) => return error_response(&e),
    };

    let tts_name = format!("translated_live_{}.mp3", target.code());
    let tts_path = PathBuf::from(&state.settings.storage.web_audio_dir).join(&tts_name);
    if let Err(e) = state
        .runner
        .synthesize(&translated_text, target, gender, &tts_path)
        .await
    {
        return error_response(&e);
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "original_text": original_text,
            "translated_text": translated_text,
            "audio_url": cache_busted_url(&tts_path, &tts_name).await,
        })),
    )
}

#[derive(Debug, Deserialize)]
struct YoutubeRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

/// Download a video's audio track and translate its opening minute in
/// short windows. Returns one entry per window that produced text; a
/// window whose translation or synthesis failed keeps its place with an
/// empty translation or null audio.
async fn youtube_translate(
    State(state): State<AppState>,
    Json(request): Json<YoutubeRequest>,
) -> (StatusCode, Json<Value>) {
    let url = request.url.trim();
    if !is_youtube_url(url) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "please provide a valid YouTube URL in the 'url' field" })),
        );
    }
    let target = match parse_target(request.lang.as_deref()) {
        Ok(target) => target,
        Err(e) => return error_response(&e),
    };
    let gender = resolve_gender(request.gender.as_deref(), None);

    let asset = match YoutubeFetcher::new().fetch_audio(url).await {
        Ok(asset) => asset,
        Err(e) => return error_response(&e),
    };
    let decoded = state.runner.decode(&asset).await;
    // The download is request-scoped; remove it before touching the result.
    let _ = tokio::fs::remove_file(asset.path()).await;
    let wave = match decoded {
        Ok(wave) => wave,
        Err(e) => return error_response(&e),
    };

    let total = wave
        .duration_secs()
        .min(state.settings.pipeline.youtube_max_seconds);
    let windows = plan_windows(total, state.settings.pipeline.youtube_chunk_seconds);
    let audio_dir = PathBuf::from(&state.settings.storage.web_audio_dir);

    let mut results = Vec::new();
    for window in windows {
        let chunk = wave.slice_seconds(window.start_secs, window.end_secs);
        let text = match state.runner.transcribe(&chunk, None).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(start_secs = window.start_secs, error = %e, "skipping window");
                continue;
            }
        };

        let translated = match state.runner.translate(&text, target.code()).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(start_secs = window.start_secs, error = %e, "window translation failed");
                String::new()
            }
        };

        let start_ms = (window.start_secs * 1000.0) as u64;
        let audio = if translated.is_empty() {
            Value::Null
        } else {
            let tts_name = format!("yt_chunk_{}.mp3", start_ms);
            let tts_path = audio_dir.join(&tts_name);
            match state
                .runner
                .synthesize(&translated, target, gender, &tts_path)
                .await
            {
                Ok(_) => Value::String(format!("/audio/{}", tts_name)),
                Err(e) => {
                    tracing::warn!(start_secs = window.start_secs, error = %e, "window synthesis failed");
                    Value::Null
                }
            }
        };

        results.push(json!({
            "start": window.start_secs as u64,
            "original": text,
            "translated": translated,
            "audio": audio,
        }));
    }

    (StatusCode::OK, Json(Value::Array(results)))
}
