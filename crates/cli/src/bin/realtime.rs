//! Single-File Translator
//!
//! Translates one audio file into every supported language (or a single
//! one given as the second argument) and prints the results. Unlike the
//! batch binary this writes no CSV report.

use std::path::PathBuf;

use anuvaad_config::{load_settings, Settings};
use anuvaad_core::{Language, MediaAsset, VoiceGender};
use anuvaad_pipeline::PipelineRunner;

fn usage() -> ! {
    eprintln!("Usage: anuvaad-realtime <audio_file> [target_lang]");
    eprintln!();
    eprintln!("Supported languages:");
    for lang in Language::ALL {
        eprintln!("    {}: {}", lang.code(), lang.display_name());
    }
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(input) = args.get(1) else { usage() };
    let targets: Vec<Language> = match args.get(2) {
        Some(code) => match Language::from_code(code) {
            Some(lang) => vec![lang],
            None => {
                eprintln!("Unknown language code: {}", code);
                usage();
            }
        },
        None => Language::ALL.to_vec(),
    };

    let env = std::env::var("ANUVAAD_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };
    init_tracing(&settings);

    let asset = MediaAsset::new(input);
    if !asset.path().exists() {
        anyhow::bail!("input file not found: {}", input);
    }

    let output_dir = PathBuf::from(&settings.storage.output_dir);
    tokio::fs::create_dir_all(&output_dir).await?;

    let runner = PipelineRunner::from_settings(&settings)?;
    let report = runner
        .process_file(&asset, &targets, VoiceGender::Male, &output_dir, None)
        .await?;

    println!("Input: {}", report.input.display());
    println!("Recognized: {}", report.recognized_text);
    println!();
    for lang in &report.languages {
        match (&lang.translated_text, &lang.audio_path) {
            (Some(text), Some(path)) => {
                println!("[{}] {}", lang.language.code(), text);
                println!("     saved {}", path.display());
            }
            (Some(text), None) => {
                println!("[{}] {} (no audio)", lang.language.code(), text);
            }
            _ => {
                let reason = lang.error.as_deref().unwrap_or("unknown error");
                println!("[{}] failed: {}", lang.language.code(), reason);
            }
        }
    }
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.observability.log_level.clone().into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
