//! Batch Translator
//!
//! Scans the configured input directory and translates every audio file
//! into all supported languages, logging a CSV report of the run.

use anuvaad_config::{load_settings, Settings};
use anuvaad_pipeline::BatchDriver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("ANUVAAD_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };
    init_tracing(&settings);

    let driver = BatchDriver::from_settings(&settings)?;
    let summary = driver.run().await?;

    println!(
        "Batch complete: {} processed, {} failed",
        summary.processed, summary.failed
    );
    if let Some(report) = &summary.report_path {
        println!("Report: {}", report.display());
    }
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.observability.log_level.clone().into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
