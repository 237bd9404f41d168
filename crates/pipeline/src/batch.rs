//! Batch translation over a directory of audio files
//!
//! Scans the input directory for audio files, runs each through the full
//! pipeline, and appends one CSV row per successfully transcribed file.
//! Files that fail to decode or transcribe are counted but get no row.
//! A failed translation leaves its cell empty; a failed synthesis does
//! not affect the row at all.

use std::path::PathBuf;

use anuvaad_config::Settings;
use anuvaad_core::{Language, MediaAsset, PipelineError, Result, VoiceGender};

use crate::runner::PipelineRunner;

#[derive(Debug)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub report_path: Option<PathBuf>,
}

pub struct BatchDriver {
    runner: PipelineRunner,
    input_dir: PathBuf,
    output_dir: PathBuf,
    log_dir: PathBuf,
    max_files: usize,
    targets: Vec<Language>,
}

fn report_error(e: csv::Error) -> PipelineError {
    PipelineError::Backend {
        backend: "csv-report",
        message: e.to_string(),
    }
}

impl BatchDriver {
    pub fn new(
        runner: PipelineRunner,
        input_dir: PathBuf,
        output_dir: PathBuf,
        log_dir: PathBuf,
        max_files: usize,
        targets: Vec<Language>,
    ) -> Self {
        Self {
            runner,
            input_dir,
            output_dir,
            log_dir,
            max_files,
            targets,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            PipelineRunner::from_settings(settings)?,
            PathBuf::from(&settings.storage.input_dir),
            PathBuf::from(&settings.storage.output_dir),
            PathBuf::from(&settings.storage.log_dir),
            settings.storage.max_batch_files,
            Language::ALL.to_vec(),
        ))
    }

    /// Audio files in the input directory, sorted by name so repeat runs
    /// process in the same order, capped at `max_files`.
    async fn collect_inputs(&self) -> Result<Vec<MediaAsset>> {
        let mut assets = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.input_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let asset = MediaAsset::new(entry.path());
            if asset.is_audio() {
                assets.push(asset);
            }
        }
        assets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        if assets.len() > self.max_files {
            tracing::warn!(
                found = assets.len(),
                max = self.max_files,
                "too many input files, truncating batch"
            );
            assets.truncate(self.max_files);
        }
        Ok(assets)
    }

    pub async fn run(&self) -> Result<BatchSummary> {
        let assets = self.collect_inputs().await?;
        if assets.is_empty() {
            tracing::info!(dir = %self.input_dir.display(), "no audio files found");
            return Ok(BatchSummary {
                processed: 0,
                failed: 0,
                report_path: None,
            });
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::create_dir_all(&self.log_dir).await?;

        let report_path = self.log_dir.join(format!(
            "translations_{}.csv",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        let mut writer = csv::Writer::from_path(&report_path).map_err(report_error)?;

        let mut header = vec!["input_file".to_string(), "recognized_text".to_string()];
        header.extend(
            self.targets
                .iter()
                .map(|lang| format!("translation_{}", lang.code())),
        );
        writer.write_record(&header).map_err(report_error)?;

        let mut processed = 0usize;
        let mut failed = 0usize;
        for asset in &assets {
            match self
                .runner
                .process_file(
                    asset,
                    &self.targets,
                    VoiceGender::Male,
                    &self.output_dir,
                    None,
                )
                .await
            {
                Ok(report) => {
                    let mut row = vec![
                        asset.file_name().unwrap_or_default().to_string(),
                        report.recognized_text.clone(),
                    ];
                    row.extend(
                        report
                            .languages
                            .iter()
                            .map(|lang| lang.translated_text.clone().unwrap_or_default()),
                    );
                    writer.write_record(&row).map_err(report_error)?;
                    writer.flush()?;
                    processed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        input = %asset.path().display(),
                        error = %e,
                        "skipping file"
                    );
                    failed += 1;
                }
            }
        }

        tracing::info!(
            processed,
            failed,
            report = %report_path.display(),
            "batch complete"
        );
        Ok(BatchSummary {
            processed,
            failed,
            report_path: Some(report_path),
        })
    }
}
