//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use anuvaad_config::Settings;
use anuvaad_core::Result;
use anuvaad_pipeline::PipelineRunner;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub runner: Arc<PipelineRunner>,
}

impl AppState {
    /// Builds the full pipeline from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let runner = PipelineRunner::from_settings(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            runner: Arc::new(runner),
        })
    }

    /// State with a preassembled runner, mainly for tests that swap in
    /// mock pipeline stages.
    pub fn with_runner(settings: Settings, runner: PipelineRunner) -> Self {
        Self {
            settings: Arc::new(settings),
            runner: Arc::new(runner),
        }
    }
}
