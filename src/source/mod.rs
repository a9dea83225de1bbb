mod bankruptcy;
mod ccusage;

pub use bankruptcy::BankruptcySource;
pub use ccusage::CcusageSource;

use crate::config::{SourceConfig, SourceKind};
use crate::lifecycle::NotReady;
use chrono::{DateTime, Local};
use std::time::Duration;

/// A cost reading.
#[derive(Clone, Debug, PartialEq)]
pub struct CostData {
    pub total_value: f64,
    pub currency: String,
    pub observed_at: DateTime<Local>,
    pub breakdown: Vec<ModelCost>,
}

/// The part of a total spent on a single model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelCost {
    pub model: String,
    pub cost: f64,
}

/// Something that can produce cost readings.
pub trait CostSource: Send {
    fn name(&self) -> &'static str;

    fn initialize(&mut self);

    fn shutdown(&mut self);

    fn is_ready(&self) -> bool;

    /// Fetch the current cost, `None` if nothing has been recorded yet.
    ///
    /// This can block, so callers that drive a UI should call it off the UI
    /// thread.
    fn fetch(&mut self) -> Result<Option<CostData>, SourceError>;
}

/// Build the source described by the configuration.
pub fn from_config(config: &SourceConfig) -> Box<dyn CostSource> {
    match config.kind {
        SourceKind::Ccusage => Box::new(CcusageSource::new(&config.command, config.timeout, config.cache_time)),
        SourceKind::Bankruptcy => Box::new(BankruptcySource::default()),
    }
}

/// Errors that can occur when fetching cost data
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to run '{command}': {source}")]
    Spawn { command: String, source: std::io::Error },

    #[error("'{command}' did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("'{command}' failed with {status}: {stderr}")]
    Failed { command: String, status: std::process::ExitStatus, stderr: String },

    #[error("failed to wait for '{command}': {source}")]
    Wait { command: String, source: std::io::Error },

    #[error("invalid ccusage output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    NotReady(#[from] NotReady),
}
