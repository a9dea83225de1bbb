use super::{CostData, CostSource, SourceError};
use crate::lifecycle::Lifecycle;
use chrono::Local;
use tracing::debug;

/// A source that always reports a ruinous amount. Useful for demos.
#[derive(Debug)]
pub struct BankruptcySource {
    lifecycle: Lifecycle,
}

impl BankruptcySource {
    pub const NAME: &'static str = "bankruptcy";
    pub const AMOUNT: f64 = 9999.99;
}

impl Default for BankruptcySource {
    fn default() -> Self {
        Self { lifecycle: Lifecycle::new(Self::NAME) }
    }
}

impl CostSource for BankruptcySource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize(&mut self) {
        self.lifecycle.initialize();
    }

    fn shutdown(&mut self) {
        self.lifecycle.shutdown();
    }

    fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    fn fetch(&mut self) -> Result<Option<CostData>, SourceError> {
        self.lifecycle.ensure_ready()?;
        debug!("reporting bankruptcy");
        Ok(Some(CostData {
            total_value: Self::AMOUNT,
            currency: "USD".into(),
            observed_at: Local::now(),
            breakdown: Vec::new(),
        }))
    }
}
