//! Progress and warning hooks for the pipeline.
//!
//! Library code never prints. Callers decide where stage progress and load
//! warnings go by passing a [`PipelineObserver`].

use crate::data::LoadWarning;
use crate::error::Stage;
use tracing::{info, warn};

/// Receives stage progress and per-file load warnings
pub trait PipelineObserver {
    /// A stage has finished; `detail` is a short human-readable summary
    fn on_stage(&self, _stage: Stage, _detail: &str) {}

    /// An indicator file was skipped
    fn on_warning(&self, _warning: &LoadWarning) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, stage: Stage, detail: &str) {
        info!(stage = %stage, "{}", detail);
    }

    fn on_warning(&self, warning: &LoadWarning) {
        warn!(
            indicator = %warning.indicator,
            path = %warning.path.display(),
            "{}",
            warning.reason
        );
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}
