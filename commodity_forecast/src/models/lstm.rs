//! Recurrent network forecaster placeholder
//!
//! The LSTM configuration is accepted so pipelines can be configured for it,
//! but fitting always fails with [`ForecastError::NotImplemented`].

use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, ForecastModel};
use serde::{Deserialize, Serialize};

/// Default number of past observations fed to the network
pub const DEFAULT_LOOK_BACK: usize = 12;

/// LSTM model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmModel {
    /// Window of past observations per sample
    pub look_back: usize,
    /// Training epochs
    pub epochs: usize,
    /// Samples per gradient step
    pub batch_size: usize,
}

impl LstmModel {
    pub fn new(epochs: usize) -> Self {
        Self {
            look_back: DEFAULT_LOOK_BACK,
            epochs,
            batch_size: 32,
        }
    }
}

impl Default for LstmModel {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ForecastModel for LstmModel {
    type Fitted = FittedLstm;

    fn fit(&self, _train: &[f64]) -> Result<FittedLstm> {
        Err(ForecastError::NotImplemented(format!(
            "LSTM forecasting (look_back={}, epochs={}) is not available",
            self.look_back, self.epochs
        )))
    }

    fn name(&self) -> &str {
        "LSTM"
    }
}

/// A fitted LSTM. No value of this type can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FittedLstm {}

impl FittedModel for FittedLstm {
    fn predict(&self, _start: usize, _end: usize) -> Result<Vec<f64>> {
        match *self {}
    }

    fn training_len(&self) -> usize {
        match *self {}
    }

    fn name(&self) -> &str {
        match *self {}
    }
}
