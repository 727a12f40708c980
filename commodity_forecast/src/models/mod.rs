//! Forecasting models for univariate series

use crate::error::{ForecastError, Result};
use std::fmt::Debug;

/// Forecast values for a contiguous range of series indices
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Index of the first forecast value in the original series
    start: usize,
    /// Forecasted values
    values: Vec<f64>,
    /// Prediction intervals (optional)
    intervals: Option<Vec<(f64, f64)>>,
}

impl Forecast {
    /// Create a new forecast starting at series index `start`
    pub fn new(start: usize, values: Vec<f64>) -> Self {
        Self {
            start,
            values,
            intervals: None,
        }
    }

    /// Create a new forecast with prediction intervals
    pub fn new_with_intervals(
        start: usize,
        values: Vec<f64>,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        Ok(Self {
            start,
            values,
            intervals: Some(intervals),
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the first forecast value
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// Get the prediction intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// A model whose parameters have been estimated. Immutable once fitted.
pub trait FittedModel: Debug {
    /// Predict series indices `start..=end`.
    ///
    /// Indices count from the first training observation. Indices inside the
    /// training range give one-step-ahead predictions; later indices are
    /// extrapolated.
    fn predict(&self, start: usize, end: usize) -> Result<Vec<f64>>;

    /// Number of observations the model was fitted on
    fn training_len(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;

    /// Extrapolate `steps` values past the end of the training data
    fn forecast(&self, steps: usize) -> Result<Forecast> {
        if steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        let start = self.training_len();
        let values = self.predict(start, start + steps - 1)?;
        Ok(Forecast::new(start, values))
    }
}

/// Forecast model that can be fitted to a series
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Estimate the model on a training series
    fn fit(&self, train: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
pub mod lstm;
