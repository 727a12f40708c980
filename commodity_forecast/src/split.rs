//! Chronological train/test partitioning

use crate::error::{ForecastError, Result};

/// Fraction of observations used for training when none is configured
pub const DEFAULT_TRAIN_SPLIT: f64 = 0.8;

/// A contiguous training prefix and the test suffix that follows it
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    train: Vec<f64>,
    test: Vec<f64>,
}

impl TrainTestSplit {
    pub fn train(&self) -> &[f64] {
        &self.train
    }

    pub fn test(&self) -> &[f64] {
        &self.test
    }

    /// Index of the first test observation in the original series
    pub fn test_start(&self) -> usize {
        self.train.len()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.train, self.test)
    }
}

/// Split `series` so that the first `floor(len * fraction)` values train the model.
///
/// `fraction` must lie strictly between 0 and 1, and both partitions must be
/// non-empty.
pub fn train_test_split(series: &[f64], fraction: f64) -> Result<TrainTestSplit> {
    if !fraction.is_finite() || fraction <= 0.0 || fraction >= 1.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "Split fraction must be between 0 and 1 (exclusive), got {}",
            fraction
        )));
    }

    let train_len = (series.len() as f64 * fraction).floor() as usize;
    let test_len = series.len() - train_len;

    if train_len == 0 || test_len == 0 {
        return Err(ForecastError::InvalidSplit {
            fraction,
            len: series.len(),
            train_len,
            test_len,
        });
    }

    Ok(TrainTestSplit {
        train: series[..train_len].to_vec(),
        test: series[train_len..].to_vec(),
    })
}
