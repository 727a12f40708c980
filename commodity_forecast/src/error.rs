//! Error types for the commodity_forecast crate

use polars::prelude::PolarsError;
use series_math::MathError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage a failure or progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    Align,
    Resample,
    SelectTarget,
    Split,
    Fit,
    Predict,
    Evaluate,
    Forecast,
}

impl Stage {
    /// Short lowercase name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Align => "align",
            Stage::Resample => "resample",
            Stage::SelectTarget => "select_target",
            Stage::Split => "split",
            Stage::Fit => "fit",
            Stage::Predict => "predict",
            Stage::Evaluate => "evaluate",
            Stage::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom error types for the commodity_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A requested indicator column is absent from the table
    #[error("[{stage}] column '{column}' not found, available: {available:?}")]
    MissingColumn {
        stage: Stage,
        column: String,
        available: Vec<String>,
    },

    /// A stage has too few observations to proceed
    #[error("[{stage}] insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        stage: Stage,
        required: usize,
        actual: usize,
    },

    /// The train/test split would leave a partition empty
    #[error(
        "[split] fraction {fraction} of {len} observations gives {train_len} training and {test_len} test values"
    )]
    InvalidSplit {
        fraction: f64,
        len: usize,
        train_len: usize,
        test_len: usize,
    },

    /// Model estimation failed
    #[error("[{stage}] model fit failed: {reason}")]
    ModelFit { stage: Stage, reason: String },

    /// Actual and predicted sequences differ in length
    #[error("[{stage}] length mismatch: {actual} actual values vs {predicted} predicted")]
    LengthMismatch {
        stage: Stage,
        actual: usize,
        predicted: usize,
    },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Capability that exists in the interface but has no implementation
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from (de)serializing models or configuration
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from the numeric layer
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl ForecastError {
    /// The pipeline stage this error was raised in, when known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ForecastError::MissingColumn { stage, .. }
            | ForecastError::InsufficientData { stage, .. }
            | ForecastError::ModelFit { stage, .. }
            | ForecastError::LengthMismatch { stage, .. } => Some(*stage),
            ForecastError::InvalidSplit { .. } => Some(Stage::Split),
            _ => None,
        }
    }

    /// True for every "not enough rows to proceed" condition, including empty split partitions
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. } | ForecastError::InvalidSplit { .. }
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}
