//! # Series Math
//!
//! Numeric building blocks for univariate time series models.
//! This crate knows nothing about indicators or files; it provides the
//! statistics, differencing, parameter transforms and the simplex optimiser
//! that model fitting is assembled from.

use thiserror::Error;

pub mod differencing;
pub mod optimize;
pub mod stats;
pub mod transform;

/// Errors that can occur in series calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
