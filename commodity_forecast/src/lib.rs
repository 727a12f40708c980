//! # Commodity Forecast
//!
//! Backtests univariate forecasts of commodity prices and economic indicators.
//!
//! ## Pipeline
//!
//! - Per-indicator CSV/Parquet loading, with unreadable files reported as warnings
//! - Alignment on the union of dates, forward-fill, and removal of incomplete rows
//! - Monthly resampling (last observation of each calendar month)
//! - Chronological train/test split
//! - ARIMA(p, d, q) estimation by conditional maximum likelihood
//! - RMSE scoring, plus MAE, MAPE and sMAPE
//!
//! ## Quick Start
//!
//! ```no_run
//! use commodity_forecast::config::PipelineConfig;
//! use commodity_forecast::pipeline::ForecastPipeline;
//!
//! let config = PipelineConfig::default()
//!     .with_data_dir("data")
//!     .with_target("gold");
//!
//! let pipeline = ForecastPipeline::new(config)?;
//! let result = pipeline.run()?;
//! println!("RMSE: {:.4}", result.rmse);
//! # Ok::<(), commodity_forecast::ForecastError>(())
//! ```
//!
//! Models can also be used directly:
//!
//! ```
//! use commodity_forecast::models::arima::Arima;
//! use commodity_forecast::models::{FittedModel, ForecastModel};
//!
//! let fitted = Arima::new(0, 1, 0).fit(&[1.0, 2.0, 3.0, 4.0])?;
//! assert_eq!(fitted.predict(4, 5)?, vec![4.0, 4.0]);
//! # Ok::<(), commodity_forecast::ForecastError>(())
//! ```

pub mod align;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod persistence;
pub mod pipeline;
pub mod resample;
pub mod split;
pub mod utils;

// Re-export commonly used types
pub use crate::align::{align, AlignedTable};
pub use crate::config::{ModelKind, PipelineConfig};
pub use crate::data::{DataLoader, IndicatorSeries, IndicatorSource, LoadWarning};
pub use crate::error::{ForecastError, Result, Stage};
pub use crate::models::arima::{Arima, ArimaOrder, FittedArima};
pub use crate::models::{FittedModel, ForecastModel};
pub use crate::observer::{NullObserver, PipelineObserver, TracingObserver};
pub use crate::pipeline::{ForecastPipeline, ForecastResult, FutureForecast};
pub use crate::resample::{monthly_resample, MonthlyTable};
pub use crate::split::{train_test_split, TrainTestSplit};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
