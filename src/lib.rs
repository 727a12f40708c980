//! # Commodity Forecast Workspace
//!
//! Facade over the workspace crates:
//!
//! - [`commodity_forecast`]: indicator loading, alignment, monthly resampling,
//!   ARIMA backtesting and the CLI
//! - [`series_math`]: statistics, differencing and optimisation primitives
//!
//! ## Example
//!
//! ```
//! use commodity_forecast_workspace::series_math::differencing::difference;
//!
//! assert_eq!(difference(&[1.0, 4.0, 9.0], 1), vec![3.0, 5.0]);
//! ```

pub use commodity_forecast;
pub use series_math;

/// Version of the workspace facade
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
