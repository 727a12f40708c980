//! Pipeline configuration

use crate::data::{default_indicators, IndicatorSource};
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaOrder;
use crate::split::DEFAULT_TRAIN_SPLIT;
use serde::{Deserialize, Serialize};
use series_math::optimize::NelderMeadConfig;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Model family used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Arima,
    Lstm,
}

impl std::str::FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "arima" => Ok(ModelKind::Arima),
            "lstm" => Ok(ModelKind::Lstm),
            other => Err(ForecastError::Config(format!(
                "Unknown model '{}', expected 'arima' or 'lstm'",
                other
            ))),
        }
    }
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the indicator files
    pub data_dir: PathBuf,
    /// Indicator to forecast
    pub target_commodity: String,
    pub model: ModelKind,
    pub model_order: ArimaOrder,
    /// Fraction of the target series used for training
    pub train_split: f64,
    /// Months to extrapolate after the backtest
    pub forecast_steps: usize,
    /// LSTM training epochs
    pub epochs: usize,
    /// Indicator files, in load order
    pub indicators: Vec<IndicatorSource>,
    pub optimizer: NelderMeadConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            target_commodity: "gold".to_string(),
            model: ModelKind::default(),
            model_order: ArimaOrder::default(),
            train_split: DEFAULT_TRAIN_SPLIT,
            forecast_steps: 12,
            epochs: 100,
            indicators: default_indicators(),
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON configuration; absent fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|err| {
            ForecastError::Config(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|err| ForecastError::Config(format!("invalid configuration: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.indicators {
            if !seen.insert(source.name.as_str()) {
                return Err(ForecastError::Config(format!(
                    "indicator '{}' is configured more than once",
                    source.name
                )));
            }
        }

        if !seen.contains(self.target_commodity.as_str()) {
            return Err(ForecastError::Config(format!(
                "target '{}' is not a configured indicator (known: {})",
                self.target_commodity,
                self.indicators
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        if !(self.train_split > 0.0 && self.train_split < 1.0) {
            return Err(ForecastError::Config(format!(
                "train_split must be between 0 and 1, got {}",
                self.train_split
            )));
        }

        if self.forecast_steps == 0 {
            return Err(ForecastError::Config(
                "forecast_steps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_commodity = target.into();
        self
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    pub fn with_order(mut self, order: ArimaOrder) -> Self {
        self.model_order = order;
        self
    }

    pub fn with_train_split(mut self, train_split: f64) -> Self {
        self.train_split = train_split;
        self
    }

    pub fn with_forecast_steps(mut self, steps: usize) -> Self {
        self.forecast_steps = steps;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_indicators(mut self, indicators: Vec<IndicatorSource>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model_order, ArimaOrder::new(5, 1, 0));
        assert_eq!(config.indicators.len(), 8);
    }

    #[test]
    fn test_unknown_target() {
        let config = PipelineConfig::default().with_target("platinum");
        assert!(matches!(config.validate(), Err(ForecastError::Config(_))));
    }

    #[test]
    fn test_duplicate_indicator() {
        let config = PipelineConfig::default().with_indicators(vec![
            IndicatorSource::new("gold", "a.csv"),
            IndicatorSource::new("gold", "b.csv"),
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!("ARIMA".parse::<ModelKind>().unwrap(), ModelKind::Arima);
        assert_eq!("lstm".parse::<ModelKind>().unwrap(), ModelKind::Lstm);
        assert!("prophet".parse::<ModelKind>().is_err());
    }
}
