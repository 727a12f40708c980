//! The linear backtesting pipeline.
//!
//! Load → Align → Resample → SelectTarget → Split → Fit → Predict → Evaluate,
//! with an optional Forecast stage that refits on the whole target series
//! and extrapolates past its end. Every stage after Load is fatal on error.

use crate::align::align;
use crate::config::{ModelKind, PipelineConfig};
use crate::data::{DataLoader, LoadReport, LoadWarning};
use crate::error::{ForecastError, Result, Stage};
use crate::metrics::{forecast_accuracy, rmse, ForecastAccuracy};
use crate::models::arima::{Arima, FittedArima};
use crate::models::lstm::LstmModel;
use crate::models::{FittedModel, Forecast, ForecastModel};
use crate::observer::{PipelineObserver, TracingObserver};
use crate::resample::{monthly_resample, MonthlyTable};
use crate::split::{train_test_split, TrainTestSplit};
use crate::utils::future_month_ends;
use chrono::NaiveDate;

/// A model fitted on a training prefix and scored on the test suffix
#[derive(Debug, Clone)]
pub struct Backtest<F> {
    pub fitted: F,
    pub split: TrainTestSplit,
    /// One prediction per test value
    pub predictions: Vec<f64>,
    pub rmse: f64,
}

/// Split `series`, fit `model` on the training part and score its
/// predictions for the test indices
pub fn backtest<M: ForecastModel>(
    model: &M,
    series: &[f64],
    fraction: f64,
    observer: &dyn PipelineObserver,
) -> Result<Backtest<M::Fitted>> {
    let split = train_test_split(series, fraction)?;
    observer.on_stage(
        Stage::Split,
        &format!(
            "{} training and {} test observations",
            split.train().len(),
            split.test().len()
        ),
    );

    let fitted = model.fit(split.train())?;
    observer.on_stage(Stage::Fit, &format!("fitted {}", model.name()));

    let start = split.test_start();
    let end = start + split.test().len() - 1;
    let predictions = fitted.predict(start, end)?;
    observer.on_stage(
        Stage::Predict,
        &format!("predicted indices {}..={}", start, end),
    );

    let rmse = rmse(split.test(), &predictions)?;
    observer.on_stage(Stage::Evaluate, &format!("RMSE {:.6}", rmse));

    Ok(Backtest {
        fitted,
        split,
        predictions,
        rmse,
    })
}

/// Outcome of a backtest run
#[derive(Debug, Clone)]
pub struct ForecastResult {
    pub model: FittedArima,
    /// Predictions aligned with `actuals`
    pub predictions: Vec<f64>,
    /// The test suffix of the target series
    pub actuals: Vec<f64>,
    pub rmse: f64,
    pub accuracy: ForecastAccuracy,
    /// Month-end dates of the test suffix
    pub test_dates: Vec<NaiveDate>,
    /// Indicators skipped while loading
    pub load_warnings: Vec<LoadWarning>,
}

/// Extrapolation past the end of the target series
#[derive(Debug, Clone)]
pub struct FutureForecast {
    /// Model refitted on the full target series
    pub model: FittedArima,
    pub dates: Vec<NaiveDate>,
    pub forecast: Forecast,
}

/// Runs the configured pipeline
pub struct ForecastPipeline {
    config: PipelineConfig,
    observer: Box<dyn PipelineObserver>,
}

impl std::fmt::Debug for ForecastPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ForecastPipeline {
    /// Create a pipeline that reports through `tracing`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Box::new(TracingObserver),
        })
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read every configured indicator file
    pub fn load(&self) -> LoadReport {
        let report = DataLoader::load_indicators(
            &self.config.data_dir,
            &self.config.indicators,
            self.observer.as_ref(),
        );
        self.observer.on_stage(
            Stage::Load,
            &format!(
                "loaded {} of {} indicators",
                report.series.len(),
                self.config.indicators.len()
            ),
        );
        report
    }

    /// Load, align and resample to the monthly table
    pub fn prepare(&self) -> Result<(MonthlyTable, Vec<LoadWarning>)> {
        let report = self.load();

        let aligned = align(&report.series)?;
        self.observer.on_stage(
            Stage::Align,
            &format!(
                "{} complete rows across {} indicators",
                aligned.len(),
                aligned.width()
            ),
        );

        let monthly = monthly_resample(&aligned)?;
        self.observer
            .on_stage(Stage::Resample, &format!("{} monthly rows", monthly.len()));

        Ok((monthly, report.warnings))
    }

    /// Run every stage from loading to evaluation
    pub fn run(&self) -> Result<ForecastResult> {
        let (monthly, warnings) = self.prepare()?;
        let mut result = self.run_on_table(&monthly)?;
        result.load_warnings = warnings;
        Ok(result)
    }

    /// Run the stages from target selection onward on an existing table
    pub fn run_on_table(&self, table: &MonthlyTable) -> Result<ForecastResult> {
        let target = self.select_target(table)?;

        let outcome = match self.config.model {
            ModelKind::Arima => self.backtest(&self.arima(), target)?,
            ModelKind::Lstm => {
                let outcome = self.backtest(&LstmModel::new(self.config.epochs), target)?;
                match outcome.fitted {}
            }
        };

        let accuracy = forecast_accuracy(outcome.split.test(), &outcome.predictions)?;
        let test_dates = table.dates()[outcome.split.test_start()..].to_vec();
        let (_, actuals) = outcome.split.into_parts();

        Ok(ForecastResult {
            model: outcome.fitted,
            predictions: outcome.predictions,
            actuals,
            rmse: outcome.rmse,
            accuracy,
            test_dates,
            load_warnings: Vec::new(),
        })
    }

    /// Refit on the whole target series and extrapolate `forecast_steps` months
    pub fn forecast_future(&self, table: &MonthlyTable) -> Result<FutureForecast> {
        let target = self.select_target(table)?;

        let model = match self.config.model {
            ModelKind::Arima => self.arima().fit(target)?,
            ModelKind::Lstm => match LstmModel::new(self.config.epochs).fit(target)? {},
        };

        let forecast = model.forecast(self.config.forecast_steps)?;
        let last = table.dates().last().copied().ok_or(ForecastError::InsufficientData {
            stage: Stage::Forecast,
            required: 1,
            actual: 0,
        })?;
        let dates = future_month_ends(last, self.config.forecast_steps)?;

        self.observer.on_stage(
            Stage::Forecast,
            &format!(
                "extrapolated {} months after {}",
                self.config.forecast_steps, last
            ),
        );

        Ok(FutureForecast {
            model,
            dates,
            forecast,
        })
    }

    fn arima(&self) -> Arima {
        Arima::from_order(self.config.model_order).with_optimizer(self.config.optimizer)
    }

    fn backtest<M: ForecastModel>(&self, model: &M, series: &[f64]) -> Result<Backtest<M::Fitted>> {
        backtest(model, series, self.config.train_split, self.observer.as_ref())
    }

    fn select_target<'a>(&self, table: &'a MonthlyTable) -> Result<&'a [f64]> {
        let target = table.column(&self.config.target_commodity)?;

        // One training and one test value at minimum
        if target.len() < 2 {
            return Err(ForecastError::InsufficientData {
                stage: Stage::Resample,
                required: 2,
                actual: target.len(),
            });
        }

        self.observer.on_stage(
            Stage::SelectTarget,
            &format!(
                "target '{}' has {} monthly observations",
                self.config.target_commodity,
                target.len()
            ),
        );
        Ok(target)
    }
}
