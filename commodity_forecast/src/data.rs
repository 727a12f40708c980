//! Indicator series and the per-file loader

use crate::error::{ForecastError, Result};
use crate::observer::PipelineObserver;
use crate::utils::parse_date;
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named, date-ordered sequence of observations.
///
/// Dates are strictly increasing; a value of `None` is a missing observation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Build a series from unordered points.
    ///
    /// Points are sorted by date; when a date repeats, the later point wins.
    /// Non-finite values are treated as missing.
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, Option<f64>)>) -> Self {
        let mut by_date = BTreeMap::new();
        for (date, value) in points {
            by_date.insert(date, value.filter(|v| v.is_finite()));
        }

        let (dates, values) = by_date.into_iter().unzip();
        Self {
            name: name.into(),
            dates,
            values,
        }
    }

    /// Create a fully observed series from parallel date and value vectors
    pub fn from_values(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }

        Ok(Self::new(
            name,
            dates.into_iter().zip(values.into_iter().map(Some)).collect(),
        ))
    }

    /// Indicator name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observation dates, strictly increasing
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values, `None` where missing
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Iterate over `(date, value)` pairs in date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Date of the first non-missing observation
    pub fn first_observed(&self) -> Option<NaiveDate> {
        self.iter().find(|(_, v)| v.is_some()).map(|(d, _)| d)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// One configured indicator: its name and the file it is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSource {
    pub name: String,
    pub file: String,
}

impl IndicatorSource {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

/// The eight indicators the pipeline reads by default
pub fn default_indicators() -> Vec<IndicatorSource> {
    [
        ("gold", "gold_price.csv"),
        ("silver", "silver_price.csv"),
        ("cpi", "CPI.csv"),
        ("interest", "interest_rate.csv"),
        ("monetary_base", "monetary_base.csv"),
        ("snp", "snp_index.csv"),
        ("gsci", "gsci.csv"),
        ("yield", "Treasury_yield.csv"),
    ]
    .into_iter()
    .map(|(name, file)| IndicatorSource::new(name, file))
    .collect()
}

/// A file that could not be loaded; the indicator is skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub indicator: String,
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not load '{}' from {}: {}",
            self.indicator,
            self.path.display(),
            self.reason
        )
    }
}

/// Outcome of loading every configured indicator
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Successfully loaded series, in configuration order
    pub series: Vec<IndicatorSeries>,
    /// One entry per indicator that was skipped
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Look up a loaded series by indicator name
    pub fn get(&self, name: &str) -> Option<&IndicatorSeries> {
        self.series.iter().find(|s| s.name() == name)
    }

    /// Names of the loaded indicators
    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name()).collect()
    }
}

/// Data loader for indicator files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load every source from `dir`.
    ///
    /// A failure on one file becomes a [`LoadWarning`] passed to the observer;
    /// the remaining files are still loaded.
    pub fn load_indicators<P: AsRef<Path>>(
        dir: P,
        sources: &[IndicatorSource],
        observer: &dyn PipelineObserver,
    ) -> LoadReport {
        let mut report = LoadReport::default();

        for source in sources {
            let path = dir.as_ref().join(&source.file);
            match Self::from_file(&path, &source.name) {
                Ok(series) => {
                    debug!(
                        indicator = %source.name,
                        rows = series.len(),
                        "loaded indicator file"
                    );
                    report.series.push(series);
                }
                Err(err) => {
                    let warning = LoadWarning {
                        indicator: source.name.clone(),
                        path,
                        reason: err.to_string(),
                    };
                    observer.on_warning(&warning);
                    report.warnings.push(warning);
                }
            }
        }

        report
    }

    /// Load a file, choosing the reader from its extension (CSV unless `.parquet`)
    pub fn from_file<P: AsRef<Path>>(path: P, name: &str) -> Result<IndicatorSeries> {
        let is_parquet = path
            .as_ref()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("parquet"))
            .unwrap_or(false);

        if is_parquet {
            Self::from_parquet(path, name)
        } else {
            Self::from_csv(path, name)
        }
    }

    /// Load an indicator series from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P, name: &str) -> Result<IndicatorSeries> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df, name)
    }

    /// Load an indicator series from a Parquet file
    pub fn from_parquet<P: AsRef<Path>>(path: P, name: &str) -> Result<IndicatorSeries> {
        let file = File::open(path)?;
        let df = ParquetReader::new(file).finish()?;

        Self::from_dataframe(&df, name)
    }

    /// Extract the date column and the first value column of a DataFrame
    pub fn from_dataframe(df: &DataFrame, name: &str) -> Result<IndicatorSeries> {
        let time_column = Self::detect_time_column(df)?;
        let value_column = Self::detect_value_column(df, &time_column)?;

        let dates = Self::column_as_dates(df.column(&time_column)?)?;
        let values = Self::column_as_f64(df.column(&value_column)?)?;

        Ok(IndicatorSeries::new(
            name,
            dates.into_iter().zip(values).collect(),
        ))
    }

    /// Detect the date column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        if let Some(name) = column_names.iter().find(|name| is_date_header(name)) {
            return Ok(name.to_string());
        }

        // Fall back to the first column
        match df.get_columns().first() {
            Some(first_col) if df.width() > 1 => Ok(first_col.name().to_string()),
            _ => Err(ForecastError::InvalidParameter(
                "No date column found in data".to_string(),
            )),
        }
    }

    /// The value column is the first column that is not the date column
    fn detect_value_column(df: &DataFrame, time_column: &str) -> Result<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| *name != time_column)
            .map(|name| name.to_string())
            .ok_or_else(|| {
                ForecastError::InvalidParameter("No value column found in data".to_string())
            })
    }

    fn column_as_dates(col: &Series) -> Result<Vec<NaiveDate>> {
        let parsed: Vec<Option<NaiveDate>> = match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .map(|opt| opt.map(parse_date).transpose())
                .collect::<Result<_>>()?,
            DataType::Date => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                    .ok_or_else(|| ForecastError::InvalidParameter("bad epoch".to_string()))?;
                col.cast(&DataType::Int32)?
                    .i32()?
                    .into_iter()
                    .map(|opt| {
                        opt.and_then(|days| {
                            epoch.checked_add_signed(chrono::Duration::days(days as i64))
                        })
                    })
                    .collect()
            }
            DataType::Datetime(unit, _) => {
                let per_second: i64 = match unit {
                    TimeUnit::Nanoseconds => 1_000_000_000,
                    TimeUnit::Microseconds => 1_000_000,
                    TimeUnit::Milliseconds => 1_000,
                };
                col.cast(&DataType::Int64)?
                    .i64()?
                    .into_iter()
                    .map(|opt| {
                        opt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts.div_euclid(per_second), 0))
                            .map(|dt| dt.date_naive())
                    })
                    .collect()
            }
            // Compact yyyymmdd integers
            DataType::Int64 | DataType::Int32 => col
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|opt| opt.map(|v| parse_date(&v.to_string())).transpose())
                .collect::<Result<_>>()?,
            other => {
                return Err(ForecastError::InvalidParameter(format!(
                    "Column '{}' of type {} cannot be read as dates",
                    col.name(),
                    other
                )))
            }
        };

        parsed
            .into_iter()
            .enumerate()
            .map(|(row, date)| {
                date.ok_or_else(|| {
                    ForecastError::InvalidParameter(format!(
                        "Row {} of column '{}' has no date",
                        row + 1,
                        col.name()
                    ))
                })
            })
            .collect()
    }

    /// Values that are empty or not numeric become missing
    fn column_as_f64(col: &Series) -> Result<Vec<Option<f64>>> {
        if !col.dtype().is_numeric() && col.dtype() != &DataType::Utf8 {
            return Err(ForecastError::InvalidParameter(format!(
                "Column '{}' of type {} cannot be converted to f64",
                col.name(),
                col.dtype()
            )));
        }

        let values = col.cast(&DataType::Float64)?;
        let values = values.f64()?.into_iter().collect();
        Ok(values)
    }
}

/// Whole-word match on `date`, `time`, `datetime` or `timestamp`, so
/// headers such as `observation_date` qualify but `Updated` does not
fn is_date_header(name: &str) -> bool {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| matches!(word, "date" | "time" | "datetime" | "timestamp"))
}
