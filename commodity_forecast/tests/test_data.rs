mod common;

use commodity_forecast::data::{default_indicators, DataLoader, IndicatorSource, LoadWarning};
use commodity_forecast::error::Stage;
use commodity_forecast::observer::PipelineObserver;
use commodity_forecast::NullObserver;
use common::ymd;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

#[derive(Default)]
struct RecordingObserver {
    warnings: RefCell<Vec<String>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_stage(&self, _stage: Stage, _detail: &str) {}

    fn on_warning(&self, warning: &LoadWarning) {
        self.warnings.borrow_mut().push(warning.indicator.clone());
    }
}

#[test]
fn test_from_csv_reads_first_value_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Close,Volume").unwrap();
    writeln!(file, "2023-01-03,103.0,1500").unwrap();
    writeln!(file, "2023-01-01,100.0,1000").unwrap();
    writeln!(file, "2023-01-02,101.5,1200").unwrap();

    let series = DataLoader::from_csv(file.path(), "gold").unwrap();

    assert_eq!(series.name(), "gold");
    assert_eq!(
        series.dates(),
        &[ymd(2023, 1, 1), ymd(2023, 1, 2), ymd(2023, 1, 3)]
    );
    assert_eq!(series.values(), &[Some(100.0), Some(101.5), Some(103.0)]);
}

#[test]
fn test_from_csv_missing_and_non_numeric_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "observation_date,CPI").unwrap();
    writeln!(file, "2023-01-01,300.1").unwrap();
    writeln!(file, "2023-02-01,").unwrap();
    writeln!(file, "2023-03-01,n/a").unwrap();
    writeln!(file, "2023-04-01,301.7").unwrap();

    let series = DataLoader::from_csv(file.path(), "cpi").unwrap();

    assert_eq!(series.len(), 4);
    assert_eq!(series.values(), &[Some(300.1), None, None, Some(301.7)]);
}

#[test]
fn test_from_csv_duplicate_dates_keep_last() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "2023-01-01,1.0").unwrap();
    writeln!(file, "2023-01-01,2.0").unwrap();

    let series = DataLoader::from_csv(file.path(), "gold").unwrap();
    assert_eq!(series.values(), &[Some(2.0)]);
}

#[test]
fn test_from_csv_year_last_dates() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Price").unwrap();
    writeln!(file, "12/30/2020,1.0").unwrap();
    writeln!(file, "12/31/2020,2.0").unwrap();
    let series = DataLoader::from_csv(file.path(), "gold").unwrap();
    assert_eq!(series.dates(), &[ymd(2020, 12, 30), ymd(2020, 12, 31)]);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Price").unwrap();
    writeln!(file, "31/12/2020,2.0").unwrap();
    let series = DataLoader::from_csv(file.path(), "gold").unwrap();
    assert_eq!(series.dates(), &[ymd(2020, 12, 31)]);

    // Either day/month order is valid, so the file is rejected
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Price").unwrap();
    writeln!(file, "01/02/2023,2.0").unwrap();
    assert!(DataLoader::from_csv(file.path(), "gold").is_err());
}

#[test]
fn test_from_csv_errors() {
    assert!(DataLoader::from_csv("nonexistent_file.csv", "gold").is_err());

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "not a date,1.0").unwrap();
    assert!(DataLoader::from_csv(file.path(), "gold").is_err());

    // A lone date column has no values
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date").unwrap();
    writeln!(file, "2023-01-01").unwrap();
    assert!(DataLoader::from_csv(file.path(), "gold").is_err());
}

#[test]
fn test_from_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("silver.parquet");

    let mut df = df!(
        "date" => &["2023-01-01", "2023-01-02"],
        "price" => &[23.5, 23.9]
    )
    .unwrap();
    ParquetWriter::new(File::create(&path).unwrap())
        .finish(&mut df)
        .unwrap();

    let series = DataLoader::from_file(&path, "silver").unwrap();
    assert_eq!(series.values(), &[Some(23.5), Some(23.9)]);
}

#[test]
fn test_load_indicators_skips_failed_files() {
    let dir = tempdir().unwrap();
    common::write_csv(
        dir.path(),
        "gold_price.csv",
        &[(ymd(2023, 1, 1), 1800.0), (ymd(2023, 1, 2), 1810.0)],
    );
    fs::write(dir.path().join("broken.csv"), "date,price\nyesterday,1.0\n").unwrap();

    let sources = vec![
        IndicatorSource::new("gold", "gold_price.csv"),
        IndicatorSource::new("silver", "silver_price.csv"),
        IndicatorSource::new("cpi", "broken.csv"),
    ];
    let observer = RecordingObserver::default();

    let report = DataLoader::load_indicators(dir.path(), &sources, &observer);

    assert_eq!(report.names(), vec!["gold"]);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.warnings[0].indicator, "silver");
    assert_eq!(report.warnings[0].path, dir.path().join("silver_price.csv"));
    assert_eq!(*observer.warnings.borrow(), vec!["silver", "cpi"]);
    assert!(report.get("gold").is_some());
    assert!(report.get("silver").is_none());
}

#[test]
fn test_load_indicators_empty_directory() {
    let dir = tempdir().unwrap();
    let report = DataLoader::load_indicators(dir.path(), &default_indicators(), &NullObserver);

    assert!(report.series.is_empty());
    assert_eq!(report.warnings.len(), 8);
}
