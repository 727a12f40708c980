#![allow(dead_code)]

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Write a two-column `date,value` CSV into `dir`
pub fn write_csv(dir: &Path, file: &str, rows: &[(NaiveDate, f64)]) {
    let mut text = String::from("date,value\n");
    for (date, value) in rows {
        text.push_str(&format!("{},{}\n", date.format("%Y-%m-%d"), value));
    }
    fs::write(dir.join(file), text).unwrap();
}

/// One row per month on the 15th, starting January 2015
pub fn monthly_rows(values: &[f64]) -> Vec<(NaiveDate, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let year = 2015 + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            (ymd(year, month, 15), *v)
        })
        .collect()
}

/// Deterministic noisy upward trend
pub fn trending_series(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.8 * t + 3.0 * (t * 0.9).sin() + 1.5 * (t * 2.3).cos()
        })
        .collect()
}
