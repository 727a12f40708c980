//! Merging indicator series onto a shared date index

use crate::data::IndicatorSeries;
use crate::error::{ForecastError, Result, Stage};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// Indicators merged onto one date index.
///
/// Every cell is populated and dates are strictly increasing. Columns keep
/// the order in which the indicators were supplied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Column-major values, `values[column][row]`
    values: Vec<Vec<f64>>,
}

impl AlignedTable {
    /// Assemble a table from parts that already satisfy the table invariants
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, columns: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self {
            dates,
            columns,
            values,
        }
    }

    /// Row dates, strictly increasing
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names in indicator order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Values of one indicator; fails with `MissingColumn` if it is absent
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values[idx].as_slice())
            .ok_or_else(|| ForecastError::MissingColumn {
                stage: Stage::SelectTarget,
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// A row as `(date, values in column order)`
    pub fn row(&self, index: usize) -> Option<(NaiveDate, Vec<f64>)> {
        let date = *self.dates.get(index)?;
        Some((date, self.values.iter().map(|col| col[index]).collect()))
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of indicator columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Split the table back into fully observed indicator series
    pub fn to_series(&self) -> Vec<IndicatorSeries> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(name, col)| {
                IndicatorSeries::new(
                    name.clone(),
                    self.dates.iter().copied().zip(col.iter().map(|v| Some(*v))).collect(),
                )
            })
            .collect()
    }

    /// Export as a polars DataFrame with a `date` column followed by one column per indicator
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.width() + 1);
        columns.push(Series::new("date", self.dates.as_slice()));
        for (name, values) in self.columns.iter().zip(self.values.iter()) {
            columns.push(Series::new(name, values.as_slice()));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Merge indicator series onto the union of their dates.
///
/// Gaps are forward-filled per indicator, then any row that still has a
/// missing cell is dropped. Rows before the latest-starting indicator's first
/// observation therefore never survive.
pub fn align(series: &[IndicatorSeries]) -> Result<AlignedTable> {
    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.name()) {
            return Err(ForecastError::InvalidParameter(format!(
                "Indicator '{}' supplied more than once",
                s.name()
            )));
        }
    }

    let union: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.dates().iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let filled: Vec<Vec<Option<f64>>> = series.iter().map(|s| forward_fill(s, &union)).collect();

    let keep: Vec<usize> = (0..union.len())
        .filter(|&row| filled.iter().all(|col| col[row].is_some()))
        .collect();

    let dates = keep.iter().map(|&row| union[row]).collect();
    let values = filled
        .iter()
        .map(|col| keep.iter().filter_map(|&row| col[row]).collect())
        .collect();
    let columns = series.iter().map(|s| s.name().to_string()).collect();

    Ok(AlignedTable::from_parts(dates, columns, values))
}

/// Project a series onto `index`, carrying the last observed value forward
fn forward_fill(series: &IndicatorSeries, index: &[NaiveDate]) -> Vec<Option<f64>> {
    let mut points = series.iter().peekable();
    let mut last = None;

    index
        .iter()
        .map(|date| {
            while let Some((d, value)) = points.peek().copied() {
                if d > *date {
                    break;
                }
                if value.is_some() {
                    last = value;
                }
                points.next();
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_forward_fill_and_drop() {
        let gold = IndicatorSeries::new(
            "gold",
            vec![
                (ymd(2023, 1, 1), Some(1.0)),
                (ymd(2023, 1, 2), None),
                (ymd(2023, 1, 4), Some(4.0)),
            ],
        );
        let cpi = IndicatorSeries::new("cpi", vec![(ymd(2023, 1, 2), Some(100.0))]);

        let table = align(&[gold, cpi]).unwrap();

        assert_eq!(table.dates(), &[ymd(2023, 1, 2), ymd(2023, 1, 4)]);
        assert_eq!(table.column("gold").unwrap(), &[1.0, 4.0]);
        assert_eq!(table.column("cpi").unwrap(), &[100.0, 100.0]);
        assert_eq!(table.row(1), Some((ymd(2023, 1, 4), vec![4.0, 100.0])));
    }

    #[test]
    fn test_missing_column() {
        let gold = IndicatorSeries::from_values("gold", vec![ymd(2023, 1, 1)], vec![1.0]).unwrap();
        let table = align(&[gold]).unwrap();

        match table.column("silver") {
            Err(ForecastError::MissingColumn { column, available, .. }) => {
                assert_eq!(column, "silver");
                assert_eq!(available, vec!["gold".to_string()]);
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let table = align(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = IndicatorSeries::from_values("gold", vec![ymd(2023, 1, 1)], vec![1.0]).unwrap();
        assert!(align(&[a.clone(), a]).is_err());
    }

    #[test]
    fn test_to_dataframe() {
        let gold = IndicatorSeries::from_values(
            "gold",
            vec![ymd(2023, 1, 1), ymd(2023, 1, 2)],
            vec![1.0, 2.0],
        )
        .unwrap();
        let df = align(&[gold]).unwrap().to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.get_column_names(), vec!["date", "gold"]);
    }
}
