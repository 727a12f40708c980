//! Monthly downsampling of an aligned table

use crate::align::AlignedTable;
use crate::error::Result;
use crate::utils::month_end;
use chrono::Datelike;
use std::ops::Deref;

/// An aligned table with one row per calendar month, dated at month end
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyTable(AlignedTable);

impl MonthlyTable {
    /// The underlying table
    pub fn as_table(&self) -> &AlignedTable {
        &self.0
    }

    pub fn into_table(self) -> AlignedTable {
        self.0
    }
}

impl Deref for MonthlyTable {
    type Target = AlignedTable;

    fn deref(&self) -> &AlignedTable {
        &self.0
    }
}

/// Keep the last row of every calendar month, relabelled with the month's final day.
///
/// Months without rows are skipped rather than filled.
pub fn monthly_resample(table: &AlignedTable) -> Result<MonthlyTable> {
    let dates = table.dates();
    let mut last_rows: Vec<usize> = Vec::new();

    for (row, date) in dates.iter().enumerate() {
        let same_month = dates
            .get(row + 1)
            .map(|next| next.year() == date.year() && next.month() == date.month())
            .unwrap_or(false);
        if !same_month {
            last_rows.push(row);
        }
    }

    let month_ends = last_rows
        .iter()
        .map(|&row| month_end(dates[row]))
        .collect::<Result<Vec<_>>>()?;

    let values = table
        .columns()
        .iter()
        .map(|name| -> Result<Vec<f64>> {
            let col = table.column(name)?;
            Ok(last_rows.iter().map(|&row| col[row]).collect())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MonthlyTable(AlignedTable::from_parts(
        month_ends,
        table.columns().to_vec(),
        values,
    )))
}
