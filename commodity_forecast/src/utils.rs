//! Date helpers shared by the loader, resampler and forecaster

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y", "%Y.%m.%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Parse a calendar date, dropping any time-of-day component.
///
/// Accepts ISO dates, slash and compact variants, and RFC 3339 timestamps.
/// Year-last slash dates are read day-first or month-first when only one
/// order gives a valid date; ambiguous ones such as `01/02/2020` are rejected.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    // Year-last slash dates are accepted when only one day/month order is valid
    let month_first = NaiveDate::parse_from_str(s, "%m/%d/%Y").ok();
    let day_first = NaiveDate::parse_from_str(s, "%d/%m/%Y").ok();
    match (month_first, day_first) {
        (Some(a), Some(b)) if a == b => return Ok(a),
        (Some(date), None) | (None, Some(date)) => return Ok(date),
        (Some(_), Some(_)) => {
            return Err(ForecastError::InvalidParameter(format!(
                "Ambiguous date '{}': day and month order cannot be determined",
                raw
            )))
        }
        (None, None) => {}
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    Err(ForecastError::InvalidParameter(format!(
        "Unrecognised date '{}'",
        raw
    )))
}

/// Last calendar day of the month containing `date`
pub fn month_end(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| ForecastError::InvalidParameter(format!("Date {} is out of range", date)))
}

/// Month-end dates for the `horizon` months following `last`
pub fn future_month_ends(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(horizon);
    let mut current = month_end(last)?;

    for _ in 0..horizon {
        let next = current
            .succ_opt()
            .ok_or_else(|| ForecastError::InvalidParameter(format!("Date {} is out of range", current)))?;
        current = month_end(next)?;
        dates.push(current);
    }

    Ok(dates)
}
