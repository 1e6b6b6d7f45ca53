//! Boundary validation.
//!
//! Callers validate raw input here before invoking any core operation; the
//! core assumes everything it receives is well-formed. Each function returns
//! `Error::Validation` with a caller-facing message.

use crate::types::DateRange;
use crate::{Error, Result};
use chrono::NaiveDate;

/// Validate a height/weight measurement (meters, kilograms)
///
/// Both values must be strictly positive finite numbers.
pub fn measurement(height: f64, weight: f64) -> Result<()> {
    if !height.is_finite() || height <= 0.0 {
        return Err(Error::Validation(format!(
            "height must be a positive number of meters, got {}",
            height
        )));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a positive number of kilograms, got {}",
            weight
        )));
    }
    Ok(())
}

/// Validate a history result cap
pub fn limit(raw: i64) -> Result<usize> {
    if raw <= 0 {
        return Err(Error::Validation(format!(
            "limit must be a positive integer, got {}",
            raw
        )));
    }
    Ok(raw as usize)
}

/// Parse a strict YYYY-MM-DD calendar date
pub fn date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        Error::Validation(format!("invalid date '{}': {} (expected YYYY-MM-DD)", raw, e))
    })
}

/// Build a date range from optional raw boundaries
///
/// Each boundary is validated independently. An inverted range is accepted
/// and simply matches nothing.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    Ok(DateRange {
        start: start.map(date).transpose()?,
        end: end.map(date).transpose()?,
    })
}
