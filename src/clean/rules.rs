//! Per-type coercion rules
//!
//! Each rule reads a column as text and returns a new typed column of the
//! same length. A malformed cell never fails a rule; it becomes null or the
//! type's default. Columns that are already typed (a batch cleaned before)
//! are cast back to text first, so running a rule twice gives the same
//! output.

use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// Text values that mean "missing" after trimming
const NULL_MARKERS: [&str; 3] = ["", "nan", "None"];

/// Lower-cased values that count as `true`
pub const TRUTH_SET: [&str; 4] = ["yes", "y", "true", "1"];

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%b %d %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A coerced column and how many of its cells were nulled or defaulted
#[derive(Debug, Clone)]
pub struct Coerced {
    /// The typed column
    pub array: ArrayRef,
    /// Cells that lost their value (null for text/float/date, 0 for integer)
    pub replaced: usize,
}

/// View any column as UTF-8 text
fn as_text(column: &ArrayRef) -> Result<StringArray> {
    let text = if column.data_type() == &DataType::Utf8 {
        Arc::clone(column)
    } else {
        cast(column, &DataType::Utf8)?
    };

    text.as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| Error::decode(format!("Cannot read {} column as text", column.data_type())))
}

/// Trim and null out missing-value markers
pub fn clean_text(column: &ArrayRef) -> Result<Coerced> {
    let text = as_text(column)?;
    let cleaned: StringArray = text
        .iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|v| !NULL_MARKERS.contains(v))
        })
        .collect();

    let replaced = cleaned.null_count();
    Ok(Coerced {
        array: Arc::new(cleaned),
        replaced,
    })
}

/// Parse a decimal number; non-finite values count as unparseable
pub fn parse_float(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Decimal numbers; unparseable cells become null
pub fn clean_float(column: &ArrayRef) -> Result<Coerced> {
    let text = as_text(column)?;
    let cleaned: Float64Array = text.iter().map(|value| value.and_then(parse_float)).collect();

    let replaced = cleaned.null_count();
    Ok(Coerced {
        array: Arc::new(cleaned),
        replaced,
    })
}

/// Parse a decimal number and truncate it towards zero
pub fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }

    let v = parse_float(value)?.trunc();
    if v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Integers; unparseable or missing cells become 0
pub fn clean_integer(column: &ArrayRef) -> Result<Coerced> {
    let text = as_text(column)?;
    let mut replaced = 0;
    let values: Vec<i64> = text
        .iter()
        .map(|value| {
            value.and_then(parse_integer).unwrap_or_else(|| {
                replaced += 1;
                0
            })
        })
        .collect();

    Ok(Coerced {
        array: Arc::new(Int64Array::from(values)),
        replaced,
    })
}

/// Parse a date in any of the accepted layouts; datetimes are truncated
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Days since the Unix epoch, as stored in a Date32 column
fn days_since_epoch(date: NaiveDate) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from(date.signed_duration_since(epoch).num_days()).ok()
}

/// Calendar dates; unparseable cells become null
pub fn clean_date(column: &ArrayRef) -> Result<Coerced> {
    let text = as_text(column)?;
    let cleaned: Date32Array = text
        .iter()
        .map(|value| value.and_then(parse_date).and_then(days_since_epoch))
        .collect();

    let replaced = cleaned.null_count();
    Ok(Coerced {
        array: Arc::new(cleaned),
        replaced,
    })
}

/// Truth-set membership of the lower-cased raw text
pub fn parse_boolean(value: &str) -> bool {
    TRUTH_SET.contains(&value.to_lowercase().as_str())
}

/// Booleans; anything outside the truth set, including null, is false
pub fn clean_boolean(column: &ArrayRef) -> Result<Coerced> {
    let text = as_text(column)?;
    let values: Vec<bool> = text
        .iter()
        .map(|value| value.is_some_and(parse_boolean))
        .collect();

    Ok(Coerced {
        array: Arc::new(BooleanArray::from(values)),
        replaced: 0,
    })
}
