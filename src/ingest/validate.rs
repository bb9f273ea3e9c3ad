//! Field coercion
//!
//! Each function turns one untyped value into its semantic type. `Ok(None)`
//! means the value is absent (null or blank) and carries no warning.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::{record::Bounds, warning::WarningReason};

pub type Coerced<T> = Result<Option<T>, WarningReason>;

/// Currency symbols, whitespace and percent signs.
static NUMERIC_NOISE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[\s%$€£¥₹]").unwrap());

/// Comma-grouped thousands such as `1,099` or `-12,345,678.5`. Any other comma
/// is left in place and fails to parse.
static GROUPED_THOUSANDS: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d*)?$").unwrap());

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub fn coerce_string(value: &Value) -> Coerced<String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_owned()))
        }
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(WarningReason::TypeMismatch),
    }
}

fn parse_number(value: &Value) -> Coerced<f64> {
    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = NUMERIC_NOISE.replace_all(s, "");
            if cleaned.is_empty() {
                return Ok(None);
            }
            if GROUPED_THOUSANDS.is_match(&cleaned) {
                cleaned.replace(',', "").parse::<f64>().ok()
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    match number {
        Some(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(WarningReason::TypeMismatch),
    }
}

/// A real number without bounds checking.
pub fn coerce_real(value: &Value) -> Coerced<f64> {
    parse_number(value)
}

/// A real number that must lie within `bounds`.
pub fn coerce_bounded(value: &Value, bounds: Bounds) -> Coerced<f64> {
    match parse_number(value)? {
        Some(number) if bounds.contains(number) => Ok(Some(number)),
        Some(_) => Err(WarningReason::OutOfRange),
        None => Ok(None),
    }
}

/// A non-negative integer. Floats are accepted when they have no fraction.
pub fn coerce_count(value: &Value) -> Coerced<u64> {
    if let Value::Number(n) = value
        && let Some(count) = n.as_u64()
    {
        return Ok(Some(count));
    }
    match parse_number(value)? {
        Some(number) if number.fract() != 0.0 => Err(WarningReason::TypeMismatch),
        Some(number) if number < 0.0 || number >= u64::MAX as f64 => {
            Err(WarningReason::OutOfRange)
        }
        Some(number) => Ok(Some(number as u64)),
        None => Ok(None),
    }
}

/// A calendar date; timestamps are truncated to their date.
pub fn coerce_date(value: &Value) -> Coerced<NaiveDate> {
    let s = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim(),
        _ => return Err(WarningReason::TypeMismatch),
    };
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(datetime.date_naive()));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|datetime| Some(datetime.date()))
        .ok_or(WarningReason::TypeMismatch)
}
