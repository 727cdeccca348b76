//! Scalar coercions shared by the rule and query engines.
//!
//! Records are loosely typed JSON maps, so both engines go through these
//! helpers whenever they need a value as text, as a number or as a point in
//! time. None of them fail loudly: a value that cannot be coerced yields
//! `None` and the caller decides what that means.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

use crate::types::Timestamp;

/// Naive (offset-less) layouts accepted for timestamp strings.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Textual representation of a scalar value.
///
/// Strings are returned as-is, numbers and booleans via their JSON rendering.
/// Null, arrays and objects have no textual representation.
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `true` for null and for strings that are empty after trimming.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Interpret a value as an integer.
///
/// Floats are truncated toward zero; strings must parse as `i64` once trimmed.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a value as a finite float (numbers, or strings that parse as one).
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|f| f.is_finite())
}

/// Parse a timestamp and express it in `offset`.
///
/// Accepts RFC 3339 strings, naive date-times (interpreted in `offset`), bare
/// `YYYY-MM-DD` dates (midnight in `offset`) and integer epoch milliseconds.
pub fn parse_timestamp(value: &Value, offset: &FixedOffset) -> Option<Timestamp> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim(), offset),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(offset))
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str, offset: &FixedOffset) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(offset));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset.from_local_datetime(&naive).single()
}
