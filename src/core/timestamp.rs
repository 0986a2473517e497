use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::core::{Row, Scalar};

/// Sentinel returned when a cell carries no usable time.
pub const UNPARSEABLE_TIMESTAMP: i64 = 0;

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

// Offset-less inputs are interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Normalizes a cell into epoch milliseconds.
///
/// Numbers pass through unchanged (truncated to an integer). Strings of
/// exactly 13 digits are epoch milliseconds, exactly 10 digits epoch seconds;
/// anything else goes through date parsing. Returns
/// [`UNPARSEABLE_TIMESTAMP`] when nothing matches.
#[must_use]
pub fn parse_timestamp(value: &Scalar) -> i64 {
    match value {
        Scalar::Number(number) if number.is_finite() => *number as i64,
        Scalar::Number(_) => UNPARSEABLE_TIMESTAMP,
        other => parse_timestamp_str(&other.to_display_string()),
    }
}

#[must_use]
pub fn parse_timestamp_str(text: &str) -> i64 {
    if is_all_digits(text, 13) {
        return text.parse::<i64>().unwrap_or(UNPARSEABLE_TIMESTAMP);
    }
    if is_all_digits(text, 10) {
        return text
            .parse::<i64>()
            .map(|seconds| seconds * 1000)
            .unwrap_or(UNPARSEABLE_TIMESTAMP);
    }
    parse_datetime_millis(text.trim()).unwrap_or(UNPARSEABLE_TIMESTAMP)
}

/// Parsed time of `row[field]`, or `None` when the row must be left out of
/// time-indexed output (absent cell or unparseable value).
#[must_use]
pub fn row_timestamp(row: &Row, field: &str) -> Option<i64> {
    let millis = parse_timestamp(row.get(field)?);
    (millis != UNPARSEABLE_TIMESTAMP).then_some(millis)
}

fn is_all_digits(text: &str, len: usize) -> bool {
    text.len() == len && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_datetime_millis(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.timestamp_millis());
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.timestamp_millis());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc().timestamp_millis());
        }
    }
    None
}
