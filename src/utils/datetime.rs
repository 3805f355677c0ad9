//! Timestamp parsing and formatting for upstream registry payloads.
//!
//! The replication API emits zone-less ISO timestamps (`2000-02-05T20:25:30.000`)
//! while Datafordeler emits RFC 3339 with an offset. Zone-less values are read as UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, de};

/// Formats tried, in order, for timestamps without an offset
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a timestamp with multiple format attempts
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a date for the `DAFTimestampFra`/`DAFTimestampTil` query parameters
///
/// Dates before year 1 are clamped to `0001-01-01`, the earliest date upstream accepts.
#[must_use]
pub fn format_query_date(dt: &DateTime<Utc>) -> String {
    if dt.year() < 1 {
        return "0001-01-01".to_string();
    }
    dt.format("%Y-%m-%d").to_string()
}

/// Serde helper for required timestamps
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{s}'")))
}

/// Serde helper for optional timestamps, blank strings read as `None`
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{s}'"))),
        _ => Ok(None),
    }
}
