//! Target-instant parsing.
//!
//! Accepts the forms widget markup tends to carry: RFC 3339 timestamps,
//! ISO-like date/time strings, long-form dates ("December 31, 2040") and
//! Unix epoch milliseconds. Strings without an offset are read as wall time
//! in the client zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%B %d %Y", "%m/%d/%Y"];

/// Parse a target instant, interpreting zone-less forms in `zone`.
///
/// Returns `None` for anything unrecognized, and for local times that do
/// not exist in `zone` (inside a spring-forward gap).
pub fn parse_instant<Z: TimeZone>(raw: &str, zone: &Z) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        let ms: i64 = raw.parse().ok()?;
        return DateTime::<Utc>::from_timestamp_millis(ms);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
