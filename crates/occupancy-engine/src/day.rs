//! UTC day arithmetic shared by the schedule, conflict and layout modules.
//!
//! Every instant handled by the engine is an epoch-millisecond timestamp that
//! has already been normalized to UTC. Days are bucketed by
//! `floor(ts / DAY_MS)`, which keeps the schedule keyed by a plain integer.
//! Parsed instants are limited to the range chrono can represent, so day
//! arithmetic on them cannot overflow.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Milliseconds in one UTC day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Milliseconds in one minute.
pub const MINUTE_MS: i64 = 60 * 1000;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// A UTC-calendar-day bucket key: `floor(timestamp_ms / DAY_MS)`.
pub type DayIndex = i64;

/// Day index of a timestamp. Uses floor division so pre-1970 instants land on
/// the day they belong to.
pub fn day_index(timestamp_ms: i64) -> DayIndex {
    timestamp_ms.div_euclid(DAY_MS)
}

/// Timestamp of the midnight that opens `day`, saturating at the `i64` bounds.
pub fn day_start(day: DayIndex) -> i64 {
    day.saturating_mul(DAY_MS)
}

/// Truncate a timestamp to its UTC midnight.
pub fn truncate_to_day(timestamp_ms: i64) -> i64 {
    day_start(day_index(timestamp_ms))
}

/// Number of days covered by the inclusive, day-aligned range `[start, end]`.
pub fn day_count(start_ms: i64, end_ms: i64) -> i64 {
    end_ms.saturating_sub(start_ms) / DAY_MS + 1
}

/// Day index of a calendar date.
pub fn day_of_date(date: NaiveDate) -> DayIndex {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Calendar date of a day index, `None` outside chrono's supported range.
pub fn date_of_day(day: DayIndex) -> Option<NaiveDate> {
    let days = i32::try_from(day + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

/// Parse a date or datetime string into an epoch-millisecond timestamp.
///
/// Accepts RFC 3339 (`2026-03-02T09:00:00Z`), naive datetimes interpreted as
/// UTC (`2026-03-02T09:00:00`, `2026-03-02 09:00:00`), bare dates
/// (`2026-03-02`) and numeric strings holding epoch milliseconds.
pub fn parse_instant_str(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(day_start(day_of_date(date)));
    }
    s.parse::<f64>().ok().and_then(finite_millis)
}

/// Parse a JSON value (number or string) into an epoch-millisecond timestamp.
///
/// Numbers outside the range of [`DateTime<Utc>`] are rejected.
pub fn parse_instant(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(ms) => representable(ms),
            None => n.as_f64().and_then(finite_millis),
        },
        Value::String(s) => parse_instant_str(s),
        _ => None,
    }
}

fn finite_millis(v: f64) -> Option<i64> {
    if v.is_finite() && v.abs() < i64::MAX as f64 {
        representable(v.trunc() as i64)
    } else {
        None
    }
}

fn representable(ms: i64) -> Option<i64> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|_| ms)
}
