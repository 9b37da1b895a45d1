//! Activities and their day-aligned workload intervals.
//!
//! Raw activity records arrive as JSON from the data-binding layer:
//!
//! ```json
//! { "name": "Design review",
//!   "intervals": [ { "start": "2026-03-02", "end": "2026-03-04", "totalMinutes": 720 } ] }
//! ```
//!
//! A record without `intervals` is its own single interval. Parsing is
//! tolerant: an interval whose dates cannot be parsed, or whose daily workload
//! is not a positive number, is dropped; an activity left without intervals is
//! dropped as a whole.

use std::ops::RangeInclusive;

use serde::Serialize;
use serde_json::Value;

use crate::day::{
    day_count, day_index, day_start, parse_instant, truncate_to_day, DayIndex, DAY_MS,
};

/// A constant daily workload over an inclusive range of UTC days.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInterval {
    /// Midnight of the first day.
    pub start: i64,
    /// Midnight of the last day (inclusive).
    pub end: i64,
    /// Workload contributed on every covered day, in minutes.
    pub minutes_per_day: f64,
}

impl ActivityInterval {
    /// Build an interval from two instants. The instants are truncated to
    /// their UTC midnight and swapped when given in reverse order.
    pub fn new(start: i64, end: i64, minutes_per_day: f64) -> Self {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        Self {
            start: truncate_to_day(start),
            end: truncate_to_day(end),
            minutes_per_day,
        }
    }

    /// Build an interval directly from day indices.
    pub fn from_days(first: DayIndex, last: DayIndex, minutes_per_day: f64) -> Self {
        Self::new(day_start(first), day_start(last), minutes_per_day)
    }

    pub fn first_day(&self) -> DayIndex {
        day_index(self.start)
    }

    pub fn last_day(&self) -> DayIndex {
        day_index(self.end)
    }

    /// The covered day indices.
    pub fn days(&self) -> RangeInclusive<DayIndex> {
        self.first_day()..=self.last_day()
    }

    pub fn day_count(&self) -> i64 {
        day_count(self.start, self.end)
    }

    pub fn covers(&self, day: DayIndex) -> bool {
        self.days().contains(&day)
    }

    pub fn shares_day_with(&self, other: &ActivityInterval) -> bool {
        self.first_day() <= other.last_day() && other.first_day() <= self.last_day()
    }

    /// Whether the interval should be drawn for the window `[from, to]`.
    ///
    /// The window is widened by one day on the left: an interval occupies its
    /// whole last day, so one ending on the day before `from` still reaches
    /// into the view.
    pub fn intersects_window(&self, from: i64, to: i64) -> bool {
        !(self.end.saturating_add(DAY_MS) < from || self.start > to)
    }

    fn from_raw(raw: &Value, default_minutes_per_day: f64) -> Option<Self> {
        let fields = raw.as_object()?;
        let start = parse_instant(fields.get("start")?)?;
        let end = parse_instant(fields.get("end")?)?;
        let mut interval = Self::new(start, end, 0.0);

        interval.minutes_per_day = match natural_number(fields.get("totalMinutes")) {
            Some(total) => total / interval.day_count() as f64,
            None => natural_number(fields.get("minutesPerDay")).unwrap_or(default_minutes_per_day),
        };

        // Also rejects NaN.
        if interval.minutes_per_day > 0.0 && interval.minutes_per_day.is_finite() {
            Some(interval)
        } else {
            None
        }
    }
}

/// A unit of work assigned to a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// The raw record the activity was parsed from.
    pub data: Value,
    /// Fallback stack offset for intervals without a computed one.
    pub top: f64,
    pub intervals: Vec<ActivityInterval>,
}

impl Activity {
    pub fn new(data: Value, intervals: Vec<ActivityInterval>) -> Self {
        Self {
            data,
            top: 0.0,
            intervals,
        }
    }

    /// Parse a raw activity record, or `None` when no interval survives.
    pub fn from_record(record: &Value, default_minutes_per_day: f64) -> Option<Self> {
        if !record.is_object() {
            return None;
        }
        let intervals: Vec<ActivityInterval> = match record.get("intervals") {
            Some(Value::Array(raw)) => raw
                .iter()
                .filter_map(|r| ActivityInterval::from_raw(r, default_minutes_per_day))
                .collect(),
            _ => ActivityInterval::from_raw(record, default_minutes_per_day)
                .into_iter()
                .collect(),
        };

        if intervals.is_empty() {
            None
        } else {
            Some(Self::new(record.clone(), intervals))
        }
    }

    /// The `name` field of the raw record, if any.
    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }
}

/// Round a JSON number (or numeric string) and keep it only when positive.
fn natural_number(value: Option<&Value>) -> Option<f64> {
    let raw = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let rounded = raw.round();
    if rounded.is_finite() && rounded > 0.0 {
        Some(rounded)
    } else {
        None
    }
}
