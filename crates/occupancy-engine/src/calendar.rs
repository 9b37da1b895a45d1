//! Working-time calendars: how many minutes a resource can work on a given day.
//!
//! The engine only ever asks a calendar one question, through
//! [`CalendarAvailability::day_schedule`]: which sub-intervals of a UTC day are
//! working time. Vacant capacity is the sum of those sub-intervals in minutes,
//! and an empty list marks the day as fully unavailable.
//!
//! [`WorkCalendar`] is the stock implementation. It resolves a day in this order:
//!
//! 1. an explicit per-date schedule override,
//! 2. a holiday date (no working time),
//! 3. the weekend range (no working time),
//! 4. the regular working hours.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::day::{date_of_day, DayIndex, DAY_MS, MINUTE_MS};
use crate::error::{EngineError, Result};

/// A working sub-interval of a day, as millisecond offsets from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSpan {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl WorkingSpan {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Span between two wall-clock times given in minutes after midnight.
    pub fn from_minutes(start: i64, end: i64) -> Self {
        Self::new(start * MINUTE_MS, end * MINUTE_MS)
    }

    /// The default working day: midnight up to the last minute of the day,
    /// i.e. 1439 working minutes.
    pub fn whole_day() -> Self {
        Self::new(0, DAY_MS - MINUTE_MS)
    }

    /// Length of the span in milliseconds; inverted spans count as zero.
    pub fn duration_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }
}

/// Source of per-day working capacity.
///
/// Implementations must be deterministic for a given day index. A day whose
/// vacancy cannot be determined must report an empty schedule, which the
/// engine treats as "fully unavailable".
pub trait CalendarAvailability {
    /// Working sub-intervals of `day`.
    fn day_schedule(&self, day: DayIndex) -> Vec<WorkingSpan>;

    /// Vacant working capacity of `day`, in minutes.
    fn vacant_minutes(&self, day: DayIndex) -> f64 {
        let total: i64 = self
            .day_schedule(day)
            .iter()
            .map(WorkingSpan::duration_ms)
            .sum();
        total as f64 / MINUTE_MS as f64
    }
}

impl<F> CalendarAvailability for F
where
    F: Fn(DayIndex) -> Vec<WorkingSpan>,
{
    fn day_schedule(&self, day: DayIndex) -> Vec<WorkingSpan> {
        self(day)
    }
}

/// Weekly working-time calendar with holidays and per-date overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    /// Inclusive ISO weekday range that is not worked (0 = Monday).
    weekend: Option<(u32, u32)>,
    working_hours: Vec<WorkingSpan>,
    holidays: BTreeSet<NaiveDate>,
    overrides: BTreeMap<NaiveDate, Vec<WorkingSpan>>,
}

impl Default for WorkCalendar {
    /// Saturday and Sunday off, every other day worked around the clock.
    fn default() -> Self {
        Self {
            weekend: Some((5, 6)),
            working_hours: vec![WorkingSpan::whole_day()],
            holidays: BTreeSet::new(),
            overrides: BTreeMap::new(),
        }
    }
}

impl WorkCalendar {
    /// A calendar without weekends or holidays.
    pub fn always_available() -> Self {
        Self {
            weekend: None,
            ..Self::default()
        }
    }

    /// Set the inclusive weekend range in ISO weekday numbers (0 = Monday).
    pub fn with_weekend(mut self, from: u32, to: u32) -> Self {
        self.weekend = Some((from.min(to), from.max(to)));
        self
    }

    /// Work every day of the week.
    pub fn without_weekend(mut self) -> Self {
        self.weekend = None;
        self
    }

    /// Replace the regular working hours.
    pub fn with_working_hours(mut self, spans: Vec<WorkingSpan>) -> Self {
        self.working_hours = spans;
        self
    }

    /// Mark a date as fully unavailable.
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Give a date its own working schedule, overriding holidays and weekends.
    pub fn set_day_schedule(&mut self, date: NaiveDate, spans: Vec<WorkingSpan>) {
        self.overrides.insert(date, spans);
    }

    pub fn weekend(&self) -> Option<(u32, u32)> {
        self.weekend
    }

    pub fn working_hours(&self) -> &[WorkingSpan] {
        &self.working_hours
    }

    fn is_weekend(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_monday();
        matches!(self.weekend, Some((from, to)) if weekday >= from && weekday <= to)
    }
}

impl CalendarAvailability for WorkCalendar {
    fn day_schedule(&self, day: DayIndex) -> Vec<WorkingSpan> {
        let Some(date) = date_of_day(day) else {
            return Vec::new();
        };
        if let Some(spans) = self.overrides.get(&date) {
            return spans.clone();
        }
        if self.holidays.contains(&date) || self.is_weekend(date) {
            return Vec::new();
        }
        self.working_hours.clone()
    }
}

// ---------------------------------------------------------------------------
// JSON configuration
// ---------------------------------------------------------------------------

/// Serializable calendar description used by chart documents.
///
/// ```json
/// {
///   "weekendRange": [5, 6],
///   "workingHours": [["09:00", "13:00"], ["14:00", "18:00"]],
///   "holidays": ["2026-01-01"],
///   "days": { "2026-03-07": [["10:00", "14:00"]] }
/// }
/// ```
///
/// An absent `weekendRange` keeps Saturday/Sunday; an empty one disables
/// weekends. Times are `HH:MM`, with `24:00` allowed as an end of day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarConfig {
    pub weekend_range: Option<Vec<u32>>,
    pub working_hours: Option<Vec<[String; 2]>>,
    pub holidays: Vec<String>,
    pub days: BTreeMap<String, Vec<[String; 2]>>,
}

impl TryFrom<CalendarConfig> for WorkCalendar {
    type Error = EngineError;

    fn try_from(config: CalendarConfig) -> Result<Self> {
        let mut calendar = WorkCalendar::default();

        if let Some(range) = config.weekend_range {
            calendar = match range.as_slice() {
                [] => calendar.without_weekend(),
                [from, to] if *from <= 6 && *to <= 6 => calendar.with_weekend(*from, *to),
                other => {
                    return Err(EngineError::InvalidCalendar(format!(
                        "weekendRange must be two weekday numbers in 0..=6, got {:?}",
                        other
                    )))
                }
            };
        }

        if let Some(hours) = config.working_hours {
            calendar = calendar.with_working_hours(parse_spans(&hours)?);
        }

        for raw in &config.holidays {
            calendar.add_holiday(parse_date(raw)?);
        }

        for (raw, spans) in &config.days {
            calendar.set_day_schedule(parse_date(raw)?, parse_spans(spans)?);
        }

        Ok(calendar)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidCalendar(format!("invalid date '{}': {}", raw, e)))
}

fn parse_time_of_day(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw == "24:00" {
        return Ok(DAY_MS);
    }
    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|e| EngineError::InvalidCalendar(format!("invalid time '{}': {}", raw, e)))?;
    Ok(i64::from(time.num_seconds_from_midnight()) * 1000)
}

fn parse_spans(raw: &[[String; 2]]) -> Result<Vec<WorkingSpan>> {
    raw.iter()
        .map(|[from, to]| {
            let span = WorkingSpan::new(parse_time_of_day(from)?, parse_time_of_day(to)?);
            if span.start_ms >= span.end_ms {
                return Err(EngineError::InvalidCalendar(format!(
                    "working span {}-{} is empty",
                    from, to
                )));
            }
            Ok(span)
        })
        .collect()
}
