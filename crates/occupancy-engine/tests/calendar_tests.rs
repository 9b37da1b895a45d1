//! Tests for the stock work calendar and its JSON configuration.

use chrono::NaiveDate;
use occupancy_engine::calendar::{CalendarAvailability, CalendarConfig, WorkCalendar, WorkingSpan};
use occupancy_engine::day::{day_of_date, DayIndex};
use occupancy_engine::EngineError;

fn day(year: i32, month: u32, d: u32) -> DayIndex {
    day_of_date(NaiveDate::from_ymd_opt(year, month, d).unwrap())
}

fn date(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap()
}

// ── Default calendar ────────────────────────────────────────────────────────

#[test]
fn default_calendar_works_weekdays_around_the_clock() {
    let calendar = WorkCalendar::default();

    // 2026-03-06 is a Friday, 2026-03-07 a Saturday.
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 6)), 1439.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 7)), 0.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 8)), 0.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 9)), 1439.0);
}

#[test]
fn always_available_has_no_weekend() {
    let calendar = WorkCalendar::always_available();
    assert_eq!(calendar.weekend(), None);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 7)), 1439.0);
}

#[test]
fn holidays_and_overrides_resolve_in_order() {
    let mut calendar = WorkCalendar::default()
        .with_working_hours(vec![WorkingSpan::from_minutes(9 * 60, 17 * 60)]);
    calendar.add_holiday(date(2026, 3, 3));
    calendar.add_holiday(date(2026, 3, 4));
    // An override beats both a holiday and the weekend.
    calendar.set_day_schedule(date(2026, 3, 4), vec![WorkingSpan::from_minutes(9 * 60, 11 * 60)]);
    calendar.set_day_schedule(date(2026, 3, 7), vec![WorkingSpan::from_minutes(10 * 60, 14 * 60)]);

    assert_eq!(calendar.vacant_minutes(day(2026, 3, 2)), 480.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 3)), 0.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 4)), 120.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 7)), 240.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 8)), 0.0);
}

#[test]
fn custom_weekend_range() {
    // Friday and Saturday off.
    let calendar = WorkCalendar::default().with_weekend(5, 4);
    assert_eq!(calendar.weekend(), Some((4, 5)));
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 6)), 0.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 8)), 1439.0);
}

// ── Configuration ───────────────────────────────────────────────────────────

#[test]
fn config_builds_calendar() {
    let config: CalendarConfig = serde_json::from_str(
        r#"{
            "weekendRange": [5, 6],
            "workingHours": [["09:00", "13:00"], ["14:00", "18:00"]],
            "holidays": ["2026-03-03"],
            "days": { "2026-03-07": [["10:00", "24:00"]] }
        }"#,
    )
    .unwrap();

    let calendar = WorkCalendar::try_from(config).unwrap();

    assert_eq!(calendar.vacant_minutes(day(2026, 3, 2)), 480.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 3)), 0.0);
    assert_eq!(calendar.vacant_minutes(day(2026, 3, 7)), 840.0);
}

#[test]
fn empty_weekend_range_disables_weekends() {
    let config: CalendarConfig = serde_json::from_str(r#"{"weekendRange": []}"#).unwrap();
    let calendar = WorkCalendar::try_from(config).unwrap();
    assert_eq!(calendar.weekend(), None);
}

#[test]
fn empty_config_is_the_default_calendar() {
    let calendar = WorkCalendar::try_from(CalendarConfig::default()).unwrap();
    assert_eq!(calendar, WorkCalendar::default());
}

#[test]
fn invalid_config_is_rejected() {
    let cases = [
        r#"{"weekendRange": [5, 9]}"#,
        r#"{"weekendRange": [5]}"#,
        r#"{"workingHours": [["17:00", "09:00"]]}"#,
        r#"{"workingHours": [["9am", "5pm"]]}"#,
        r#"{"holidays": ["03/03/2026"]}"#,
    ];
    for json in cases {
        let config: CalendarConfig = serde_json::from_str(json).unwrap();
        let result = WorkCalendar::try_from(config);
        assert!(
            matches!(result, Err(EngineError::InvalidCalendar(_))),
            "expected InvalidCalendar for {}",
            json
        );
    }
}
