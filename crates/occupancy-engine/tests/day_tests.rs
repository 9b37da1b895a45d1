//! Tests for UTC day arithmetic and instant parsing.

use chrono::NaiveDate;
use occupancy_engine::day::{
    date_of_day, day_count, day_index, day_of_date, day_start, parse_instant, truncate_to_day,
    DAY_MS, MINUTE_MS,
};
use serde_json::json;

#[test]
fn day_index_floors_negative_timestamps() {
    assert_eq!(day_index(0), 0);
    assert_eq!(day_index(DAY_MS - 1), 0);
    assert_eq!(day_index(-1), -1);
    assert_eq!(truncate_to_day(-1), -DAY_MS);
}

#[test]
fn date_conversion_is_symmetric() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let day = day_of_date(date);
    assert_eq!(date_of_day(day), Some(date));
    assert_eq!(date_of_day(0), NaiveDate::from_ymd_opt(1970, 1, 1));
}

#[test]
fn parses_all_supported_instant_shapes() {
    let midnight = day_start(day_of_date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
    assert_eq!(parse_instant(&json!("2026-03-02")), Some(midnight));
    assert_eq!(
        parse_instant(&json!("2026-03-02T01:00:00Z")),
        Some(midnight + 60 * MINUTE_MS)
    );
    assert_eq!(
        parse_instant(&json!("2026-03-02T01:00:00")),
        Some(midnight + 60 * MINUTE_MS)
    );
    assert_eq!(parse_instant(&json!(midnight)), Some(midnight));
    assert_eq!(parse_instant(&json!(midnight.to_string())), Some(midnight));
    assert_eq!(parse_instant(&json!("not a date")), None);
    assert_eq!(parse_instant(&json!(null)), None);
    assert_eq!(parse_instant(&json!(true)), None);
}

#[test]
fn day_count_is_inclusive() {
    assert_eq!(day_count(0, 0), 1);
    assert_eq!(day_count(0, 2 * DAY_MS), 3);
}

#[test]
fn out_of_range_instants_are_rejected() {
    assert_eq!(parse_instant(&json!(-9_223_372_036_854_775_000_i64)), None);
    assert_eq!(parse_instant(&json!(i64::MAX)), None);
    assert_eq!(parse_instant(&json!(9e18)), None);
    assert_eq!(parse_instant(&json!("-9000000000000000000")), None);
    // Year 200000 is still representable.
    assert_eq!(parse_instant(&json!(6_249_223_622_400_000_i64)), Some(6_249_223_622_400_000));
}

#[test]
fn day_arithmetic_saturates() {
    assert_eq!(day_start(i64::MAX), i64::MAX);
    assert_eq!(day_start(i64::MIN), i64::MIN);
    assert_eq!(truncate_to_day(i64::MIN), i64::MIN);
    assert_eq!(day_count(i64::MIN, i64::MAX), i64::MAX / DAY_MS + 1);
}
