//! Tests for the day-indexed schedule fold and greedy stacking.

use occupancy_engine::calendar::WorkingSpan;
use occupancy_engine::day::{day_of_date, DayIndex};
use occupancy_engine::schedule::{build_schedule, DayCapacity};
use occupancy_engine::{Activity, ActivityInterval};
use serde_json::json;

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Monday 2026-03-02.
fn day0() -> DayIndex {
    day_of_date(chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
}

/// A calendar granting 09:00-17:00 (480 minutes) every day.
fn eight_hours(_: DayIndex) -> Vec<WorkingSpan> {
    vec![WorkingSpan::from_minutes(9 * 60, 17 * 60)]
}

fn activity(intervals: Vec<ActivityInterval>) -> Activity {
    Activity::new(json!({}), intervals)
}

fn on_days(first: DayIndex, last: DayIndex, minutes: f64) -> ActivityInterval {
    ActivityInterval::from_days(first, last, minutes)
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn single_interval_within_capacity() {
    // Scenario A: 480 allocated against 480 vacant is not a conflict.
    let d = day0();
    let activities = vec![activity(vec![on_days(d, d, 480.0)])];

    let outcome = build_schedule(&activities, &eight_hours, false);

    assert!(!outcome.has_conflicts);
    let allocation = outcome.schedule.get(d).unwrap();
    assert_eq!(allocation.allocated, 480.0);
    assert_eq!(allocation.vacant(), 480.0);
    assert_eq!(outcome.stacking.top(0, 0), Some(0.0));
    assert_eq!(outcome.max_occupation, 480.0);
}

#[test]
fn second_interval_on_same_day_stacks_and_conflicts() {
    // Scenario B: 480 + 60 > 480, the second interval sits on top of the first.
    let d = day0();
    let activities = vec![
        activity(vec![on_days(d, d, 480.0)]),
        activity(vec![on_days(d, d, 60.0)]),
    ];

    let outcome = build_schedule(&activities, &eight_hours, false);

    assert!(outcome.has_conflicts);
    assert_eq!(outcome.schedule.get(d).unwrap().allocated, 540.0);
    assert_eq!(outcome.stacking.top(1, 0), Some(480.0));
    assert_eq!(outcome.max_occupation, 540.0);
}

#[test]
fn disjoint_days_do_not_stack() {
    // Scenario C
    let d = day0();
    let activities = vec![
        activity(vec![on_days(d, d, 300.0)]),
        activity(vec![on_days(d + 1, d + 1, 300.0)]),
    ];

    assert!(!activities[0].intervals[0].shares_day_with(&activities[1].intervals[0]));

    let outcome = build_schedule(&activities, &eight_hours, false);

    assert_eq!(outcome.stacking.top(0, 0), Some(0.0));
    assert_eq!(outcome.stacking.top(1, 0), Some(0.0));
    assert!(!outcome.has_conflicts);
}

#[test]
fn holiday_is_never_conflicting_and_untracked() {
    // Scenario E: day0 + 1 has no working time.
    let d = day0();
    let calendar = move |day: DayIndex| {
        if day == d + 1 {
            Vec::new()
        } else {
            vec![WorkingSpan::from_minutes(9 * 60, 17 * 60)]
        }
    };
    let activities = vec![
        activity(vec![on_days(d, d + 2, 400.0)]),
        activity(vec![on_days(d + 1, d + 1, 400.0)]),
    ];

    let outcome = build_schedule(&activities, &calendar, false);

    let holiday = outcome.schedule.get(d + 1).unwrap();
    assert_eq!(holiday.capacity, DayCapacity::Unavailable);
    assert_eq!(holiday.activities(), None);
    assert_eq!(holiday.allocated, 0.0);
    assert!(!holiday.is_overallocated());
    assert!(!outcome.has_conflicts);
}

// ── Stacking ────────────────────────────────────────────────────────────────

#[test]
fn interval_top_is_max_over_all_covered_days() {
    // A on day 1 (0..60), B on day 2 (0..100), C spans days 1-2 and must sit
    // above both, D on day 1 then sits above C.
    let d = day0();
    let activities = vec![
        activity(vec![on_days(d, d, 60.0)]),
        activity(vec![on_days(d + 1, d + 1, 100.0)]),
        activity(vec![on_days(d, d + 1, 50.0)]),
        activity(vec![on_days(d, d, 10.0)]),
    ];

    let outcome = build_schedule(&activities, &eight_hours, false);

    assert_eq!(outcome.stacking.top(2, 0), Some(100.0));
    assert_eq!(outcome.stacking.top(3, 0), Some(150.0));
    assert_eq!(outcome.schedule.get(d).unwrap().bottom, 160.0);
    assert_eq!(outcome.schedule.get(d + 1).unwrap().bottom, 150.0);
    assert_eq!(outcome.max_occupation, 160.0);
}

#[test]
fn holiday_receives_bottom_update() {
    let d = day0();
    let calendar = move |day: DayIndex| {
        if day == d {
            Vec::new()
        } else {
            vec![WorkingSpan::from_minutes(0, 480)]
        }
    };
    let activities = vec![activity(vec![on_days(d, d + 1, 120.0)])];

    let outcome = build_schedule(&activities, &calendar, false);

    assert_eq!(outcome.schedule.get(d).unwrap().bottom, 120.0);
    assert_eq!(outcome.schedule.get(d + 1).unwrap().bottom, 120.0);
}

#[test]
fn holiday_only_interval_stays_at_the_base() {
    // Holidays take no part in finding the top, so an interval covering only
    // holidays sits at zero and shares its band with whatever spans them.
    let d = day0();
    let calendar = move |day: DayIndex| {
        if day == d {
            Vec::new()
        } else {
            vec![WorkingSpan::from_minutes(0, 480)]
        }
    };
    let activities = vec![
        activity(vec![on_days(d, d + 1, 120.0)]),
        activity(vec![on_days(d, d, 60.0)]),
        activity(vec![on_days(d, d + 1, 30.0)]),
    ];

    let outcome = build_schedule(&activities, &calendar, false);

    assert_eq!(outcome.stacking.top(1, 0), Some(0.0));
    // The working day still stacks the third interval above the first.
    assert_eq!(outcome.stacking.top(2, 0), Some(120.0));
    assert_eq!(outcome.schedule.get(d).unwrap().bottom, 150.0);
}

// ── Allocation bookkeeping ──────────────────────────────────────────────────

#[test]
fn contributing_activities_are_listed_once_in_fold_order() {
    let d = day0();
    let activities = vec![
        activity(vec![on_days(d, d, 60.0), on_days(d, d, 30.0)]),
        activity(vec![on_days(d, d + 1, 60.0)]),
    ];

    let outcome = build_schedule(&activities, &eight_hours, false);

    assert_eq!(outcome.schedule.get(d).unwrap().activities(), Some(&[0, 1][..]));
    assert_eq!(outcome.schedule.get(d + 1).unwrap().activities(), Some(&[1][..]));
    assert_eq!(outcome.schedule.get(d).unwrap().allocated, 150.0);
}

#[test]
fn availability_tracking_counts_vacancy_in_max_occupation() {
    let d = day0();
    let activities = vec![activity(vec![on_days(d, d, 60.0)])];

    let plain = build_schedule(&activities, &eight_hours, false);
    let tracked = build_schedule(&activities, &eight_hours, true);

    assert_eq!(plain.max_occupation, 60.0);
    assert_eq!(tracked.max_occupation, 480.0);
}

#[test]
fn schedule_only_contains_covered_days() {
    let d = day0();
    let activities = vec![
        activity(vec![on_days(d, d + 2, 60.0)]),
        activity(vec![on_days(d + 5, d + 5, 60.0)]),
    ];

    let outcome = build_schedule(&activities, &eight_hours, false);

    let days: Vec<DayIndex> = outcome.schedule.iter().map(|(day, _)| day).collect();
    assert_eq!(days, vec![d, d + 1, d + 2, d + 5]);
    assert_eq!(outcome.schedule.first_day(), Some(d));
    assert_eq!(outcome.schedule.last_day(), Some(d + 5));
}

#[test]
fn empty_activity_list_yields_empty_schedule() {
    let outcome = build_schedule(&[], &eight_hours, true);
    assert!(outcome.schedule.is_empty());
    assert_eq!(outcome.max_occupation, 0.0);
    assert!(!outcome.has_conflicts);
}
