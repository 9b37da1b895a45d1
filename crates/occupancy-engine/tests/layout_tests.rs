//! Tests for the pixel geometry handed to the renderer.

use occupancy_engine::conflict::{Conflict, ConflictContext};
use occupancy_engine::day::DAY_MS;
use occupancy_engine::layout::{
    conflict_rect, interval_rect, Bounds, DataRange, LinearScale, TimeScale,
};
use occupancy_engine::resource::VisibleInterval;

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Four days over 400px.
fn scale() -> LinearScale {
    LinearScale::new(0, 4 * DAY_MS, 400.0)
}

fn visible(first_day: i64, last_day: i64, top: f64, minutes_per_day: f64) -> VisibleInterval {
    VisibleInterval {
        activity: 0,
        interval: 0,
        visible_index: 0,
        global_index: 0,
        start: first_day * DAY_MS,
        end: last_day * DAY_MS,
        minutes_per_day,
        top,
    }
}

fn conflict(start_day: i64, end_day: i64, top: f64) -> Conflict {
    Conflict {
        index: 0,
        text: "1h (12.5%)".to_string(),
        start: start_day * DAY_MS,
        end: end_day * DAY_MS,
        resource: 0,
        top,
        context: ConflictContext {
            date: start_day * DAY_MS,
            minutes: 60.0,
            hours: 1.0,
            hours_rounded: 1.0,
            percent: 12.5,
            allocated: 540.0,
            vacant: 480.0,
            activities: Vec::new(),
        },
    }
}

// ── Scales ──────────────────────────────────────────────────────────────────

#[test]
fn time_scale_grows_to_cover_every_range() {
    let mut range = TimeScale::new();
    assert_eq!(range.data_range(), None);

    range.extend_data_range(3 * DAY_MS, 5 * DAY_MS);
    range.extend_data_range(DAY_MS, 2 * DAY_MS);
    assert_eq!(range.data_range(), Some((DAY_MS, 5 * DAY_MS)));

    range.reset();
    assert_eq!(range.data_range(), None);
}

#[test]
fn linear_scale_maps_window_to_pixels() {
    let scale = scale();
    assert_eq!(scale.to_pix(0), 0.0);
    assert_eq!(scale.to_pix(DAY_MS), 100.0);
    assert_eq!(scale.to_pix(4 * DAY_MS), 400.0);
    // An empty window collapses onto the origin.
    assert_eq!(LinearScale::new(DAY_MS, DAY_MS, 400.0).to_pix(2 * DAY_MS), 0.0);
}

// ── Rectangles ──────────────────────────────────────────────────────────────

#[test]
fn bounds_report_their_edges() {
    let bounds = Bounds::new(10.0, 20.0, 300.0, 50.0);
    assert_eq!(bounds.right(), 310.0);
    assert_eq!(bounds.bottom(), 70.0);
}

#[test]
fn interval_rect_scales_minutes_into_the_row() {
    // 120px for 480 minutes: a quarter pixel per minute.
    let bounds = Bounds::new(0.0, 10.0, 400.0, 120.0);

    let rect = interval_rect(&visible(1, 2, 120.0, 240.0), &bounds, 480.0, &scale());

    assert_eq!(rect.left, 100.0);
    assert_eq!(rect.right, 300.0);
    assert_eq!(rect.top, 40.0);
    assert_eq!(rect.bottom, 100.0);
}

#[test]
fn interval_rect_is_cut_at_the_row_bottom() {
    // A stack taller than the occupation the row was scaled for.
    let bounds = Bounds::new(0.0, 10.0, 400.0, 120.0);

    let rect = interval_rect(&visible(0, 0, 360.0, 240.0), &bounds, 480.0, &scale());

    assert_eq!(rect.top, 100.0);
    assert_eq!(rect.bottom, bounds.bottom());
}

#[test]
fn interval_rect_without_occupation_is_flat() {
    let bounds = Bounds::new(0.0, 10.0, 400.0, 100.0);

    let rect = interval_rect(&visible(0, 0, 0.0, 60.0), &bounds, 0.0, &scale());

    assert_eq!(rect.top, 10.0);
    assert_eq!(rect.bottom, 10.0);
}

#[test]
fn conflict_rect_is_clamped_horizontally() {
    let bounds = Bounds::new(0.0, 0.0, 400.0, 100.0);

    // Opens before the window and closes after it.
    let rect = conflict_rect(&conflict(-2, 6, 2.0), &bounds, 15.0, &scale());

    assert_eq!(rect.left, 0.0);
    assert_eq!(rect.right, bounds.right());
    assert_eq!(rect.top, 2.0);
    assert_eq!(rect.bottom, 17.0);
}
