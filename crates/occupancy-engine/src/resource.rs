//! A schedulable resource (person, machine) and its memoized occupancy.
//!
//! A [`Resource`] keeps the raw activity records of one chart row and derives
//! everything else from them on demand:
//!
//! - parsed [`Activity`] values, rebuilt when the records change;
//! - the [`Schedule`], stacking offsets, maximum occupation and conflict flag,
//!   rebuilt when the activities or the calendar change.
//!
//! Staleness is tracked by [`ResourceState`]. Every read goes through
//! [`Resource::calculate`], which does only the work the state asks for, so
//! calling it repeatedly is cheap and yields identical results.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::activity::Activity;
use crate::calendar::CalendarAvailability;
use crate::conflict::ConflictAggregator;
use crate::day::{day_index, day_start};
use crate::layout::DataRange;
use crate::schedule::{build_schedule, Schedule, ScheduleOutcome};

/// Daily workload assumed for records that specify none.
pub const DEFAULT_MINUTES_PER_DAY: f64 = 60.0;

/// What a resource has to recompute before its derived data can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Activities and schedule match the current records and calendar.
    Fresh,
    /// Raw records changed: re-parse activities, then reschedule.
    NeedsReparse,
    /// Activities are current but the schedule is not (calendar or settings).
    NeedsRescheduleOnly,
}

/// Chart-level inputs of a schedule computation.
#[derive(Clone, Copy)]
pub struct ScheduleContext<'a> {
    /// Calendar used by resources without their own.
    pub calendar: &'a dyn CalendarAvailability,
    pub default_minutes_per_day: f64,
    /// Count vacancy towards the maximum occupation.
    pub track_availability: bool,
}

impl<'a> ScheduleContext<'a> {
    pub fn new(calendar: &'a dyn CalendarAvailability) -> Self {
        Self {
            calendar,
            default_minutes_per_day: DEFAULT_MINUTES_PER_DAY,
            track_availability: false,
        }
    }

    pub fn with_default_minutes_per_day(mut self, minutes: f64) -> Self {
        self.default_minutes_per_day = minutes;
        self
    }

    pub fn with_availability_tracking(mut self, track: bool) -> Self {
        self.track_availability = track;
        self
    }
}

/// Running counters of a render pass, shared by all resources of a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawIndex {
    /// Next activity number across the whole chart.
    pub global_index: usize,
    /// Activity number of every drawn interval, by visible index.
    pub registry: Vec<usize>,
}

/// An interval selected for drawing, with its precomputed stack offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleInterval {
    pub activity: usize,
    pub interval: usize,
    pub visible_index: usize,
    pub global_index: usize,
    pub start: i64,
    pub end: i64,
    pub minutes_per_day: f64,
    pub top: f64,
}

/// One chart row: activities plus the occupancy derived from them.
pub struct Resource {
    index: usize,
    records: Vec<Value>,
    calendar: Option<Arc<dyn CalendarAvailability>>,
    activities: Vec<Activity>,
    outcome: ScheduleOutcome,
    visible: Vec<Vec<Option<usize>>>,
    state: ResourceState,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("index", &self.index)
            .field("state", &self.state)
            .field("activities", &self.activities.len())
            .field("has_own_calendar", &self.calendar.is_some())
            .finish_non_exhaustive()
    }
}

impl Resource {
    /// Create the resource of chart row `index` from its raw activity records.
    pub fn new(index: usize, records: Vec<Value>) -> Self {
        Self {
            index,
            records,
            calendar: None,
            activities: Vec::new(),
            outcome: ScheduleOutcome::default(),
            visible: Vec::new(),
            state: ResourceState::NeedsReparse,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Replace the raw records; activities are re-parsed on next use.
    pub fn set_records(&mut self, records: Vec<Value>) {
        self.records = records;
        self.invalidate_data();
    }

    /// Give the resource its own calendar, or `None` to use the chart's.
    pub fn set_calendar(&mut self, calendar: Option<Arc<dyn CalendarAvailability>>) {
        self.calendar = calendar;
        self.invalidate_schedule();
    }

    pub fn calendar(&self) -> Option<&Arc<dyn CalendarAvailability>> {
        self.calendar.as_ref()
    }

    pub fn invalidate_data(&mut self) {
        self.state = ResourceState::NeedsReparse;
    }

    /// Force a reschedule, keeping parsed activities when they are current.
    pub fn invalidate_schedule(&mut self) {
        if self.state == ResourceState::Fresh {
            self.state = ResourceState::NeedsRescheduleOnly;
        }
    }

    /// Bring activities and schedule up to date.
    ///
    /// The context is not part of the memoization key: a caller that changes
    /// the chart calendar or settings must invalidate the resource first.
    pub fn calculate(&mut self, ctx: &ScheduleContext<'_>) {
        if self.state == ResourceState::NeedsReparse {
            self.activities = self
                .records
                .iter()
                .filter_map(|record| Activity::from_record(record, ctx.default_minutes_per_day))
                .collect();
            debug!(
                resource = self.index,
                records = self.records.len(),
                activities = self.activities.len(),
                "activities parsed"
            );
            self.state = ResourceState::NeedsRescheduleOnly;
        }

        if self.state == ResourceState::NeedsRescheduleOnly {
            let calendar: &dyn CalendarAvailability = match &self.calendar {
                Some(own) => own.as_ref(),
                None => ctx.calendar,
            };
            self.outcome = build_schedule(&self.activities, calendar, ctx.track_availability);
            self.visible = self
                .activities
                .iter()
                .map(|activity| vec![None; activity.intervals.len()])
                .collect();
            self.state = ResourceState::Fresh;
        }
    }

    /// Maximum occupation in minutes, used to scale the row vertically.
    pub fn max_occupation(&mut self, ctx: &ScheduleContext<'_>) -> f64 {
        self.calculate(ctx);
        self.outcome.max_occupation
    }

    /// Whether the last computed schedule has an over-allocated day.
    pub fn has_conflicts(&self) -> bool {
        self.outcome.has_conflicts
    }

    /// The last computed schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.outcome.schedule
    }

    /// The last computed fold result.
    pub fn outcome(&self) -> &ScheduleOutcome {
        &self.outcome
    }

    pub fn activity(&self, index: usize) -> Option<&Activity> {
        self.activities.get(index)
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activities_count(&self) -> usize {
        self.activities.len()
    }

    /// Stack offset of an interval, falling back to the activity's own `top`.
    pub fn interval_top(&self, activity: usize, interval: usize) -> Option<f64> {
        let fallback = self.activities.get(activity)?.top;
        Some(
            self.outcome
                .stacking
                .top(activity, interval)
                .unwrap_or(fallback),
        )
    }

    /// Visible index assigned to an interval by the last [`select_visible`]
    /// pass, `None` when it was outside the window.
    ///
    /// [`select_visible`]: Resource::select_visible
    pub fn visible_index(&self, activity: usize, interval: usize) -> Option<usize> {
        self.visible.get(activity)?.get(interval).copied().flatten()
    }

    /// Extend `scale`'s data range with every interval.
    pub fn extend_x_scale(&mut self, ctx: &ScheduleContext<'_>, scale: &mut impl DataRange) {
        self.calculate(ctx);
        for interval in self.activities.iter().flat_map(|a| &a.intervals) {
            scale.extend_data_range(interval.start, interval.end);
        }
    }

    /// Pick the intervals to draw for the window `[from, to]`.
    ///
    /// Each activity consumes one number from `index.global_index`; each
    /// visible interval gets the next dense visible index. Stack offsets come
    /// from the last schedule and are never recomputed here, so panning does
    /// not move intervals vertically.
    pub fn select_visible(
        &mut self,
        ctx: &ScheduleContext<'_>,
        from: i64,
        to: i64,
        index: &mut DrawIndex,
    ) -> Vec<VisibleInterval> {
        self.calculate(ctx);
        let mut selected = Vec::new();

        for (a, activity) in self.activities.iter().enumerate() {
            let global_index = index.global_index;
            index.global_index += 1;

            for (i, interval) in activity.intervals.iter().enumerate() {
                if !interval.intersects_window(from, to) {
                    self.visible[a][i] = None;
                    continue;
                }
                let visible_index = index.registry.len();
                index.registry.push(global_index);
                self.visible[a][i] = Some(visible_index);

                selected.push(VisibleInterval {
                    activity: a,
                    interval: i,
                    visible_index,
                    global_index,
                    start: interval.start,
                    end: interval.end,
                    minutes_per_day: interval.minutes_per_day,
                    top: self
                        .outcome
                        .stacking
                        .top(a, i)
                        .unwrap_or(activity.top),
                });
            }
        }

        selected
    }

    /// Feed the days of `[from, to]` into `aggregator`, then flush it.
    ///
    /// Nothing is evaluated when the resource has no conflict at all. Returns
    /// whether it has conflicts, which tells the caller to reserve room for a
    /// conflict band.
    pub fn evaluate_conflicts(
        &mut self,
        ctx: &ScheduleContext<'_>,
        from: i64,
        to: i64,
        aggregator: &mut ConflictAggregator,
        top: f64,
    ) -> bool {
        self.calculate(ctx);
        if !self.outcome.has_conflicts {
            return false;
        }

        let this: &Resource = self;
        let (from_day, to_day) = (day_index(from), day_index(to));
        for day in from_day..=to_day {
            aggregator.evaluate(day_start(day), this.schedule().get(day), this, top);
        }
        aggregator.evaluate(day_start(to_day + 1), None, this, top);
        true
    }
}
