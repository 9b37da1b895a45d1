//! Day-indexed occupancy schedule and greedy interval stacking.
//!
//! [`build_schedule`] folds every interval of every activity, strictly in list
//! order, into one [`Allocation`] per covered UTC day. The same fold assigns
//! each interval a vertical offset (its "top", in minutes) so that intervals
//! sharing a day never share a vertical band on that day.
//!
//! Each interval is handled in two passes over the days it covers:
//!
//! 1. accumulate the workload and find the tallest stack (`bottom`) among all
//!    covered days; that height becomes the interval's top;
//! 2. raise `bottom` of every covered day to `top + minutes_per_day`.
//!
//! The top is the maximum over *all* covered days, not just the first one, so
//! an interval overlapping only part of another's range still clears it.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::activity::Activity;
use crate::calendar::CalendarAvailability;
use crate::day::DayIndex;

/// Working capacity of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DayCapacity {
    /// Holiday or other day without working time. Workload is not tracked.
    Unavailable,
    /// Working day with `vacant` minutes and the indices of the activities
    /// that contributed workload, in fold order.
    Available { vacant: f64, contributing: Vec<usize> },
}

/// Vacant capacity versus allocated workload for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub capacity: DayCapacity,
    /// Sum of `minutes_per_day` over the intervals covering the day.
    pub allocated: f64,
    /// Height of the stack reached on this day, in minutes.
    pub bottom: f64,
}

impl Allocation {
    pub fn new(vacant: f64) -> Self {
        let capacity = if vacant > 0.0 {
            DayCapacity::Available {
                vacant,
                contributing: Vec::new(),
            }
        } else {
            DayCapacity::Unavailable
        };
        Self {
            capacity,
            allocated: 0.0,
            bottom: 0.0,
        }
    }

    pub fn vacant(&self) -> f64 {
        match &self.capacity {
            DayCapacity::Available { vacant, .. } => *vacant,
            DayCapacity::Unavailable => 0.0,
        }
    }

    /// Contributing activity indices, `None` on unavailable days.
    pub fn activities(&self) -> Option<&[usize]> {
        match &self.capacity {
            DayCapacity::Available { contributing, .. } => Some(contributing),
            DayCapacity::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.capacity, DayCapacity::Available { .. })
    }

    pub fn is_overallocated(&self) -> bool {
        self.allocated > self.vacant()
    }
}

/// Allocations keyed by day index, in day order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    days: BTreeMap<DayIndex, Allocation>,
}

impl Schedule {
    pub fn get(&self, day: DayIndex) -> Option<&Allocation> {
        self.days.get(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayIndex, &Allocation)> {
        self.days.iter().map(|(day, allocation)| (*day, allocation))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_day(&self) -> Option<DayIndex> {
        self.days.keys().next().copied()
    }

    pub fn last_day(&self) -> Option<DayIndex> {
        self.days.keys().next_back().copied()
    }
}

/// Stack offsets computed for every interval, addressed by
/// `(activity index, interval index)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stacking {
    tops: Vec<Vec<f64>>,
}

impl Stacking {
    pub fn top(&self, activity: usize, interval: usize) -> Option<f64> {
        self.tops.get(activity)?.get(interval).copied()
    }

    /// Offsets of one activity's intervals.
    pub fn activity_tops(&self, activity: usize) -> &[f64] {
        self.tops.get(activity).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Everything derived from one fold over a resource's activities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleOutcome {
    pub schedule: Schedule,
    pub stacking: Stacking,
    /// Maximum stack height (and vacancy, when availability is tracked).
    pub max_occupation: f64,
    /// Whether any day is allocated beyond its vacancy.
    pub has_conflicts: bool,
}

/// Fold `activities` into a fresh schedule.
///
/// The fold order (activities, then intervals, both in list order) decides
/// the stacking and must not be changed. With `track_availability` the
/// maximum occupation also covers every touched day's vacancy, so rows are
/// scaled to show free capacity.
pub fn build_schedule(
    activities: &[Activity],
    calendar: &dyn CalendarAvailability,
    track_availability: bool,
) -> ScheduleOutcome {
    let mut days: BTreeMap<DayIndex, Allocation> = BTreeMap::new();
    let mut tops = Vec::with_capacity(activities.len());
    let mut max_occupation: f64 = 0.0;
    let mut has_conflicts = false;

    for (activity_index, activity) in activities.iter().enumerate() {
        let mut activity_tops = Vec::with_capacity(activity.intervals.len());

        for interval in &activity.intervals {
            let thickness = interval.minutes_per_day;
            let mut interval_top: f64 = 0.0;

            for day in interval.days() {
                let allocation = days
                    .entry(day)
                    .or_insert_with(|| Allocation::new(calendar.vacant_minutes(day)));

                let DayCapacity::Available {
                    vacant,
                    contributing,
                } = &mut allocation.capacity
                else {
                    continue;
                };

                // Activities are folded one after another, so the current one
                // can only ever be the last contributor.
                if contributing.last() != Some(&activity_index) {
                    contributing.push(activity_index);
                }
                allocation.allocated += thickness;
                if allocation.allocated > *vacant {
                    has_conflicts = true;
                }
                interval_top = interval_top.max(allocation.bottom);
            }

            let bottom = interval_top + thickness;
            for day in interval.days() {
                if let Some(allocation) = days.get_mut(&day) {
                    allocation.bottom = bottom;
                    if track_availability {
                        max_occupation = max_occupation.max(allocation.vacant());
                    }
                    max_occupation = max_occupation.max(bottom);
                }
            }

            activity_tops.push(interval_top);
        }

        tops.push(activity_tops);
    }

    debug!(
        activities = activities.len(),
        days = days.len(),
        max_occupation,
        has_conflicts,
        "schedule rebuilt"
    );

    ScheduleOutcome {
        schedule: Schedule { days },
        stacking: Stacking { tops },
        max_occupation,
        has_conflicts,
    }
}
