//! Chart-level driver: many resources, one calendar, one conflict stream.
//!
//! [`ResourceChart`] owns the rows of a resource chart and coordinates them the
//! way a renderer needs:
//!
//! - [`ResourceChart::calculate`] brings every resource up to date, grows the
//!   time axis over all intervals and derives row heights;
//! - [`ResourceChart::conflicts`] runs the conflict aggregator over a window;
//! - [`ResourceChart::render`] lays out a window into pixel rectangles for
//!   intervals and conflict bands.

use std::sync::Arc;

use serde::Serialize;

use crate::calendar::{CalendarAvailability, WorkCalendar};
use crate::config::ChartSettings;
use crate::conflict::{Conflict, ConflictAggregator, ConflictFormatter, TemplateFormatter};
use crate::day::{day_index, day_start};
use crate::layout::{conflict_rect, interval_rect, Bounds, LinearScale, Rect, TimeScale};
use crate::resource::{DrawIndex, Resource, ScheduleContext};

/// Gap between a conflict band and the activities below it, in pixels.
pub const ACTIVITIES_SPACING: f64 = 1.0;

/// Layout of one resource row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRow {
    pub resource: usize,
    pub name: Option<String>,
    pub top: f64,
    pub height: f64,
    pub max_occupation: f64,
    pub has_conflicts: bool,
}

/// A drawn activity interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInterval {
    pub resource: usize,
    pub activity: usize,
    pub interval: usize,
    pub visible_index: usize,
    pub global_index: usize,
    pub rect: Rect,
}

/// A drawn conflict band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameConflict {
    pub conflict: Conflict,
    pub rect: Rect,
}

/// Everything a renderer needs for one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub from: i64,
    pub to: i64,
    pub width: f64,
    pub height: f64,
    pub rows: Vec<FrameRow>,
    pub intervals: Vec<FrameInterval>,
    pub conflicts: Vec<FrameConflict>,
    /// Activity number of every drawn interval, by visible index.
    pub registry: Vec<usize>,
}

/// A resource chart: rows of activities evaluated against a calendar.
pub struct ResourceChart {
    settings: ChartSettings,
    calendar: Box<dyn CalendarAvailability>,
    resources: Vec<Resource>,
    names: Vec<Option<String>>,
    aggregator: ConflictAggregator,
    x_scale: TimeScale,
    max_occupation: f64,
    heights: Vec<f64>,
}

impl Default for ResourceChart {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceChart")
            .field("settings", &self.settings)
            .field("resources", &self.resources)
            .field("max_occupation", &self.max_occupation)
            .finish_non_exhaustive()
    }
}

fn schedule_context<'a>(
    calendar: &'a dyn CalendarAvailability,
    settings: &ChartSettings,
) -> ScheduleContext<'a> {
    ScheduleContext::new(calendar)
        .with_default_minutes_per_day(settings.effective_minutes_per_day())
        .with_availability_tracking(settings.time_tracking_mode.tracks_availability())
}

impl ResourceChart {
    /// An empty chart with default settings and the default work calendar.
    pub fn new() -> Self {
        Self {
            settings: ChartSettings::default(),
            calendar: Box::new(WorkCalendar::default()),
            resources: Vec::new(),
            names: Vec::new(),
            aggregator: ConflictAggregator::default(),
            x_scale: TimeScale::new(),
            max_occupation: 0.0,
            heights: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Apply new settings, invalidating whatever they affect.
    ///
    /// A new default workload re-parses activities; a new tracking mode
    /// reschedules. The conflict formatter is rebuilt from `conflict_format`.
    pub fn set_settings(&mut self, settings: ChartSettings) {
        let reparse =
            settings.effective_minutes_per_day() != self.settings.effective_minutes_per_day();
        let reschedule = settings.time_tracking_mode != self.settings.time_tracking_mode;

        for resource in &mut self.resources {
            if reparse {
                resource.invalidate_data();
            } else if reschedule {
                resource.invalidate_schedule();
            }
        }

        self.aggregator
            .set_formatter(TemplateFormatter::new(settings.conflict_format.clone()));
        self.settings = settings;
    }

    /// Replace the chart calendar used by resources without their own.
    pub fn set_calendar(&mut self, calendar: impl CalendarAvailability + 'static) {
        self.calendar = Box::new(calendar);
        for resource in &mut self.resources {
            if resource.calendar().is_none() {
                resource.invalidate_schedule();
            }
        }
    }

    /// Replace the conflict label formatter.
    pub fn set_conflict_formatter(&mut self, formatter: impl ConflictFormatter + 'static) {
        self.aggregator.set_formatter(formatter);
    }

    /// Append a resource row and return its index.
    pub fn add_resource(&mut self, name: Option<String>, records: Vec<serde_json::Value>) -> usize {
        let index = self.resources.len();
        self.resources.push(Resource::new(index, records));
        self.names.push(name);
        index
    }

    /// Replace the raw records of a row. Unknown indices are ignored.
    pub fn set_resource_records(&mut self, index: usize, records: Vec<serde_json::Value>) {
        if let Some(resource) = self.resources.get_mut(index) {
            resource.set_records(records);
        }
    }

    /// Give a row its own calendar. Unknown indices are ignored.
    pub fn set_resource_calendar(
        &mut self,
        index: usize,
        calendar: Option<Arc<dyn CalendarAvailability>>,
    ) {
        if let Some(resource) = self.resources.get_mut(index) {
            resource.set_calendar(calendar);
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, index: usize) -> Option<&Resource> {
        self.resources.get(index)
    }

    pub fn resource_name(&self, index: usize) -> Option<&str> {
        self.names.get(index)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Bring every resource up to date, grow the time axis and size rows.
    pub fn calculate(&mut self) {
        let ctx = schedule_context(self.calendar.as_ref(), &self.settings);
        self.x_scale.reset();

        let mut max_occupation: f64 = 0.0;
        for resource in &mut self.resources {
            resource.extend_x_scale(&ctx, &mut self.x_scale);
            max_occupation = max_occupation.max(resource.max_occupation(&ctx));
        }
        self.max_occupation = max_occupation;

        let shared = self.settings.time_tracking_mode.shared_y_scale();
        self.heights = self
            .resources
            .iter()
            .map(|resource| {
                let occupation = if shared {
                    max_occupation
                } else {
                    resource.outcome().max_occupation
                };
                let mut height = (self.settings.pix_per_hour * occupation / 60.0)
                    .max(self.settings.min_row_height)
                    + 2.0 * self.settings.cell_padding;
                if resource.has_conflicts() {
                    height += self.settings.conflict_height + ACTIVITIES_SPACING;
                }
                height
            })
            .collect();
    }

    /// Largest occupation over all rows, in minutes.
    pub fn max_occupation(&mut self) -> f64 {
        self.calculate();
        self.max_occupation
    }

    /// `(earliest start, latest end)` over all intervals of all rows.
    pub fn data_range(&mut self) -> Option<(i64, i64)> {
        self.calculate();
        self.x_scale.data_range()
    }

    /// Pixel heights of the rows, in row order.
    pub fn row_heights(&mut self) -> &[f64] {
        self.calculate();
        &self.heights
    }

    /// Occupation a row is scaled against: its own or the chart's.
    pub fn row_occupation(&mut self, index: usize) -> Option<f64> {
        self.calculate();
        let resource = self.resources.get(index)?;
        Some(if self.settings.time_tracking_mode.shared_y_scale() {
            self.max_occupation
        } else {
            resource.outcome().max_occupation
        })
    }

    /// Conflicts of all rows within `[from, to]`, rows stacked from top 0.
    pub fn conflicts(&mut self, from: i64, to: i64) -> Vec<Conflict> {
        self.calculate();
        let ctx = schedule_context(self.calendar.as_ref(), &self.settings);

        self.aggregator.clear();
        let mut row_top = 0.0;
        for (resource, height) in self.resources.iter_mut().zip(&self.heights) {
            resource.evaluate_conflicts(
                &ctx,
                from,
                to,
                &mut self.aggregator,
                row_top + self.settings.cell_padding,
            );
            row_top += height;
        }
        self.aggregator.take_conflicts()
    }

    /// Lay out the days of `[from, to]` over `width` pixels.
    pub fn render(&mut self, from: i64, to: i64, width: f64) -> Frame {
        self.calculate();
        let ctx = schedule_context(self.calendar.as_ref(), &self.settings);
        let settings = &self.settings;
        let shared = settings.time_tracking_mode.shared_y_scale();

        let (from_day, to_day) = (day_index(from), day_index(to));
        let scale = LinearScale::new(day_start(from_day), day_start(to_day + 1), width);

        let mut frame = Frame {
            from: day_start(from_day),
            to: day_start(to_day + 1),
            width,
            ..Frame::default()
        };
        let mut draw_index = DrawIndex::default();
        let mut row_bounds = Vec::with_capacity(self.resources.len());

        self.aggregator.clear();
        let mut row_top = 0.0;
        for (i, resource) in self.resources.iter_mut().enumerate() {
            let height = self.heights[i];
            let mut bounds = Bounds::new(
                0.0,
                row_top + settings.cell_padding,
                width,
                height - 2.0 * settings.cell_padding,
            );
            row_bounds.push(bounds);

            let has_conflicts =
                resource.evaluate_conflicts(&ctx, from, to, &mut self.aggregator, bounds.top);
            if has_conflicts {
                let status = settings.conflict_height + ACTIVITIES_SPACING;
                bounds.top += status;
                bounds.height -= status;
            }

            let occupation = if shared {
                self.max_occupation
            } else {
                resource.outcome().max_occupation
            };
            for visible in resource.select_visible(&ctx, from, to, &mut draw_index) {
                frame.intervals.push(FrameInterval {
                    resource: i,
                    activity: visible.activity,
                    interval: visible.interval,
                    visible_index: visible.visible_index,
                    global_index: visible.global_index,
                    rect: interval_rect(&visible, &bounds, occupation, &scale),
                });
            }

            frame.rows.push(FrameRow {
                resource: i,
                name: self.names[i].clone(),
                top: row_top,
                height,
                max_occupation: occupation,
                has_conflicts,
            });
            row_top += height;
        }

        frame.conflicts = self
            .aggregator
            .take_conflicts()
            .into_iter()
            .map(|conflict| {
                let rect = conflict_rect(
                    &conflict,
                    &row_bounds[conflict.resource],
                    settings.conflict_height,
                    &scale,
                );
                FrameConflict { conflict, rect }
            })
            .collect();
        frame.height = row_top;
        frame.registry = draw_index.registry;
        frame
    }
}
