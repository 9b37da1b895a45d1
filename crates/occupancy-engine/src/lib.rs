//! # occupancy-engine
//!
//! Resource allocation and conflict detection for resource-utilization charts.
//!
//! Given resources (people, machines) with time-bounded activities that each
//! carry a daily workload, the engine computes a day-indexed occupancy
//! schedule, detects days allocated beyond the capacity a calendar grants, and
//! stacks overlapping activities so they can be drawn without collisions.
//!
//! ## Quick start
//!
//! ```rust
//! use occupancy_engine::{Resource, ScheduleContext, WorkCalendar};
//! use serde_json::json;
//!
//! let calendar = WorkCalendar::always_available();
//! let ctx = ScheduleContext::new(&calendar);
//!
//! let mut resource = Resource::new(0, vec![
//!     json!({"start": "2026-03-02", "end": "2026-03-03", "minutesPerDay": 900}),
//!     json!({"start": "2026-03-03", "end": "2026-03-03", "minutesPerDay": 900}),
//! ]);
//! resource.calculate(&ctx);
//!
//! assert!(resource.has_conflicts());
//! assert_eq!(resource.interval_top(1, 0), Some(900.0));
//! ```
//!
//! ## Modules
//!
//! - [`day`] — UTC day indices and instant parsing
//! - [`calendar`] — Working-time calendars (`CalendarAvailability`, `WorkCalendar`)
//! - [`activity`] — Activities and their intervals, parsed from raw records
//! - [`schedule`] — Per-day allocations and greedy stacking
//! - [`resource`] — Memoized per-resource computation and draw selection
//! - [`conflict`] — Merging over-allocated days into conflict periods
//! - [`layout`] — Pixel geometry for intervals and conflict bands
//! - [`chart`] — Chart-level driver over many resources
//! - [`config`] — Chart settings and the JSON chart document
//! - [`error`] — Error types

pub mod activity;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod conflict;
pub mod day;
pub mod error;
pub mod layout;
pub mod resource;
pub mod schedule;

pub use activity::{Activity, ActivityInterval};
pub use calendar::{CalendarAvailability, CalendarConfig, WorkCalendar, WorkingSpan};
pub use chart::{Frame, ResourceChart};
pub use config::{ChartDocument, ChartSettings, TimeTrackingMode};
pub use conflict::{
    Conflict, ConflictAggregator, ConflictContext, ConflictFormatter, TemplateFormatter,
};
pub use day::{day_index, DayIndex, DAY_MS};
pub use error::EngineError;
pub use resource::{Resource, ResourceState, ScheduleContext};
pub use schedule::{build_schedule, Allocation, DayCapacity, Schedule, ScheduleOutcome};
