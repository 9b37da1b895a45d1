//! Chart settings and the JSON chart document format.
//!
//! A chart document bundles everything needed to evaluate a set of resources:
//!
//! ```json
//! {
//!   "settings": { "timeTrackingMode": "availability-per-chart", "defaultMinutesPerDay": 60 },
//!   "calendar": { "weekendRange": [5, 6], "workingHours": [["09:00", "17:00"]] },
//!   "resources": [
//!     { "name": "Alice",
//!       "activities": [
//!         { "name": "Audit", "start": "2026-03-02", "end": "2026-03-04", "minutesPerDay": 240 }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Every field is optional; defaults follow the stock resource chart theme.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar::{CalendarAvailability, CalendarConfig, WorkCalendar};
use crate::chart::ResourceChart;
use crate::conflict::DEFAULT_CONFLICT_FORMAT;
use crate::error::{EngineError, Result};
use crate::resource::DEFAULT_MINUTES_PER_DAY;

/// How rows are scaled vertically.
///
/// `availability-*` modes count vacant capacity towards the maximum
/// occupation; `*-per-chart` modes share one vertical scale across rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeTrackingMode {
    AvailabilityPerChart,
    AvailabilityPerResource,
    ActivityPerChart,
    #[default]
    ActivityPerResource,
}

impl TimeTrackingMode {
    pub fn tracks_availability(self) -> bool {
        matches!(
            self,
            TimeTrackingMode::AvailabilityPerChart | TimeTrackingMode::AvailabilityPerResource
        )
    }

    pub fn shared_y_scale(self) -> bool {
        matches!(
            self,
            TimeTrackingMode::AvailabilityPerChart | TimeTrackingMode::ActivityPerChart
        )
    }
}

/// Chart-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSettings {
    /// Daily workload for records without `minutesPerDay`/`totalMinutes`.
    pub default_minutes_per_day: f64,
    /// Row height per hour of occupation, in pixels.
    pub pix_per_hour: f64,
    pub min_row_height: f64,
    /// Vertical padding above and below each row's content.
    pub cell_padding: f64,
    /// Height of the conflict band drawn above a conflicting row.
    pub conflict_height: f64,
    pub time_tracking_mode: TimeTrackingMode,
    /// Template for conflict labels, see `TemplateFormatter`.
    pub conflict_format: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            default_minutes_per_day: DEFAULT_MINUTES_PER_DAY,
            pix_per_hour: 25.0,
            min_row_height: 50.0,
            cell_padding: 2.0,
            conflict_height: 15.0,
            time_tracking_mode: TimeTrackingMode::default(),
            conflict_format: DEFAULT_CONFLICT_FORMAT.to_string(),
        }
    }
}

impl ChartSettings {
    /// The default daily workload, or the stock value when the configured one
    /// is not a positive number.
    pub fn effective_minutes_per_day(&self) -> f64 {
        let rounded = self.default_minutes_per_day.round();
        if rounded.is_finite() && rounded > 0.0 {
            rounded
        } else {
            DEFAULT_MINUTES_PER_DAY
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("pixPerHour", self.pix_per_hour),
            ("minRowHeight", self.min_row_height),
            ("cellPadding", self.cell_padding),
            ("conflictHeight", self.conflict_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidDocument(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One resource row of a chart document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceDocument {
    pub name: Option<String>,
    /// Own calendar; the chart calendar applies when absent.
    pub calendar: Option<CalendarConfig>,
    /// Raw activity records.
    pub activities: Vec<Value>,
}

/// A full chart: settings, default calendar and resource rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartDocument {
    pub settings: ChartSettings,
    pub calendar: Option<CalendarConfig>,
    pub resources: Vec<ResourceDocument>,
}

impl ChartDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a chart, validating settings and calendars.
    pub fn into_chart(self) -> Result<ResourceChart> {
        self.settings.validate()?;

        let mut chart = ResourceChart::new();
        chart.set_settings(self.settings);
        if let Some(config) = self.calendar {
            chart.set_calendar(WorkCalendar::try_from(config)?);
        }

        for resource in self.resources {
            let index = chart.add_resource(resource.name, resource.activities);
            if let Some(config) = resource.calendar {
                let calendar: Arc<dyn CalendarAvailability> =
                    Arc::new(WorkCalendar::try_from(config)?);
                chart.set_resource_calendar(index, Some(calendar));
            }
        }

        Ok(chart)
    }
}
