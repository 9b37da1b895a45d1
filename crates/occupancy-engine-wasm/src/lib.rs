//! WASM bindings for occupancy-engine.
//!
//! Exposes schedule computation, conflict detection and chart layout to
//! JavaScript via `wasm-bindgen`. Chart documents go in and results come out as
//! JSON strings; see `occupancy_engine::config` for the document format.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p occupancy-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/occupancy-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/occupancy_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use occupancy_engine::day::{date_of_day, parse_instant_str, DayIndex};
use occupancy_engine::{ChartDocument, Conflict, DayCapacity, Resource, ResourceChart};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayDto {
    date: String,
    available: bool,
    vacant: f64,
    allocated: f64,
    bottom: f64,
    activities: Vec<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceScheduleDto {
    resource: usize,
    name: Option<String>,
    max_occupation: f64,
    has_conflicts: bool,
    /// Stack offset of every interval, by activity.
    tops: Vec<Vec<f64>>,
    days: Vec<DayDto>,
}

impl ResourceScheduleDto {
    fn new(chart: &ResourceChart, resource: &Resource) -> Self {
        let outcome = resource.outcome();
        let days = outcome
            .schedule
            .iter()
            .map(|(day, allocation)| DayDto {
                date: format_day(day),
                available: allocation.is_available(),
                vacant: allocation.vacant(),
                allocated: allocation.allocated,
                bottom: allocation.bottom,
                activities: match &allocation.capacity {
                    DayCapacity::Available { contributing, .. } => contributing.clone(),
                    DayCapacity::Unavailable => Vec::new(),
                },
            })
            .collect();

        Self {
            resource: resource.index(),
            name: chart.resource_name(resource.index()).map(str::to_string),
            max_occupation: outcome.max_occupation,
            has_conflicts: outcome.has_conflicts,
            tops: (0..resource.activities_count())
                .map(|a| outcome.stacking.activity_tops(a).to_vec())
                .collect(),
            days,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictDto {
    index: usize,
    resource: usize,
    text: String,
    start: String,
    end: String,
    top: f64,
}

impl From<&Conflict> for ConflictDto {
    fn from(c: &Conflict) -> Self {
        Self {
            index: c.index,
            resource: c.resource,
            text: c.text.clone(),
            start: format_instant(c.start),
            end: format_instant(c.end),
            top: c.top,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn format_day(day: DayIndex) -> String {
    date_of_day(day)
        .map(|date| date.to_string())
        .unwrap_or_else(|| day.to_string())
}

fn format_instant(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

fn parse_date(s: &str) -> Result<i64, String> {
    parse_instant_str(s).ok_or_else(|| format!("Invalid date '{}'", s))
}

fn load_chart(document_json: &str) -> Result<ResourceChart, String> {
    ChartDocument::from_json(document_json)
        .and_then(ChartDocument::into_chart)
        .map_err(|e| format!("Invalid chart document: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn schedule_json(document_json: &str) -> Result<String, String> {
    let mut chart = load_chart(document_json)?;
    chart.calculate();
    let dtos: Vec<ResourceScheduleDto> = chart
        .resources()
        .iter()
        .map(|resource| ResourceScheduleDto::new(&chart, resource))
        .collect();
    to_json(&dtos)
}

fn conflicts_json(document_json: &str, from: &str, to: &str) -> Result<String, String> {
    let (from, to) = (parse_date(from)?, parse_date(to)?);
    let mut chart = load_chart(document_json)?;
    let dtos: Vec<ConflictDto> = chart.conflicts(from, to).iter().map(ConflictDto::from).collect();
    to_json(&dtos)
}

fn layout_json(document_json: &str, from: &str, to: &str, width: f64) -> Result<String, String> {
    if !width.is_finite() || width <= 0.0 {
        return Err(format!("Width must be a positive number, got {}", width));
    }
    let (from, to) = (parse_date(from)?, parse_date(to)?);
    let mut chart = load_chart(document_json)?;
    to_json(&chart.render(from, to, width))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute the day-indexed schedule of every resource in a chart document.
///
/// Returns a JSON array with, per resource, `maxOccupation`, `hasConflicts`,
/// the stack offset of every interval (`tops`) and one entry per covered day.
#[wasm_bindgen(js_name = "computeSchedule")]
pub fn compute_schedule(document_json: &str) -> Result<String, JsValue> {
    schedule_json(document_json).map_err(|e| JsValue::from_str(&e))
}

/// Find the over-allocated periods of all resources between two dates.
///
/// `from` and `to` are ISO 8601 dates or datetimes; both days are included.
/// Returns a JSON array of `{index, resource, text, start, end, top}` objects
/// with RFC 3339 boundaries, `end` being exclusive.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(document_json: &str, from: &str, to: &str) -> Result<String, JsValue> {
    conflicts_json(document_json, from, to).map_err(|e| JsValue::from_str(&e))
}

/// Lay out the days between `from` and `to` over `width` pixels.
///
/// Returns the JSON frame: row geometry, interval rectangles, conflict bands
/// and the visible-interval registry.
#[wasm_bindgen(js_name = "renderLayout")]
pub fn render_layout(
    document_json: &str,
    from: &str,
    to: &str,
    width: f64,
) -> Result<String, JsValue> {
    layout_json(document_json, from, to, width).map_err(|e| JsValue::from_str(&e))
}
