//! Geometry handed to the rendering layer.
//!
//! The engine does not draw. It turns stack offsets and conflict periods into
//! plain rectangles: horizontally through a linear time scale, vertically by
//! normalizing minutes against the row's maximum occupation.

use serde::{Deserialize, Serialize};

use crate::conflict::Conflict;
use crate::day::DAY_MS;
use crate::resource::VisibleInterval;

/// Something whose data range grows to cover the intervals fed to it.
pub trait DataRange {
    fn extend_data_range(&mut self, start: i64, end: i64);
}

/// Auto-calculated data range of the time axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeScale {
    min: Option<i64>,
    max: Option<i64>,
}

impl TimeScale {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(earliest start, latest end)` seen so far.
    pub fn data_range(&self) -> Option<(i64, i64)> {
        Some((self.min?, self.max?))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl DataRange for TimeScale {
    fn extend_data_range(&mut self, start: i64, end: i64) {
        self.min = Some(self.min.map_or(start, |m| m.min(start)));
        self.max = Some(self.max.map_or(end, |m| m.max(end)));
    }
}

/// Linear mapping of the half-open window `[from, to)` onto `[0, width]` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub from: i64,
    pub to: i64,
    pub width: f64,
}

impl LinearScale {
    pub fn new(from: i64, to: i64, width: f64) -> Self {
        Self { from, to, width }
    }

    pub fn to_pix(&self, timestamp: i64) -> f64 {
        let span = (self.to - self.from) as f64;
        if span <= 0.0 {
            return 0.0;
        }
        (timestamp - self.from) as f64 / span * self.width
    }
}

/// Area available to a chart row, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A pixel-space rectangle handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Rectangle of a visible interval inside a row.
///
/// Horizontally the interval spans from the midnight of its first day to the
/// midnight after its last day. Vertically it occupies
/// `[top, top + minutes_per_day)` scaled by `bounds.height / max_occupation`,
/// cut off at the bottom of the row.
pub fn interval_rect(
    interval: &VisibleInterval,
    bounds: &Bounds,
    max_occupation: f64,
    scale: &LinearScale,
) -> Rect {
    let ratio = if max_occupation > 0.0 {
        bounds.height / max_occupation
    } else {
        0.0
    };
    Rect {
        left: bounds.left + scale.to_pix(interval.start),
        top: bounds.top + interval.top * ratio,
        right: bounds.left + scale.to_pix(interval.end + DAY_MS),
        bottom: (bounds.top + (interval.top + interval.minutes_per_day) * ratio)
            .min(bounds.bottom()),
    }
}

/// Rectangle of a conflict band of height `band_height`, clamped to the row.
pub fn conflict_rect(
    conflict: &Conflict,
    bounds: &Bounds,
    band_height: f64,
    scale: &LinearScale,
) -> Rect {
    let clamp = |x: f64| x.max(bounds.left).min(bounds.right());
    Rect {
        left: clamp(bounds.left + scale.to_pix(conflict.start)),
        top: conflict.top,
        right: clamp(bounds.left + scale.to_pix(conflict.end)),
        bottom: conflict.top + band_height,
    }
}
