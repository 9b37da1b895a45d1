//! Merge over-allocated days into reportable conflict periods.
//!
//! [`ConflictAggregator::evaluate`] is fed one allocation per day, in strictly
//! increasing day order, followed by a final flush call without an allocation.
//! Consecutive over-allocated days are merged into one [`Conflict`] only while
//! their formatted text stays the same: "2h (25%)" on three days in a row is
//! one conflict, "2h (25%)" followed by "3h (37.5%)" is two.
//!
//! Calling `evaluate` out of day order is a caller error and yields
//! meaningless boundaries; it is not checked.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::resource::Resource;
use crate::schedule::Allocation;

/// The default conflict label template.
pub const DEFAULT_CONFLICT_FORMAT: &str = "{%hours}h ({%percent}%)";

/// Values available to a conflict formatter for one over-allocated day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictContext {
    /// Midnight of the evaluated day.
    pub date: i64,
    /// Overage in minutes (`allocated - vacant`).
    pub minutes: f64,
    pub hours: f64,
    /// Overage in hours, rounded up to the next half hour.
    pub hours_rounded: f64,
    /// Overage as a percentage of the vacant capacity.
    pub percent: f64,
    pub allocated: f64,
    pub vacant: f64,
    /// Raw data of the contributing activities, in fold order.
    pub activities: Vec<Value>,
}

impl ConflictContext {
    pub fn new(date: i64, allocation: &Allocation, resource: &Resource) -> Self {
        let vacant = allocation.vacant();
        let minutes = allocation.allocated - vacant;
        let activities = allocation
            .activities()
            .unwrap_or(&[])
            .iter()
            .map(|&index| {
                resource
                    .activity(index)
                    .map(|activity| activity.data.clone())
                    .unwrap_or(Value::Null)
            })
            .collect();

        Self {
            date,
            minutes,
            hours: minutes / 60.0,
            hours_rounded: (minutes / 30.0).ceil() / 2.0,
            percent: minutes / vacant * 100.0,
            allocated: allocation.allocated,
            vacant,
            activities,
        }
    }
}

/// Renders the label of a conflict.
///
/// Two adjacent conflicting days are merged when they render to the same
/// string, so the formatter decides how fine-grained conflicts are. `index` is
/// the label number the aggregator assigns to the day; a formatter that prints
/// it never merges days.
pub trait ConflictFormatter {
    fn format(&self, context: &ConflictContext, index: usize) -> String;
}

impl<F> ConflictFormatter for F
where
    F: Fn(&ConflictContext, usize) -> String,
{
    fn format(&self, context: &ConflictContext, index: usize) -> String {
        self(context, index)
    }
}

/// Token-substitution formatter.
///
/// Supported tokens: `{%minutes}`, `{%hours}`, `{%hoursRounded}`,
/// `{%percent}`, `{%allocated}`, `{%vacant}` and the label `{%index}`.
/// Unknown tokens are kept verbatim.
/// Numbers print without a fraction when whole, otherwise with at most two
/// decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFormatter {
    template: String,
}

impl TemplateFormatter {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_CONFLICT_FORMAT)
    }
}

impl ConflictFormatter for TemplateFormatter {
    fn format(&self, context: &ConflictContext, index: usize) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find("{%") {
            out.push_str(&rest[..open]);
            let after = &rest[open..];
            let Some(close) = after.find('}') else {
                out.push_str(after);
                return out;
            };
            let token = &after[2..close];
            match token_value(context, index, token) {
                Some(value) => out.push_str(&format_number(value)),
                None => out.push_str(&after[..=close]),
            }
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }
}

fn token_value(context: &ConflictContext, index: usize, token: &str) -> Option<f64> {
    Some(match token {
        "index" => index as f64,
        "minutes" => context.minutes,
        "hours" => context.hours,
        "hoursRounded" => context.hours_rounded,
        "percent" => context.percent,
        "allocated" => context.allocated,
        "vacant" => context.vacant,
        _ => return None,
    })
}

/// Whole numbers without a fraction, others with up to two decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// A contiguous over-allocated period with one unchanging label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Label index, stable across re-evaluations of the same data.
    pub index: usize,
    pub text: String,
    /// Midnight of the first conflicting day.
    pub start: i64,
    /// Midnight of the day that closed the conflict (exclusive).
    pub end: i64,
    /// Row index of the resource the conflict belongs to.
    pub resource: usize,
    /// Vertical position of the conflict band, supplied by the caller.
    pub top: f64,
    /// Context of the day that opened the conflict.
    pub context: ConflictContext,
}

#[derive(Debug, Clone)]
struct OpenConflict {
    index: usize,
    text: String,
    start: i64,
    resource: usize,
    top: f64,
    context: ConflictContext,
}

impl OpenConflict {
    fn close(self, end: i64) -> Conflict {
        Conflict {
            index: self.index,
            text: self.text,
            start: self.start,
            end,
            resource: self.resource,
            top: self.top,
            context: self.context,
        }
    }
}

/// Streaming merge of per-day allocations into [`Conflict`] records.
pub struct ConflictAggregator {
    formatter: Box<dyn ConflictFormatter>,
    current: Option<OpenConflict>,
    conflicts: Vec<Conflict>,
    next_label: usize,
}

impl fmt::Debug for ConflictAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictAggregator")
            .field("current", &self.current)
            .field("conflicts", &self.conflicts)
            .field("next_label", &self.next_label)
            .finish_non_exhaustive()
    }
}

impl Default for ConflictAggregator {
    fn default() -> Self {
        Self::new(TemplateFormatter::default())
    }
}

impl ConflictAggregator {
    pub fn new(formatter: impl ConflictFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            current: None,
            conflicts: Vec::new(),
            next_label: 0,
        }
    }

    /// Swap the label formatter. Already collected conflicts keep their text.
    pub fn set_formatter(&mut self, formatter: impl ConflictFormatter + 'static) {
        self.formatter = Box::new(formatter);
    }

    /// Drop every collected and open conflict and restart label numbering.
    pub fn clear(&mut self) {
        self.current = None;
        self.conflicts.clear();
        self.next_label = 0;
    }

    /// Feed the allocation of the day starting at `date`.
    ///
    /// `None` (or a day within capacity) closes the open conflict, if any, at
    /// `date`. Call once more with `None` after the last day of a range,
    /// otherwise a conflict still open on that day is lost.
    pub fn evaluate(
        &mut self,
        date: i64,
        allocation: Option<&Allocation>,
        resource: &Resource,
        top: f64,
    ) {
        let Some(allocation) = allocation.filter(|a| a.is_overallocated()) else {
            self.flush(date);
            return;
        };

        let index = self.next_label;
        self.next_label += 1;
        let context = ConflictContext::new(date, allocation, resource);
        let text = self.formatter.format(&context, index);

        if let Some(current) = &self.current {
            if current.text == text {
                return;
            }
            self.flush(date);
        }

        trace!(resource = resource.index(), date, %text, "conflict opened");
        self.current = Some(OpenConflict {
            index,
            text,
            start: date,
            resource: resource.index(),
            top,
            context,
        });
    }

    /// Close the open conflict, if any, at `date`.
    pub fn flush(&mut self, date: i64) {
        if let Some(current) = self.current.take() {
            trace!(
                resource = current.resource,
                start = current.start,
                end = date,
                "conflict closed"
            );
            self.conflicts.push(current.close(date));
        }
    }

    /// Conflicts closed so far, in closing order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Take the collected conflicts, leaving the aggregator empty.
    pub fn take_conflicts(&mut self) -> Vec<Conflict> {
        self.current = None;
        self.next_label = 0;
        std::mem::take(&mut self.conflicts)
    }

    pub fn has_open_conflict(&self) -> bool {
        self.current.is_some()
    }
}
