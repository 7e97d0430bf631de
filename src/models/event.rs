//! Fixed calendar events.
//!
//! Events are immovable time blocks the optimizer schedules around.
//! They contribute committed minutes to their day's load; same-day
//! events may overlap in time, and overlapping minutes count once.
//!
//! # Time Model
//! An event has a calendar day plus a start minute within that day
//! (0..1440). The optimizer never moves events and never looks at the
//! time-of-day beyond overlap merging.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minutes in a day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A fixed, immovable calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Unique event identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Calendar day the event occurs on.
    pub date: NaiveDate,
    /// Start minute within the day (0..1440).
    pub start_minute: i64,
    /// Duration (minutes).
    pub duration_minutes: i64,
}

impl Event {
    /// Creates a new event.
    pub fn new(id: impl Into<String>, date: NaiveDate, start_minute: i64, duration_minutes: i64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            date,
            start_minute,
            duration_minutes,
        }
    }

    /// Sets the event name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// End minute within the day (exclusive), clamped to midnight.
    #[inline]
    pub fn end_minute(&self) -> i64 {
        (self.start_minute + self.duration_minutes).min(MINUTES_PER_DAY)
    }

    /// The event's day as an index relative to `today` (may be negative).
    #[inline]
    pub fn day_index(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }

    /// Whether two same-day events overlap in time.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date
            && self.start_minute < other.end_minute()
            && other.start_minute < self.end_minute()
    }
}

/// Total committed minutes for a set of same-day events, counting
/// overlapping minutes once.
///
/// # Algorithm
/// Sort intervals by start minute, then sweep: extend the current merged
/// interval while the next one overlaps it, otherwise flush and restart.
pub fn merged_minutes<'a, I>(events: I) -> i64
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut intervals: Vec<(i64, i64)> = events
        .into_iter()
        .filter(|e| e.duration_minutes > 0)
        .map(|e| (e.start_minute, e.end_minute()))
        .collect();
    if intervals.is_empty() {
        return 0;
    }
    intervals.sort_unstable();

    let mut total = 0;
    let (mut start, mut end) = intervals[0];
    for &(s, e) in &intervals[1..] {
        if s <= end {
            end = end.max(e);
        } else {
            total += end - start;
            start = s;
            end = e;
        }
    }
    total + (end - start)
}
