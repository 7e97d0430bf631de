//! Task model.
//!
//! A task is a unit of work to be placed on a calendar day. It carries
//! a scheduling window (earliest day, due day), an estimated duration,
//! a priority, and prerequisite edges to other tasks.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Highest scheduling priority. Tasks due today are forced to this.
pub const MAX_PRIORITY: u8 = 3;

/// A task to be scheduled onto a single calendar day.
///
/// Edges are stored as id sets rather than references: `parents` holds
/// prerequisites, `children` holds dependents, and the two directions
/// are kept mutually consistent by [`TaskGraph`](super::TaskGraph).
///
/// # Time Representation
/// Dates are calendar days (`NaiveDate`, time-of-day stripped); the
/// scheduler only decides which *day* a task lands on. Durations are
/// minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Human-readable name (also the last deterministic tie-break).
    pub name: String,
    /// Earliest day the task may be done (inclusive).
    pub early_date: NaiveDate,
    /// Latest day the task may be done (inclusive).
    pub due_date: NaiveDate,
    /// Day the scheduler has committed the task to. `None` before the
    /// first optimization run.
    pub do_date: Option<NaiveDate>,
    /// Estimated duration (minutes).
    pub duration_minutes: i64,
    /// Scheduling priority, 0..=[`MAX_PRIORITY`] (higher = more important).
    pub priority: u8,
    /// Ids of prerequisite tasks.
    pub parents: BTreeSet<String>,
    /// Ids of dependent tasks.
    pub children: BTreeSet<String>,
}

impl Task {
    /// Creates a new task with the given id and window.
    pub fn new(id: impl Into<String>, early_date: NaiveDate, due_date: NaiveDate) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            early_date,
            due_date,
            do_date: None,
            duration_minutes: 0,
            priority: 0,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the estimated duration (minutes).
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the priority, clamped to 0..=[`MAX_PRIORITY`].
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(MAX_PRIORITY);
        self
    }

    /// Sets a committed do-date (normally only the scheduler does this).
    pub fn with_do_date(mut self, do_date: NaiveDate) -> Self {
        self.do_date = Some(do_date);
        self
    }

    /// Declares a prerequisite by id. The mirror edge is normalized when
    /// the task enters a [`TaskGraph`](super::TaskGraph).
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parents.insert(parent_id.into());
        self
    }

    /// Whether the window admits exactly one day.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.early_date == self.due_date
    }

    /// Number of days in the window (1 = pinned).
    #[inline]
    pub fn window_days(&self) -> i64 {
        (self.due_date - self.early_date).num_days() + 1
    }

    /// Priority as used for ordering: forced to [`MAX_PRIORITY`] when the
    /// task is due today.
    #[inline]
    pub fn effective_priority(&self, today: NaiveDate) -> u8 {
        if self.due_date == today {
            MAX_PRIORITY
        } else {
            self.priority
        }
    }

    /// Early date as a day index relative to `today` (may be negative).
    #[inline]
    pub fn early_index(&self, today: NaiveDate) -> i64 {
        (self.early_date - today).num_days()
    }

    /// Due date as a day index relative to `today` (may be negative).
    #[inline]
    pub fn due_index(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}
