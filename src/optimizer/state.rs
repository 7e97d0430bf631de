//! Per-run optimization state.
//!
//! The working copies of graph fields that both passes mutate:
//! pending (undrained) parent sets, dynamically tightened early dates,
//! and tentative day assignments. Built fresh at the start of every
//! run and discarded afterwards — never stored on the task itself, so
//! stale state from a previous run cannot leak into the next one.
//!
//! All days are indices relative to the run's `today` (day 0).

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::models::TaskGraph;

/// Converts a day index back to a calendar date.
#[inline]
pub(crate) fn date_on(today: NaiveDate, day: i64) -> NaiveDate {
    today + Duration::days(day)
}

/// Working state for one optimization run, indexed by arena position.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Prerequisites not yet placed; drained by the assignment pass.
    pub pending_parents: Vec<BTreeSet<String>>,
    /// Early date as a day index, raised as parents are placed.
    /// Clamped at 0: days before today are not schedulable.
    pub working_early: Vec<i64>,
    /// Tentative day per task; `None` until assigned (or never, for
    /// tasks excluded by a structural error).
    pub assigned_day: Vec<Option<i64>>,
}

impl RunState {
    /// Snapshots working state for every task in the graph.
    pub fn new(graph: &TaskGraph, today: NaiveDate) -> Self {
        let len = graph.len();
        let mut pending_parents = Vec::with_capacity(len);
        let mut working_early = Vec::with_capacity(len);
        for task in graph.iter() {
            pending_parents.push(task.parents.clone());
            working_early.push(task.early_index(today).max(0));
        }
        Self {
            pending_parents,
            working_early,
            assigned_day: vec![None; len],
        }
    }

    /// Whether the task at `idx` has a tentative day.
    #[inline]
    pub fn is_placed(&self, idx: usize) -> bool {
        self.assigned_day[idx].is_some()
    }

    /// Raises a task's working early date to `day` if currently lower.
    #[inline]
    pub fn tighten_early(&mut self, idx: usize, day: i64) {
        if self.working_early[idx] < day {
            self.working_early[idx] = day;
        }
    }
}
