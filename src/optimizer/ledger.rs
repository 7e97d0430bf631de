//! Day-indexed load ledger.
//!
//! Tracks committed minutes per day over a fixed horizon: day 0 is
//! "today", day `i` is `i` days later. The ledger is derived state,
//! rebuilt at the start of every optimization run from the fixed
//! events (overlap-merged per day) plus minutes already spent today,
//! then maintained incrementally as tasks are placed and moved.
//!
//! The horizon is computed up front from the latest due date; events
//! beyond it (or in the past) carry no schedulable load and are ignored.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{merged_minutes, Event};

/// Per-day committed minutes and the tasks scheduled on each day.
#[derive(Debug, Clone)]
pub struct LoadLedger {
    minutes: Vec<i64>,
    scheduled: Vec<Vec<String>>,
}

impl LoadLedger {
    /// Creates an empty ledger covering `horizon` days (at least 1).
    pub fn new(horizon: usize) -> Self {
        let horizon = horizon.max(1);
        Self {
            minutes: vec![0; horizon],
            scheduled: vec![Vec::new(); horizon],
        }
    }

    /// Number of days covered (day indices `0..horizon`).
    #[inline]
    pub fn horizon(&self) -> i64 {
        self.minutes.len() as i64
    }

    /// Whether a day index falls inside the horizon.
    #[inline]
    pub fn contains(&self, day: i64) -> bool {
        day >= 0 && day < self.horizon()
    }

    /// Adds event load: events are grouped by day relative to `today`
    /// and each day's overlapping minutes are counted once.
    pub fn add_events(&mut self, events: &[Event], today: NaiveDate) {
        let mut by_day: HashMap<i64, Vec<&Event>> = HashMap::new();
        for event in events {
            let day = event.day_index(today);
            if self.contains(day) {
                by_day.entry(day).or_default().push(event);
            }
        }
        for (day, day_events) in by_day {
            self.minutes[day as usize] += merged_minutes(day_events);
        }
    }

    /// Adds minutes already spent on tasks today (day 0).
    pub fn add_spent_today(&mut self, minutes: i64) {
        self.minutes[0] += minutes.max(0);
    }

    /// Committed minutes on a day.
    #[inline]
    pub fn minutes_on(&self, day: i64) -> i64 {
        self.minutes[day as usize]
    }

    /// All per-day minutes, day 0 first.
    #[inline]
    pub fn minutes(&self) -> &[i64] {
        &self.minutes
    }

    /// Ids of tasks currently scheduled on a day.
    #[inline]
    pub fn tasks_on(&self, day: i64) -> &[String] {
        &self.scheduled[day as usize]
    }

    /// Absolute load difference between two days.
    #[inline]
    pub fn imbalance(&self, a: i64, b: i64) -> i64 {
        (self.minutes_on(a) - self.minutes_on(b)).abs()
    }

    /// Schedules a task on a day.
    pub fn place(&mut self, day: i64, task_id: &str, duration: i64) {
        debug_assert!(self.contains(day));
        self.minutes[day as usize] += duration;
        self.scheduled[day as usize].push(task_id.to_string());
    }

    /// Removes a task from a day.
    pub fn displace(&mut self, day: i64, task_id: &str, duration: i64) {
        debug_assert!(self.contains(day));
        self.minutes[day as usize] -= duration;
        let list = &mut self.scheduled[day as usize];
        if let Some(pos) = list.iter().position(|id| id == task_id) {
            list.remove(pos);
        }
    }

    /// Moves a task between two days.
    pub fn relocate(&mut self, from: i64, to: i64, task_id: &str, duration: i64) {
        self.displace(from, task_id, duration);
        self.place(to, task_id, duration);
    }

    /// Exchanges the days of two tasks.
    pub fn swap(
        &mut self,
        day_a: i64,
        task_a: &str,
        duration_a: i64,
        day_b: i64,
        task_b: &str,
        duration_b: i64,
    ) {
        self.relocate(day_a, day_b, task_a, duration_a);
        self.relocate(day_b, day_a, task_b, duration_b);
    }

    /// First day in `[lo, hi]` with the strictly lowest load.
    ///
    /// Scans left to right and replaces the candidate only on strict
    /// improvement, so ties resolve to the earliest day in range.
    pub fn least_loaded_in(&self, lo: i64, hi: i64) -> i64 {
        debug_assert!(self.contains(lo) && self.contains(hi) && lo <= hi);
        let mut best = lo;
        for day in (lo + 1)..=hi {
            if self.minutes_on(day) < self.minutes_on(best) {
                best = day;
            }
        }
        best
    }
}
