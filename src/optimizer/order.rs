//! Scheduling order: the total order used for queue priority and
//! swap tie-breaking.
//!
//! A sequential multi-criteria comparator; each criterion applies only
//! when every earlier one ties:
//!
//! 1. Pinned tasks (single valid day) first — they have no placement
//!    freedom, so they claim their day before flexible tasks crowd it.
//! 2. Effective priority descending (priority is forced to maximum
//!    for tasks due today).
//! 3. Due date ascending (EDD).
//! 4. Child count descending — tasks unblocking more dependents go
//!    earlier so their dependents aren't squeezed toward the due date.
//! 5. Early date ascending.
//! 6. Name, then id, lexicographic (deterministic final tie-break).
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::Task;

/// Total order over tasks for a given reference day.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingOrder {
    today: NaiveDate,
}

impl SchedulingOrder {
    /// Creates the order anchored at `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Compares two tasks; `Less` means `a` is scheduled first.
    pub fn cmp(&self, a: &Task, b: &Task) -> Ordering {
        a.is_pinned()
            .cmp(&b.is_pinned())
            .reverse()
            .then_with(|| {
                b.effective_priority(self.today)
                    .cmp(&a.effective_priority(self.today))
            })
            .then_with(|| a.due_date.cmp(&b.due_date))
            .then_with(|| b.children.len().cmp(&a.children.len()))
            .then_with(|| a.early_date.cmp(&b.early_date))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Snapshot of a task's ordering key plus its arena index, shaped for
/// `BinaryHeap` (which pops its maximum, so `Ord` is the scheduling
/// order reversed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapTask {
    pub idx: usize,
    pinned: bool,
    effective_priority: u8,
    due_date: NaiveDate,
    child_count: usize,
    early_date: NaiveDate,
    name: String,
    id: String,
}

impl HeapTask {
    /// Snapshots the ordering key of the task at `idx`.
    pub fn new(task: &Task, idx: usize, today: NaiveDate) -> Self {
        Self {
            idx,
            pinned: task.is_pinned(),
            effective_priority: task.effective_priority(today),
            due_date: task.due_date,
            child_count: task.children.len(),
            early_date: task.early_date,
            name: task.name.clone(),
            id: task.id.clone(),
        }
    }

    fn scheduling_cmp(&self, other: &Self) -> Ordering {
        self.pinned
            .cmp(&other.pinned)
            .reverse()
            .then_with(|| other.effective_priority.cmp(&self.effective_priority))
            .then_with(|| self.due_date.cmp(&other.due_date))
            .then_with(|| other.child_count.cmp(&self.child_count))
            .then_with(|| self.early_date.cmp(&other.early_date))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl Ord for HeapTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the heap's maximum is the task scheduled first.
        self.scheduling_cmp(other).reverse()
    }
}

impl PartialOrd for HeapTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
