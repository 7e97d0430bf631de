//! Scheduling error types.
//!
//! Structural problems abort the run for the affected tasks only:
//! already-placed tasks keep their assignments and the errors are
//! surfaced in the optimization outcome for the caller to resolve
//! (e.g., push out a due date) and re-run.

use chrono::NaiveDate;
use thiserror::Error;

/// A structural problem that prevented one or more tasks from being
/// scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The task's effective window is empty: its (possibly
    /// parent-tightened) early date falls after its due date, or the
    /// whole window lies in the past.
    #[error("task '{task_id}' has an infeasible window ({early}..={due})")]
    InfeasibleWindow {
        task_id: String,
        early: NaiveDate,
        due: NaiveDate,
    },
    /// Tasks whose prerequisites never resolved: part of a dependency
    /// cycle, or downstream of a task that failed to schedule.
    #[error("cyclic or unresolved dependencies: {task_ids:?}")]
    CyclicOrUnresolvedDependency { task_ids: Vec<String> },
}

impl ScheduleError {
    /// Ids of the tasks this error excludes from the schedule.
    pub fn affected_ids(&self) -> Vec<&str> {
        match self {
            Self::InfeasibleWindow { task_id, .. } => vec![task_id.as_str()],
            Self::CyclicOrUnresolvedDependency { task_ids } => {
                task_ids.iter().map(String::as_str).collect()
            }
        }
    }
}
