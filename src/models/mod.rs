//! Scheduling domain models.
//!
//! Core data types for day-granular task scheduling: tasks with
//! windows and prerequisite edges, fixed calendar events, and the
//! arena-backed task graph.

mod event;
mod graph;
mod task;

pub use event::{merged_minutes, Event, MINUTES_PER_DAY};
pub use graph::{GraphError, TaskGraph};
pub use task::{Task, MAX_PRIORITY};
