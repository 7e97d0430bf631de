//! Dependency-aware daily task scheduling.
//!
//! Computes a day-by-day assignment ("do-date") for a set of tasks
//! connected by prerequisite edges, each with a time window and an
//! estimated duration, spreading daily workload as evenly as possible
//! around fixed, immovable calendar events.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `Event`, `TaskGraph`
//! - **`optimizer`**: The scheduling pipeline — greedy assignment,
//!   local-search refinement, load ledger, balance KPIs, and the
//!   `Scheduler` facade
//! - **`validation`**: Input integrity checks (infeasible windows,
//!   dependency cycles)
//! - **`error`**: Structural scheduling errors reported per run
//!
//! # Guarantees
//!
//! The result is a *local* optimum of the move/swap neighborhood under
//! a bounded number of refinement sweeps, not a global one. Scheduled
//! tasks always satisfy `early_date <= do_date <= due_date` and every
//! prerequisite lands on or before its dependents; tasks that cannot
//! satisfy those invariants (empty window, dependency cycle) are left
//! unscheduled and reported, never silently dropped or mis-placed.
//! There is no hard daily capacity: an unavoidable overload is allowed
//! and only balanced, by design.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Aarts & Lenstra (1997), "Local Search in Combinatorial Optimization"

pub mod error;
pub mod models;
pub mod optimizer;
pub mod validation;

pub use error::ScheduleError;
pub use models::{Event, Task, TaskGraph};
pub use optimizer::{OptimizeOutcome, Scheduler};
