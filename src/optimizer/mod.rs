//! Dependency-aware schedule optimizer.
//!
//! Produces a day-by-day assignment ("do-date") for every task such
//! that no task leaves its window, no task precedes a prerequisite or
//! follows a dependent, and daily workload is spread as evenly as the
//! fixed event commitments allow.
//!
//! # Pipeline
//!
//! 1. Fresh [`RunState`] snapshots working copies of every task's
//!    edges and early date (stale state cannot survive between runs).
//! 2. A fixed-horizon [`LoadLedger`] is built from events
//!    (overlap-merged per day) plus minutes already spent today.
//! 3. [`GreedyAssigner`] places tasks in dependency order on the
//!    least-loaded day of their window.
//! 4. [`Refiner`] hill-climbs with move/swap operators to a local
//!    optimum of the day-to-day load imbalance.
//! 5. The facade diffs final days against prior do-dates, commits only
//!    the changed ones, and reports them for incremental refresh.
//!
//! The whole run is single-threaded, CPU-bound, and owns the graph
//! exclusively for its duration; callers needing non-blocking behavior
//! offload the entire call to a worker.

mod assign;
mod kpi;
mod ledger;
mod order;
mod refine;
mod state;

pub use assign::GreedyAssigner;
pub use kpi::LoadKpi;
pub use ledger::LoadLedger;
pub use order::{HeapTask, SchedulingOrder};
pub use refine::{Refiner, SwapTieBreak, DEFAULT_MAX_SWEEPS};
pub use state::RunState;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScheduleError;
use crate::models::{Event, TaskGraph};
use state::date_on;

/// A committed do-date change, for incremental downstream refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoDateChange {
    /// Task whose do-date changed.
    pub task_id: String,
    /// Previous do-date (`None` if the task had never been scheduled).
    pub old: Option<NaiveDate>,
    /// Newly committed do-date.
    pub new: NaiveDate,
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOutcome {
    /// Tasks whose do-date changed, in graph order.
    pub changed: Vec<DoDateChange>,
    /// Structural errors; the named tasks kept their previous do-date.
    pub errors: Vec<ScheduleError>,
    /// Refinement sweeps performed before convergence (or the cap).
    pub sweeps: usize,
}

impl OptimizeOutcome {
    /// Whether every task received a schedule.
    pub fn is_fully_scheduled(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Scheduler facade: one `optimize` call runs the full pipeline.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use dayplan::models::{Event, Task, TaskGraph};
/// use dayplan::optimizer::Scheduler;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let due = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let mut graph = TaskGraph::from_tasks(vec![
///     Task::new("A", today, due).with_duration(60),
/// ]).unwrap();
/// let events = vec![Event::new("standup", today, 9 * 60, 120)];
///
/// let outcome = Scheduler::new().optimize(&mut graph, &events, today, 0);
/// assert!(outcome.is_fully_scheduled());
/// assert_eq!(outcome.changed.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    max_sweeps: usize,
    tie_break: SwapTieBreak,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates a scheduler with default refinement settings.
    pub fn new() -> Self {
        Self {
            max_sweeps: DEFAULT_MAX_SWEEPS,
            tie_break: SwapTieBreak::default(),
        }
    }

    /// Sets the refinement sweep cap.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Sets the equal-delta swap policy.
    pub fn with_swap_tie_break(mut self, tie_break: SwapTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Runs a full optimization and commits changed do-dates.
    ///
    /// `spent_today_minutes` is time already spent completing tasks
    /// today; it counts toward day 0's load so remaining work flows to
    /// lighter days.
    pub fn optimize(
        &self,
        graph: &mut TaskGraph,
        events: &[Event],
        today: NaiveDate,
        spent_today_minutes: i64,
    ) -> OptimizeOutcome {
        // Horizon fixed up front from the latest due date (min one day).
        let horizon = graph
            .iter()
            .map(|t| t.due_index(today))
            .max()
            .unwrap_or(0)
            .max(0)
            + 1;
        let mut ledger = LoadLedger::new(horizon as usize);
        ledger.add_events(events, today);
        ledger.add_spent_today(spent_today_minutes);

        let mut state = RunState::new(graph, today);
        let errors = GreedyAssigner::run(graph, &mut state, &mut ledger, today);
        let sweeps = Refiner::new()
            .with_max_sweeps(self.max_sweeps)
            .with_tie_break(self.tie_break)
            .run(graph, &mut state, &mut ledger, today);

        let mut changed = Vec::new();
        for idx in 0..graph.len() {
            let Some(day) = state.assigned_day[idx] else {
                continue; // structural error: previous do-date kept
            };
            let new = date_on(today, day);
            let task = graph.task_at_mut(idx);
            if task.do_date != Some(new) {
                changed.push(DoDateChange {
                    task_id: task.id.clone(),
                    old: task.do_date,
                    new,
                });
                task.do_date = Some(new);
            }
        }

        debug!(
            tasks = graph.len(),
            changed = changed.len(),
            errors = errors.len(),
            sweeps,
            "optimization run complete"
        );
        OptimizeOutcome {
            changed,
            errors,
            sweeps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
    }

    /// Window and precedence invariants over every scheduled task.
    fn assert_invariants(graph: &TaskGraph) {
        for task in graph.iter() {
            let Some(do_date) = task.do_date else { continue };
            assert!(
                task.early_date <= do_date && do_date <= task.due_date,
                "window violated for {}",
                task.id
            );
            for child_id in &task.children {
                if let Some(child_do) = graph.get(child_id).and_then(|c| c.do_date) {
                    assert!(
                        do_date <= child_do,
                        "precedence violated: {} > {}",
                        task.id,
                        child_id
                    );
                }
            }
        }
    }

    #[test]
    fn test_scenario_greedy_only() {
        // Event of 120 min today; task window today..=day 2.
        // Days 1 and 2 tie at zero load → earliest wins → day 1.
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(3)).with_duration(60),
        ])
        .unwrap();
        let events = vec![Event::new("E", day(1), 10 * 60, 120)];

        let outcome = Scheduler::new().optimize(&mut graph, &events, day(1), 0);

        assert!(outcome.is_fully_scheduled());
        assert_eq!(graph.get("A").unwrap().do_date, Some(day(2)));
        assert_eq!(
            outcome.changed,
            vec![DoDateChange {
                task_id: "A".into(),
                old: None,
                new: day(2),
            }]
        );
        assert_invariants(&graph);
    }

    #[test]
    fn test_scenario_precedence_propagation() {
        // A lands on day 1; B's early date rises to day 1 and day 2 is
        // its least-loaded legal day.
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(3)).with_duration(60),
            Task::new("B", day(1), day(5)).with_duration(90).with_parent("A"),
        ])
        .unwrap();
        let events = vec![Event::new("E", day(1), 10 * 60, 120)];

        let outcome = Scheduler::new().optimize(&mut graph, &events, day(1), 0);

        assert!(outcome.is_fully_scheduled());
        let a = graph.get("A").unwrap().do_date.unwrap();
        let b = graph.get("B").unwrap().do_date.unwrap();
        assert_eq!(a, day(2));
        assert_eq!(b, day(3));
        assert!(a <= b);
        assert_invariants(&graph);
    }

    #[test]
    fn test_scenario_infeasible_window() {
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("bad", day(6), day(3)).with_duration(30),
            Task::new("good", day(1), day(3)).with_duration(30),
        ])
        .unwrap();

        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 0);

        assert!(matches!(
            &outcome.errors[..],
            [ScheduleError::InfeasibleWindow { task_id, .. }] if task_id == "bad"
        ));
        assert!(graph.get("bad").unwrap().do_date.is_none());
        assert!(graph.get("good").unwrap().do_date.is_some());
    }

    #[test]
    fn test_scenario_cycle() {
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("X", day(1), day(5)).with_parent("Y"),
            Task::new("Y", day(1), day(5)).with_parent("X"),
        ])
        .unwrap();

        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 0);

        assert_eq!(
            outcome.errors,
            vec![ScheduleError::CyclicOrUnresolvedDependency {
                task_ids: vec!["X".into(), "Y".into()],
            }]
        );
        assert!(graph.get("X").unwrap().do_date.is_none());
        assert!(graph.get("Y").unwrap().do_date.is_none());
    }

    #[test]
    fn test_spent_today_pushes_work_out() {
        // Day 0 already carries 300 spent minutes; an otherwise free
        // task flows to a later day.
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(3)).with_duration(60),
        ])
        .unwrap();
        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 300);

        assert!(outcome.is_fully_scheduled());
        assert_ne!(graph.get("A").unwrap().do_date, Some(day(1)));
    }

    #[test]
    fn test_determinism() {
        let build = || {
            TaskGraph::from_tasks(vec![
                Task::new("A", day(1), day(6)).with_duration(60).with_priority(1),
                Task::new("B", day(1), day(6)).with_duration(90).with_parent("A"),
                Task::new("C", day(1), day(6)).with_duration(45).with_priority(2),
                Task::new("D", day(2), day(6)).with_duration(120).with_parent("A"),
                Task::new("E", day(1), day(4)).with_duration(30),
            ])
            .unwrap()
        };
        let events = vec![
            Event::new("E1", day(1), 9 * 60, 90),
            Event::new("E2", day(3), 13 * 60, 120),
        ];

        let mut g1 = build();
        let mut g2 = build();
        let o1 = Scheduler::new().optimize(&mut g1, &events, day(1), 30);
        let o2 = Scheduler::new().optimize(&mut g2, &events, day(1), 30);

        assert_eq!(o1.changed, o2.changed);
        for task in g1.iter() {
            assert_eq!(task.do_date, g2.get(&task.id).unwrap().do_date);
        }
        assert_invariants(&g1);
    }

    #[test]
    fn test_idempotence_at_fixed_point() {
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(6)).with_duration(60),
            Task::new("B", day(1), day(6)).with_duration(90).with_parent("A"),
            Task::new("C", day(1), day(6)).with_duration(45),
            Task::new("D", day(2), day(6)).with_duration(120),
        ])
        .unwrap();
        let events = vec![Event::new("E1", day(2), 9 * 60, 90)];

        let first = Scheduler::new().optimize(&mut graph, &events, day(1), 0);
        assert!(first.is_fully_scheduled());

        // Re-running on its own output changes nothing.
        let second = Scheduler::new().optimize(&mut graph, &events, day(1), 0);
        assert!(second.changed.is_empty());
    }

    #[test]
    fn test_unchanged_do_date_not_reported() {
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(1)).with_duration(60).with_do_date(day(1)),
        ])
        .unwrap();
        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 0);

        assert!(outcome.changed.is_empty());
        assert_eq!(graph.get("A").unwrap().do_date, Some(day(1)));
    }

    #[test]
    fn test_diamond_graph_invariants() {
        //      A
        //     / \
        //    B   C
        //     \ /
        //      D
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(8)).with_duration(60),
            Task::new("B", day(1), day(8)).with_duration(120).with_parent("A"),
            Task::new("C", day(1), day(8)).with_duration(90).with_parent("A"),
            Task::new("D", day(1), day(8))
                .with_duration(45)
                .with_parent("B")
                .with_parent("C"),
        ])
        .unwrap();

        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 0);
        assert!(outcome.is_fully_scheduled());
        assert_invariants(&graph);
    }

    #[test]
    fn test_overload_allowed_no_capacity_limit() {
        // Five pinned tasks on one day: soft balancing only, all land.
        let tasks: Vec<Task> = (0..5)
            .map(|i| Task::new(format!("T{i}"), day(2), day(2)).with_duration(300))
            .collect();
        let mut graph = TaskGraph::from_tasks(tasks).unwrap();

        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 0);
        assert!(outcome.is_fully_scheduled());
        for task in graph.iter() {
            assert_eq!(task.do_date, Some(day(2)));
        }
    }

    #[test]
    fn test_empty_graph() {
        let mut graph = TaskGraph::new();
        let outcome = Scheduler::new().optimize(&mut graph, &[], day(1), 0);
        assert!(outcome.changed.is_empty());
        assert!(outcome.is_fully_scheduled());
    }

    #[test]
    fn test_refinement_improves_balance() {
        // A lump of same-window tasks; after refinement the spread must
        // be no worse than the greedy pass alone with refinement off.
        let build = || {
            TaskGraph::from_tasks(
                (0..6)
                    .map(|i| {
                        Task::new(format!("T{i}"), day(1), day(4)).with_duration(30 + 30 * i)
                    })
                    .collect::<Vec<_>>(),
            )
            .unwrap()
        };

        let mut refined = build();
        Scheduler::new().optimize(&mut refined, &[], day(1), 0);
        assert_invariants(&refined);

        let mut greedy_only = build();
        Scheduler::new()
            .with_max_sweeps(1)
            .with_swap_tie_break(SwapTieBreak::Reject)
            .optimize(&mut greedy_only, &[], day(1), 0);

        let spread = |g: &TaskGraph| {
            let mut loads = [0i64; 4];
            for t in g.iter() {
                let idx = (t.do_date.unwrap() - day(1)).num_days() as usize;
                loads[idx] += t.duration_minutes;
            }
            loads.iter().max().unwrap() - loads.iter().min().unwrap()
        };
        assert!(spread(&refined) <= spread(&greedy_only));
    }
}
