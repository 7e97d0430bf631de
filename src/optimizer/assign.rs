//! Greedy initial assignment.
//!
//! Places tasks in dependency order onto the least-loaded day of their
//! window.
//!
//! # Algorithm
//! 1. Seed a priority queue (ordered per [`SchedulingOrder`]) with all
//!    tasks that have no pending prerequisites.
//! 2. Pop the minimum task, scan its `[working_early, due]` window in
//!    the ledger, and assign it to the first day with the strictly
//!    lowest load (ties go to the earliest day).
//! 3. Release its children: drain the placed parent from each child's
//!    pending set, raise the child's working early date to the parent's
//!    day, and enqueue children whose pending set empties.
//!
//! Tasks with an empty effective window are reported as
//! [`ScheduleError::InfeasibleWindow`] and left unplaced; their edges
//! are not released, so dependents surface in the unresolved report
//! rather than being scheduled ahead of a missing prerequisite. Tasks
//! whose pending set never empties (a dependency cycle, or downstream
//! of a failed task) are reported together as
//! [`ScheduleError::CyclicOrUnresolvedDependency`].
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::{BinaryHeap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::ledger::LoadLedger;
use super::order::HeapTask;
use super::state::{date_on, RunState};
use crate::error::ScheduleError;
use crate::models::TaskGraph;

/// The greedy assignment pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAssigner;

impl GreedyAssigner {
    /// Runs the pass, returning the structural errors encountered.
    ///
    /// Every task not named in an error has an assigned day afterwards
    /// and is recorded in the ledger.
    pub fn run(
        graph: &TaskGraph,
        state: &mut RunState,
        ledger: &mut LoadLedger,
        today: NaiveDate,
    ) -> Vec<ScheduleError> {
        let mut heap: BinaryHeap<HeapTask> = graph
            .iter()
            .enumerate()
            .filter(|(idx, _)| state.pending_parents[*idx].is_empty())
            .map(|(idx, task)| HeapTask::new(task, idx, today))
            .collect();

        let mut errors = Vec::new();
        let mut infeasible: HashSet<usize> = HashSet::new();

        while let Some(entry) = heap.pop() {
            let idx = entry.idx;
            let task = graph.task_at(idx);
            let early = state.working_early[idx];
            let due = task.due_index(today);

            if due < early {
                // Parent placements (or a past due date) emptied the window.
                warn!(task = %task.id, "infeasible window, task left unscheduled");
                errors.push(ScheduleError::InfeasibleWindow {
                    task_id: task.id.clone(),
                    early: date_on(today, early),
                    due: task.due_date,
                });
                infeasible.insert(idx);
                continue;
            }

            let day = ledger.least_loaded_in(early, due);
            state.assigned_day[idx] = Some(day);
            ledger.place(day, &task.id, task.duration_minutes);

            for child in graph.child_indices(idx) {
                state.pending_parents[child].remove(&task.id);
                state.tighten_early(child, day);
                if state.pending_parents[child].is_empty() {
                    heap.push(HeapTask::new(graph.task_at(child), child, today));
                }
            }
        }

        // Anything still unplaced never reached zero pending parents.
        let mut unresolved: Vec<String> = graph
            .iter()
            .enumerate()
            .filter(|(idx, _)| !state.is_placed(*idx) && !infeasible.contains(idx))
            .map(|(_, task)| task.id.clone())
            .collect();
        if !unresolved.is_empty() {
            unresolved.sort_unstable();
            warn!(count = unresolved.len(), "tasks with unresolved dependencies");
            errors.push(ScheduleError::CyclicOrUnresolvedDependency {
                task_ids: unresolved,
            });
        }

        debug!(
            placed = state.assigned_day.iter().filter(|d| d.is_some()).count(),
            errors = errors.len(),
            "greedy assignment finished"
        );
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Task};

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
    }

    fn run(graph: &TaskGraph, events: &[Event], horizon: usize) -> (RunState, LoadLedger, Vec<ScheduleError>) {
        let today = day(1);
        let mut ledger = LoadLedger::new(horizon);
        ledger.add_events(events, today);
        let mut state = RunState::new(graph, today);
        let errors = GreedyAssigner::run(graph, &mut state, &mut ledger, today);
        (state, ledger, errors)
    }

    #[test]
    fn test_picks_least_loaded_earliest_day() {
        // Scenario: a 120-minute event on day 0; task window day 0..=2.
        // Days 1 and 2 tie at zero load → earliest (day 1) wins.
        let graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(3)).with_duration(60),
        ])
        .unwrap();
        let events = vec![Event::new("E", day(1), 9 * 60, 120)];
        let (state, ledger, errors) = run(&graph, &events, 3);

        assert!(errors.is_empty());
        assert_eq!(state.assigned_day[0], Some(1));
        assert_eq!(ledger.minutes(), [120, 60, 0]);
        assert_eq!(ledger.tasks_on(1), ["A"]);
    }

    #[test]
    fn test_precedence_raises_child_early_date() {
        // A lands on day 1; B's early date is raised to day 1 and its
        // least-loaded remaining day is day 2.
        let graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(1), day(3)).with_duration(60),
            Task::new("B", day(1), day(5)).with_duration(90).with_parent("A"),
        ])
        .unwrap();
        let events = vec![Event::new("E", day(1), 9 * 60, 120)];
        let (state, _, errors) = run(&graph, &events, 5);

        assert!(errors.is_empty());
        assert_eq!(state.assigned_day[0], Some(1));
        assert_eq!(state.working_early[1], 1);
        assert_eq!(state.assigned_day[1], Some(2));
    }

    #[test]
    fn test_infeasible_window_reported_not_crashed() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("bad", day(6), day(3)).with_duration(30),
        ])
        .unwrap();
        let (state, _, errors) = run(&graph, &[], 6);

        assert!(!state.is_placed(0));
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ScheduleError::InfeasibleWindow { task_id, .. } if task_id == "bad"
        ));
    }

    #[test]
    fn test_window_entirely_in_past_is_infeasible() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("overdue", day(1), day(3)).with_duration(30),
        ])
        .unwrap();
        let today = day(5);
        let mut ledger = LoadLedger::new(1);
        let mut state = RunState::new(&graph, today);
        let errors = GreedyAssigner::run(&graph, &mut state, &mut ledger, today);

        assert!(matches!(&errors[0], ScheduleError::InfeasibleWindow { .. }));
    }

    #[test]
    fn test_cycle_reported_as_unresolved() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("X", day(1), day(5)).with_parent("Y"),
            Task::new("Y", day(1), day(5)).with_parent("X"),
        ])
        .unwrap();
        let (state, _, errors) = run(&graph, &[], 5);

        assert!(!state.is_placed(0) && !state.is_placed(1));
        assert_eq!(
            errors,
            vec![ScheduleError::CyclicOrUnresolvedDependency {
                task_ids: vec!["X".into(), "Y".into()],
            }]
        );
    }

    #[test]
    fn test_child_of_infeasible_parent_is_unresolved() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("bad", day(6), day(3)),
            Task::new("child", day(1), day(9)).with_parent("bad"),
        ])
        .unwrap();
        let (state, _, errors) = run(&graph, &[], 9);

        assert!(!state.is_placed(1));
        assert!(errors.contains(&ScheduleError::CyclicOrUnresolvedDependency {
            task_ids: vec!["child".into()],
        }));
        // Both the window error and the downstream unresolved error surface.
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_unblocked_siblings_still_scheduled() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("X", day(1), day(5)).with_parent("Y"),
            Task::new("Y", day(1), day(5)).with_parent("X"),
            Task::new("ok", day(1), day(5)).with_duration(45),
        ])
        .unwrap();
        let (state, ledger, errors) = run(&graph, &[], 5);

        assert_eq!(errors.len(), 1);
        assert!(state.is_placed(2));
        assert_eq!(ledger.tasks_on(state.assigned_day[2].unwrap()), ["ok"]);
    }

    #[test]
    fn test_chain_schedules_in_dependency_order() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("C", day(1), day(9)).with_duration(30).with_parent("B"),
            Task::new("B", day(1), day(9)).with_duration(30).with_parent("A"),
            Task::new("A", day(1), day(9)).with_duration(30),
        ])
        .unwrap();
        let (state, _, errors) = run(&graph, &[], 9);

        assert!(errors.is_empty());
        let a = state.assigned_day[2].unwrap();
        let b = state.assigned_day[1].unwrap();
        let c = state.assigned_day[0].unwrap();
        assert!(a <= b && b <= c);
    }
}
