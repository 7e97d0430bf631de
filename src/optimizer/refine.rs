//! Local-search refinement.
//!
//! Bounded hill-climb over the greedy schedule: repeated sweeps apply
//! single-task moves and pairwise swaps that strictly reduce the load
//! imbalance between the two days involved, until a sweep changes
//! nothing or the sweep cap is hit. The result is a local optimum of
//! the move/swap neighborhood, not a global one.
//!
//! Each sweep visits tasks in arena order (not re-sorted) and
//! recomputes the task's *true window* — its own window narrowed by the
//! current placements of parents and children — before probing days.
//! Parents and children shift between sweeps, so this recomputation is
//! what keeps the precedence invariant intact under perturbation.
//!
//! # Reference
//! Aarts & Lenstra (1997), "Local Search in Combinatorial Optimization"

use chrono::NaiveDate;
use tracing::debug;

use super::ledger::LoadLedger;
use super::order::SchedulingOrder;
use super::state::RunState;
use crate::models::TaskGraph;

/// Default sweep cap. Convergence is usually far faster; the cap only
/// bounds the worst case.
pub const DEFAULT_MAX_SWEEPS: usize = 100;

/// Policy for swaps whose load delta is exactly zero.
///
/// The accept/reject rule for *improving* swaps is load math; what to
/// do with equal-delta swaps is a heuristic, so it is pluggable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SwapTieBreak {
    /// Accept an equal-delta swap when it places the task that sorts
    /// earlier (per [`SchedulingOrder`]) on the earlier-or-equal day,
    /// and neither day is today (day 0 composition is already visible
    /// to the user, so it is left undisturbed).
    #[default]
    OrderPreserving,
    /// Never accept equal-delta swaps.
    Reject,
}

/// The refinement pass.
#[derive(Debug, Clone, Copy)]
pub struct Refiner {
    max_sweeps: usize,
    tie_break: SwapTieBreak,
}

impl Default for Refiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Refiner {
    /// Creates a refiner with the default cap and tie-break policy.
    pub fn new() -> Self {
        Self {
            max_sweeps: DEFAULT_MAX_SWEEPS,
            tie_break: SwapTieBreak::default(),
        }
    }

    /// Sets the sweep cap.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps.max(1);
        self
    }

    /// Sets the equal-delta swap policy.
    pub fn with_tie_break(mut self, tie_break: SwapTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Refines the schedule to a move/swap local optimum.
    ///
    /// Returns the number of sweeps performed.
    pub fn run(
        &self,
        graph: &TaskGraph,
        state: &mut RunState,
        ledger: &mut LoadLedger,
        today: NaiveDate,
    ) -> usize {
        let order = SchedulingOrder::new(today);
        for sweep in 1..=self.max_sweeps {
            let mut changed = false;
            for idx in 0..graph.len() {
                let Some(cur) = state.assigned_day[idx] else {
                    continue;
                };
                if self.refine_task(graph, state, ledger, &order, today, idx, cur) {
                    changed = true;
                }
            }
            if !changed {
                debug!(sweeps = sweep, "refinement converged");
                return sweep;
            }
        }
        debug!(sweeps = self.max_sweeps, "refinement hit sweep cap");
        self.max_sweeps
    }

    /// Applies moves and swaps for one task. Returns whether anything
    /// changed.
    #[allow(clippy::too_many_arguments)]
    fn refine_task(
        &self,
        graph: &TaskGraph,
        state: &mut RunState,
        ledger: &mut LoadLedger,
        order: &SchedulingOrder,
        today: NaiveDate,
        idx: usize,
        mut cur: i64,
    ) -> bool {
        let Some((lo, hi)) = true_window(graph, state, idx, today, ledger.horizon()) else {
            return false;
        };
        let task = graph.task_at(idx);
        let duration = task.duration_minutes;
        let mut changed = false;

        // Move: relocate to any window day that strictly reduces the
        // imbalance between the old and new day. The task may move more
        // than once as later days improve the comparison further.
        for day in lo..=hi {
            if day == cur {
                continue;
            }
            let before = ledger.imbalance(cur, day);
            let after =
                ((ledger.minutes_on(cur) - duration) - (ledger.minutes_on(day) + duration)).abs();
            if after < before {
                ledger.relocate(cur, day, &task.id, duration);
                state.assigned_day[idx] = Some(day);
                cur = day;
                changed = true;
            }
        }

        // Swap: exchange days with another task when that strictly
        // improves the pair's imbalance, or (per policy) when it ties.
        'days: for day in lo..=hi {
            if day == cur {
                continue;
            }
            // Rejected candidates leave the day's list untouched, so
            // positional iteration needs no copy; an accepted swap
            // mutates the list but also exits the day.
            let mut pos = 0;
            while pos < ledger.tasks_on(day).len() {
                let other_idx = graph.index_of(&ledger.tasks_on(day)[pos]);
                pos += 1;
                let Some(other_idx) = other_idx else {
                    continue;
                };
                let other = graph.task_at(other_idx);
                // Swapping across a dependency edge would invert it.
                if task.parents.contains(&other.id) || task.children.contains(&other.id) {
                    continue;
                }
                // The other task must legally accept our day.
                let Some((other_lo, other_hi)) =
                    true_window(graph, state, other_idx, today, ledger.horizon())
                else {
                    continue;
                };
                if other_hi < cur || other_lo > cur {
                    continue;
                }

                let a = ledger.minutes_on(cur);
                let b = ledger.minutes_on(day);
                let before = (a - b).abs();
                let after = ((a - duration + other.duration_minutes)
                    - (b - other.duration_minutes + duration))
                    .abs();

                let accept = after < before
                    || (after == before
                        && self.tie_break == SwapTieBreak::OrderPreserving
                        && preserves_order(order, task, cur, other, day));
                if accept {
                    ledger.swap(
                        cur,
                        &task.id,
                        duration,
                        day,
                        &other.id,
                        other.duration_minutes,
                    );
                    state.assigned_day[idx] = Some(day);
                    state.assigned_day[other_idx] = Some(cur);
                    cur = day;
                    changed = true;
                    continue 'days;
                }
            }
        }

        changed
    }
}

/// The task's window narrowed by currently placed parents and children.
///
/// Returns `None` when the narrowed window is empty (the task cannot be
/// perturbed without breaking an invariant).
fn true_window(
    graph: &TaskGraph,
    state: &RunState,
    idx: usize,
    today: NaiveDate,
    horizon: i64,
) -> Option<(i64, i64)> {
    let task = graph.task_at(idx);
    let mut lo = task.early_index(today).max(0);
    let mut hi = task.due_index(today).min(horizon - 1);
    for parent in graph.parent_indices(idx) {
        if let Some(day) = state.assigned_day[parent] {
            lo = lo.max(day);
        }
    }
    for child in graph.child_indices(idx) {
        if let Some(day) = state.assigned_day[child] {
            hi = hi.min(day);
        }
    }
    (lo <= hi).then_some((lo, hi))
}

/// Whether an equal-delta swap keeps the scheduling order consistent
/// with the days: after `task` → `task_day_after` and `other` →
/// `other_day_after`, the task that sorts earlier must not land on the
/// later day. Swaps touching today (day 0) are always rejected here to
/// avoid churning a day the user is already working from.
fn preserves_order(
    order: &SchedulingOrder,
    task: &crate::models::Task,
    task_day: i64,
    other: &crate::models::Task,
    other_day: i64,
) -> bool {
    if task_day == 0 || other_day == 0 {
        return false;
    }
    // After the swap, `task` sits on `other_day` and vice versa.
    let (first_day, second_day) = match order.cmp(task, other) {
        std::cmp::Ordering::Less => (other_day, task_day),
        _ => (task_day, other_day),
    };
    first_day <= second_day
}
