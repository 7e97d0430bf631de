//! Input validation for task graphs.
//!
//! Checks structural integrity before scheduling. Detects:
//! - Infeasible windows (early date after due date)
//! - Circular prerequisite dependencies (DAG validation)
//! - Non-positive durations
//!
//! Validation is advisory: the optimizer independently detects and
//! reports infeasible windows and cycles at run time. Running
//! validation first lets a caller reject bad input with precise
//! messages before committing to a run.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::HashSet;

use crate::models::TaskGraph;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A task's early date falls after its due date.
    InfeasibleWindow,
    /// The prerequisite graph contains a cycle.
    CyclicDependency,
    /// A task has a non-positive estimated duration.
    ZeroDuration,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a task graph for scheduling.
///
/// Checks:
/// 1. Every task's window is non-empty (`early_date <= due_date`)
/// 2. Every duration is positive
/// 3. No circular prerequisite dependencies
///
/// Duplicate ids, unknown references, and self-edges cannot occur in a
/// constructed [`TaskGraph`]; they are rejected at build time.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_graph(graph: &TaskGraph) -> ValidationResult {
    let mut errors = Vec::new();

    for task in graph.iter() {
        if task.early_date > task.due_date {
            errors.push(ValidationError::new(
                ValidationErrorKind::InfeasibleWindow,
                format!(
                    "Task '{}' has early date {} after due date {}",
                    task.id, task.early_date, task.due_date
                ),
            ));
        }
        if task.duration_minutes <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!(
                    "Task '{}' has non-positive duration {}",
                    task.id, task.duration_minutes
                ),
            ));
        }
    }

    if let Some(cycle_err) = detect_cycles(graph) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the prerequisite graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS over parent → child edges. If a back-edge
/// is found (visiting a task currently in the recursion stack), a
/// cycle exists.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycles(graph: &TaskGraph) -> Option<ValidationError> {
    let mut visited: HashSet<usize> = HashSet::new();
    let mut in_stack: HashSet<usize> = HashSet::new();

    for idx in 0..graph.len() {
        if !visited.contains(&idx) && has_cycle_dfs(graph, idx, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!(
                    "Circular dependency detected involving task '{}'",
                    graph.task_at(idx).id
                ),
            ));
        }
    }

    None
}

fn has_cycle_dfs(
    graph: &TaskGraph,
    idx: usize,
    visited: &mut HashSet<usize>,
    in_stack: &mut HashSet<usize>,
) -> bool {
    visited.insert(idx);
    in_stack.insert(idx);

    for next in graph.child_indices(idx) {
        if in_stack.contains(&next) {
            return true; // Back edge → cycle
        }
        if !visited.contains(&next) && has_cycle_dfs(graph, next, visited, in_stack) {
            return true;
        }
    }

    in_stack.remove(&idx);
    false
}
