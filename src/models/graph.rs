//! Task graph arena.
//!
//! Tasks live in an arena (`Vec<Task>` plus an id → index map) and
//! reference each other by id, never by pointer, so the bidirectional
//! parent/child edges cannot form ownership cycles. Insertion order is
//! preserved; the refinement pass sweeps tasks in this order.
//!
//! Edge operations maintain both directions atomically: task B is in
//! A's `children` iff A is in B's `parents`.

use std::collections::HashMap;

use thiserror::Error;

use super::Task;

/// Errors from graph construction and edge mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two tasks share an id.
    #[error("duplicate task id '{0}'")]
    DuplicateTask(String),
    /// An edge references a task not present in the graph.
    #[error("task '{from}' references unknown task '{to}'")]
    UnknownReference { from: String, to: String },
    /// A task listed itself as parent or child.
    #[error("task '{0}' depends on itself")]
    SelfDependency(String),
}

/// Arena of tasks with id-keyed lookup and mirrored dependency edges.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a batch of tasks.
    ///
    /// Rejects duplicate ids, unknown edge references, and self-edges,
    /// then normalizes edge mirrors: every id in a task's `parents` gains
    /// the task in its `children`, and vice versa.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for task in tasks {
            if graph.index.contains_key(&task.id) {
                return Err(GraphError::DuplicateTask(task.id));
            }
            graph.index.insert(task.id.clone(), graph.tasks.len());
            graph.tasks.push(task);
        }

        // Validate declared edges before mirroring.
        for task in &graph.tasks {
            for other in task.parents.iter().chain(task.children.iter()) {
                if other == &task.id {
                    return Err(GraphError::SelfDependency(task.id.clone()));
                }
                if !graph.index.contains_key(other) {
                    return Err(GraphError::UnknownReference {
                        from: task.id.clone(),
                        to: other.clone(),
                    });
                }
            }
        }

        // Mirror: parents gain children, children gain parents.
        let mut mirrors: Vec<(usize, usize)> = Vec::new(); // (parent, child)
        for (i, task) in graph.tasks.iter().enumerate() {
            for parent in &task.parents {
                mirrors.push((graph.index[parent], i));
            }
            for child in &task.children {
                mirrors.push((i, graph.index[child]));
            }
        }
        for (p, c) in mirrors {
            let child_id = graph.tasks[c].id.clone();
            let parent_id = graph.tasks[p].id.clone();
            graph.tasks[p].children.insert(child_id);
            graph.tasks[c].parents.insert(parent_id);
        }

        Ok(graph)
    }

    /// Adds a single task. Its declared edges must reference tasks
    /// already in the graph; mirrors are updated immediately.
    pub fn add_task(&mut self, task: Task) -> Result<(), GraphError> {
        if self.index.contains_key(&task.id) {
            return Err(GraphError::DuplicateTask(task.id));
        }
        for other in task.parents.iter().chain(task.children.iter()) {
            if other == &task.id {
                return Err(GraphError::SelfDependency(task.id.clone()));
            }
            if !self.index.contains_key(other) {
                return Err(GraphError::UnknownReference {
                    from: task.id.clone(),
                    to: other.clone(),
                });
            }
        }

        let id = task.id.clone();
        for parent in task.parents.clone() {
            let p = self.index[&parent];
            self.tasks[p].children.insert(id.clone());
        }
        for child in task.children.clone() {
            let c = self.index[&child];
            self.tasks[c].parents.insert(id.clone());
        }
        self.index.insert(id, self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    /// Inserts a parent → child dependency, maintaining both directions.
    pub fn add_dependency(&mut self, child_id: &str, parent_id: &str) -> Result<(), GraphError> {
        if child_id == parent_id {
            return Err(GraphError::SelfDependency(child_id.to_string()));
        }
        let c = self.index_of(child_id).ok_or_else(|| GraphError::UnknownReference {
            from: parent_id.to_string(),
            to: child_id.to_string(),
        })?;
        let p = self.index_of(parent_id).ok_or_else(|| GraphError::UnknownReference {
            from: child_id.to_string(),
            to: parent_id.to_string(),
        })?;
        self.tasks[c].parents.insert(parent_id.to_string());
        self.tasks[p].children.insert(child_id.to_string());
        Ok(())
    }

    /// Removes a parent → child dependency from both directions.
    ///
    /// Returns `true` if the edge existed.
    pub fn remove_dependency(&mut self, child_id: &str, parent_id: &str) -> bool {
        let (Some(c), Some(p)) = (self.index_of(child_id), self.index_of(parent_id)) else {
            return false;
        };
        let removed = self.tasks[c].parents.remove(parent_id);
        self.tasks[p].children.remove(child_id);
        removed
    }

    /// Removes a task and unlinks all its edges (completion/deletion).
    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let idx = self.index_of(id)?;
        let task = self.tasks.remove(idx);
        self.index.remove(id);
        for t in &mut self.tasks {
            t.parents.remove(id);
            t.children.remove(id);
        }
        // Arena shifted; rebuild the index map.
        self.index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Some(task)
    }

    /// Arena index for a task id.
    #[inline]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index_of(id).map(|i| &self.tasks[i])
    }

    /// Task by arena index.
    #[inline]
    pub fn task_at(&self, idx: usize) -> &Task {
        &self.tasks[idx]
    }

    /// Mutable task by arena index.
    #[inline]
    pub fn task_at_mut(&mut self, idx: usize) -> &mut Task {
        &mut self.tasks[idx]
    }

    /// Arena indices of a task's parents.
    pub fn parent_indices(&self, idx: usize) -> Vec<usize> {
        self.tasks[idx]
            .parents
            .iter()
            .filter_map(|id| self.index_of(id))
            .collect()
    }

    /// Arena indices of a task's children.
    pub fn child_indices(&self, idx: usize) -> Vec<usize> {
        self.tasks[idx]
            .children
            .iter()
            .filter_map(|id| self.index_of(id))
            .collect()
    }

    /// Number of tasks.
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}
