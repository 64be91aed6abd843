use std::collections::HashMap;

use crate::app::Result;
use crate::domain::{validate_tasks, Task, TaskResult, Timestamp};
use crate::sites::SiteRegistry;

/// Every task's result for one run, keyed by task id.
///
/// Created once when the tasks are submitted and mutated in place while they
/// execute; entries are never removed.
#[derive(Debug, Default)]
pub struct RunState {
    order: Vec<String>,
    results: HashMap<String, TaskResult>,
}

impl RunState {
    /// Validates the submission and commits every task with a shared
    /// `commit_ts`. Nothing is created when validation fails.
    pub fn commit(tasks: Vec<Task>, registry: &SiteRegistry) -> Result<Self> {
        validate_tasks(&tasks)?;

        let paginations = tasks
            .iter()
            .map(|t| registry.get(t.site).map(|adapter| adapter.pagination()))
            .collect::<Result<Vec<_>>>()?;

        let commit_ts = Timestamp::now();
        let mut state = Self::default();
        for (task, pagination) in tasks.into_iter().zip(paginations) {
            state.order.push(task.id.clone());
            state
                .results
                .insert(task.id.clone(), TaskResult::committed(task, pagination, commit_ts));
        }
        Ok(state)
    }

    /// Task ids in submission order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, id: &str) -> Option<&TaskResult> {
        self.results.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TaskResult> {
        self.results.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Results in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskResult> {
        self.order.iter().filter_map(|id| self.results.get(id))
    }
}
