//! Dependency resolution
//!
//! Depth-first traversal over `dependsOn` edges with three-state marking.
//! Every call builds its own state map, so one resolver can serve any number
//! of independent (even concurrent) resolutions.

use crate::error::{ResolveError, ResolveResult};
use crate::runner::{DependsOrder, Task};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

/// Traversal state of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Lookup of tasks by label, with ordering queries over their dependencies
#[derive(Debug, Clone)]
pub struct DependencyResolver<'a> {
    tasks: HashMap<&'a str, &'a Task>,
    // declaration order, for deterministic whole-set walks
    labels: Vec<&'a str>,
}

impl<'a> DependencyResolver<'a> {
    /// Index a task set by label
    ///
    /// With duplicate labels the last declaration wins.
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut map = HashMap::with_capacity(tasks.len());
        let mut labels = Vec::with_capacity(tasks.len());
        for task in tasks {
            if map.insert(task.label.as_str(), task).is_none() {
                labels.push(task.label.as_str());
            }
        }
        DependencyResolver { tasks: map, labels }
    }

    /// Look up a task by label
    pub fn get(&self, label: &str) -> Option<&'a Task> {
        self.tasks.get(label).copied()
    }

    /// Tasks to run for `label`, dependencies first and `label` last
    pub fn resolve_execution_order(&self, label: &str) -> ResolveResult<Vec<&'a Task>> {
        let mut states = HashMap::new();
        let mut order = Vec::new();
        self.visit(label, &mut states, &mut order)?;
        debug!(
            target_label = label,
            order = ?order.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(),
            "resolved execution order"
        );
        Ok(order)
    }

    fn visit(
        &self,
        label: &str,
        states: &mut HashMap<&'a str, VisitState>,
        order: &mut Vec<&'a Task>,
    ) -> ResolveResult<()> {
        match states.get(label) {
            Some(VisitState::Visiting) => {
                return Err(ResolveError::CircularDependency(label.to_string()));
            }
            Some(VisitState::Visited) => return Ok(()),
            None => {}
        }

        let task = self
            .get(label)
            .ok_or_else(|| ResolveError::TaskNotFound(label.to_string()))?;

        trace!(label, "visiting");
        states.insert(task.label.as_str(), VisitState::Visiting);

        // declared order matters for sequence mode and is kept for parallel too
        for dep in &task.depends_on {
            self.visit(dep, states, order)?;
        }

        states.insert(task.label.as_str(), VisitState::Visited);
        order.push(task);
        Ok(())
    }

    /// Batches of tasks for `label`
    ///
    /// A task's parallel dependencies form one batch placed right before the
    /// task's own single-task batch. Sequence dependencies are not batched:
    /// each one contributes its own batches in declared order.
    pub fn parallel_groups(&self, label: &str) -> ResolveResult<Vec<Vec<&'a Task>>> {
        let mut states = HashMap::new();
        let mut groups = Vec::new();
        self.build_groups(label, &mut states, &mut groups)?;
        Ok(groups)
    }

    fn build_groups(
        &self,
        label: &str,
        states: &mut HashMap<&'a str, VisitState>,
        groups: &mut Vec<Vec<&'a Task>>,
    ) -> ResolveResult<()> {
        match states.get(label) {
            Some(VisitState::Visiting) => {
                return Err(ResolveError::CircularDependency(label.to_string()));
            }
            Some(VisitState::Visited) => return Ok(()),
            None => {}
        }

        let task = self
            .get(label)
            .ok_or_else(|| ResolveError::TaskNotFound(label.to_string()))?;

        states.insert(task.label.as_str(), VisitState::Visiting);

        match task.depends_order {
            DependsOrder::Sequence => {
                for dep in &task.depends_on {
                    self.build_groups(dep, states, groups)?;
                }
            }
            DependsOrder::Parallel => {
                let mut batch = Vec::with_capacity(task.depends_on.len());
                for dep in &task.depends_on {
                    self.build_groups(dep, states, groups)?;
                    if let Some(dep_task) = self.get(dep) {
                        batch.push(dep_task);
                    }
                }
                if !batch.is_empty() {
                    groups.push(batch);
                }
            }
        }

        states.insert(task.label.as_str(), VisitState::Visited);
        groups.push(vec![task]);
        Ok(())
    }

    /// Check the whole task set, stopping at the first cycle or missing label
    pub fn validate_dependencies(&self) -> ResolveResult<()> {
        let mut states = HashMap::new();
        let mut order = Vec::new();

        for label in &self.labels {
            if states.get(*label) != Some(&VisitState::Visited) {
                self.visit(label, &mut states, &mut order)?;
            }
        }

        Ok(())
    }

    /// Every dependency label that names no task, sorted and deduplicated
    pub fn missing_dependencies(&self) -> Vec<String> {
        let missing: BTreeSet<&str> = self
            .tasks
            .values()
            .flat_map(|task| task.depends_on.iter())
            .map(String::as_str)
            .filter(|dep| !self.tasks.contains_key(*dep))
            .collect();

        missing.into_iter().map(str::to_string).collect()
    }
}
