// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::counter::DependencyCounter;
use crate::errors::SchedulerError;
use crate::gate::GateSender;
use crate::model::{Buffer, Task, TaskId, WorkflowDescriptor};

/// Run status (SPEC_FULL §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Aborted,
    Done,
}

/// Scheduler-owned, per-run state (SPEC_FULL §3's `WorkflowState`).
///
/// Mutated only through the scheduler's own fibres; shared across them via
/// `Arc<Mutex<WorkflowState>>` (SPEC_FULL §5 notes this can be lock-free in
/// a true single-threaded cooperative executor, but a multi-threaded tokio
/// runtime needs the mutex to prevent data races — see DESIGN.md).
pub struct WorkflowState {
    pub tasks: HashMap<TaskId, Task>,
    pub reverse_index: HashMap<TaskId, HashSet<TaskId>>,
    pub pending_count: DependencyCounter,
    pub readiness_senders: HashMap<TaskId, GateSender>,
    pub results: HashMap<TaskId, Buffer>,
    pub remaining: HashSet<TaskId>,
    pub status: Status,
    pub failure_causes: Vec<String>,
}

impl WorkflowState {
    /// Build the initial state from a validated descriptor (SPEC_FULL §4.3
    /// Construction steps 1-3). Step 4 (`NoInitialTasks`) is checked by the
    /// caller once readiness receivers have been handed out.
    pub fn build(
        descriptor: &WorkflowDescriptor,
    ) -> (Self, HashMap<TaskId, crate::gate::GateReceiver>) {
        let mut tasks = HashMap::with_capacity(descriptor.tasks.len());
        let mut reverse_index: HashMap<TaskId, HashSet<TaskId>> = HashMap::new();
        let mut pending_count = DependencyCounter::new();
        let mut readiness_senders = HashMap::with_capacity(descriptor.tasks.len());
        let mut readiness_receivers = HashMap::with_capacity(descriptor.tasks.len());

        for descriptor in &descriptor.tasks {
            let task = Task::from_descriptor(descriptor);
            reverse_index.entry(task.id.clone()).or_default();
            pending_count.set(&task.id, 0);
            let (tx, rx) = crate::gate::readiness_gate();
            readiness_senders.insert(task.id.clone(), tx);
            readiness_receivers.insert(task.id.clone(), rx);
            tasks.insert(task.id.clone(), task);
        }

        // Step 3: for each task and dep key, increment pending_count by the
        // target count (multiplicity) and add the task to reverse_index
        // keyed by *target*, for both scalar and group deps — the resolved
        // Open Question of SPEC_FULL §9.
        for task in tasks.values() {
            for target in task.dependency_targets_with_multiplicity() {
                pending_count.increment(&task.id, 1);
                reverse_index.entry(target.to_string()).or_default().insert(task.id.clone());
            }
        }

        let remaining: HashSet<TaskId> = tasks.keys().cloned().collect();

        let state = WorkflowState {
            tasks,
            reverse_index,
            pending_count,
            readiness_senders,
            results: HashMap::new(),
            remaining,
            status: Status::Running,
            failure_causes: Vec::new(),
        };
        (state, readiness_receivers)
    }

    /// SPEC_FULL §4.3 step 4: a non-empty graph where no task starts ready
    /// implies a cycle validation missed, or a structural inconsistency.
    pub fn has_initial_tasks(&self) -> bool {
        self.tasks.is_empty() || self.tasks.keys().any(|id| self.pending_count.is_zero(id))
    }

    /// SPEC_FULL §4.3 `on_task_finish`: decrement every direct successor's
    /// pending count by the number of references it makes to `finished`,
    /// firing readiness when it reaches zero.
    pub fn on_task_finish(&mut self, finished: &str) -> Result<(), SchedulerError> {
        let successors = self.reverse_index.get(finished).cloned().unwrap_or_default();
        for successor in successors {
            let multiplicity = self
                .tasks
                .get(&successor)
                .map(|t| t.dependency_targets_with_multiplicity().iter().filter(|&&s| s == finished).count())
                .unwrap_or(0);
            for _ in 0..multiplicity {
                let remaining = self.pending_count.decrement(&successor)?;
                if remaining == 0 {
                    if let Some(sender) = self.readiness_senders.get(&successor) {
                        sender.fire_ready();
                    }
                }
            }
        }
        Ok(())
    }

    pub fn fail_unfired_gates(&self, reason: &str) {
        for (id, sender) in &self.readiness_senders {
            if self.remaining.contains(id) {
                sender.fire_failed(reason.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DepRef, TaskDescriptor};
    use crate::model::BufferTypeTag;
    use indexmap::IndexMap as Map;

    fn td(id: &str, deps: &[(&str, DepRef)]) -> TaskDescriptor {
        let dependencies: Map<String, DepRef> = deps.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        TaskDescriptor {
            id: id.to_string(),
            task_type: "echo".to_string(),
            output_type: BufferTypeTag::Uint8,
            dependencies: if dependencies.is_empty() { None } else { Some(dependencies) },
            config: None,
        }
    }

    #[test]
    fn reverse_index_uses_dep_target_for_scalar_and_group() {
        let wf = WorkflowDescriptor {
            tasks: vec![
                td("A", &[]),
                td("B", &[("in", DepRef::Single("A".into()))]),
                td("C", &[("in", DepRef::Group(vec!["A".into(), "B".into()]))]),
            ],
            config: None,
        };
        let (state, _) = WorkflowState::build(&wf);
        assert_eq!(state.reverse_index["A"], ["B".to_string(), "C".to_string()].into_iter().collect());
        assert_eq!(state.reverse_index["B"], ["C".to_string()].into_iter().collect());
        assert_eq!(state.pending_count.get("B"), Some(1));
        assert_eq!(state.pending_count.get("C"), Some(2));
    }

    #[test]
    fn group_dep_with_repeated_source_counts_with_multiplicity() {
        let wf = WorkflowDescriptor {
            tasks: vec![
                td("A", &[]),
                td("T", &[("k", DepRef::Group(vec!["A".into(), "A".into(), "A".into()]))]),
            ],
            config: None,
        };
        let (mut state, mut receivers) = WorkflowState::build(&wf);
        assert_eq!(state.pending_count.get("T"), Some(3));
        assert!(state.has_initial_tasks());

        state.on_task_finish("A").unwrap();
        assert_eq!(state.pending_count.get("T"), Some(0));

        let outcome = futures_test_block_on(receivers.get_mut("T").unwrap().wait());
        assert_eq!(outcome, crate::gate::GateOutcome::Ready);
    }

    #[test]
    fn zero_task_workflow_has_initial_tasks_trivially() {
        let wf = WorkflowDescriptor { tasks: vec![], config: None };
        let (state, _) = WorkflowState::build(&wf);
        assert!(state.has_initial_tasks());
    }

    // A tiny helper so this module's tests don't need #[tokio::test] just to
    // await a gate that is already settled synchronously by the time it's
    // polled.
    fn futures_test_block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(fut)
    }
}
