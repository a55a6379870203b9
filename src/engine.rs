// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The engine façade (SPEC_FULL §4.6): construct once from an
//! [`EngineOptions`] and a [`TaskImplRegistry`], then call [`Engine::submit`]
//! per workflow run. One entry point assembles the runnable pieces from
//! configuration, generalized from a single fixed executor to a pool the
//! engine owns for its whole lifetime, matching §9's "no ambient global
//! state" redesign note: a process may construct more than one `Engine`,
//! each with its own pool.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::EngineOptions;
use crate::errors::{PoolError, SchedulerError};
use crate::model::WorkflowDescriptor;
use crate::runner::{RunnerPool, TaskImplRegistry};
use crate::scheduler::{Event, RunOptions, Scheduler};
use crate::validation::GraphValidator;

/// A constructed engine, holding its own runner pool. Cloning is cheap
/// (it is a thin wrapper around an `Arc<RunnerPool>` and a `Scheduler`);
/// every clone shares the same pool.
#[derive(Clone)]
pub struct Engine {
    pool: Arc<RunnerPool>,
    scheduler: Arc<Scheduler>,
}

impl Engine {
    /// Build an engine, eagerly constructing `options.pool_min` runners
    /// against `registry`.
    pub async fn new(options: EngineOptions, registry: TaskImplRegistry) -> Result<Self, PoolError> {
        let pool = RunnerPool::new(options.pool_min, options.pool_max, registry, options.ready_timeout).await?;
        let scheduler = Arc::new(Scheduler::new(pool.clone(), RunOptions { abort_grace: options.abort_grace }));
        Ok(Self { pool, scheduler })
    }

    /// Validate and run `descriptor`, returning the outbox receiver. The
    /// caller drives the stream to completion; dropping the receiver does
    /// not stop the run, but the run's outbox send will simply stop being
    /// read (the channel's capacity-1 backpressure then stalls the run's
    /// internal fibres, which is the documented behavior of an unread
    /// stream per SPEC_FULL §4.3's Contract).
    pub fn submit(
        &self,
        descriptor: WorkflowDescriptor,
        cancellation: CancellationToken,
    ) -> Result<mpsc::Receiver<Result<Event, SchedulerError>>, SchedulerError> {
        GraphValidator::validate(&descriptor).map_err(|err| SchedulerError::StructuralBug { message: err.to_string() })?;
        Ok(self.scheduler.run(descriptor, cancellation))
    }

    /// Terminate the backing pool, dropping idle runners and failing any
    /// pending acquires. Runs already in flight are not forcibly stopped;
    /// cancel their tokens first if that is required.
    pub async fn shutdown(&self) {
        self.pool.terminate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BufferTypeTag, TaskDescriptor};
    use crate::tasks::builtin_registry;
    use std::time::Duration;

    fn descriptor(id: &str) -> TaskDescriptor {
        TaskDescriptor {
            id: id.to_string(),
            task_type: "echo".to_string(),
            output_type: BufferTypeTag::Uint8,
            dependencies: None,
            config: None,
        }
    }

    #[tokio::test]
    async fn submit_runs_a_trivial_workflow_to_completion() {
        let options = EngineOptions {
            pool_min: 1,
            pool_max: 2,
            ready_timeout: Duration::from_millis(500),
            abort_grace: Duration::from_millis(500),
        };
        let engine = Engine::new(options, builtin_registry()).await.unwrap();

        let wf = WorkflowDescriptor { tasks: vec![descriptor("A")], config: None };
        let mut rx = engine.submit(wf, CancellationToken::new()).unwrap();

        let mut saw_final = false;
        while let Some(event) = rx.recv().await {
            if matches!(event, Ok(Event::Final { .. })) {
                saw_final = true;
            }
        }
        assert!(saw_final);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn submit_rejects_an_invalid_descriptor_before_running() {
        let options = EngineOptions::default();
        let engine = Engine::new(options, builtin_registry()).await.unwrap();

        let mut deps = indexmap::IndexMap::new();
        deps.insert("in".to_string(), crate::model::DepRef::Single("missing".to_string()));
        let bad = TaskDescriptor {
            id: "A".to_string(),
            task_type: "echo".to_string(),
            output_type: BufferTypeTag::Uint8,
            dependencies: Some(deps),
            config: None,
        };
        let wf = WorkflowDescriptor { tasks: vec![bad], config: None };

        assert!(engine.submit(wf, CancellationToken::new()).is_err());
        engine.shutdown().await;
    }
}
