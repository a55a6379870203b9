// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The scheduler's execution loop (SPEC_FULL §4.3): one fibre per task,
//! a shared `Arc<Mutex<WorkflowState>>`, and an outbox that streams
//! `Intermediate`/`Final` events until the run settles. Grounded on
//! `engine::reactive::ReactiveExecutor`'s per-item-task, channel-driven
//! shape, generalised from its fixed pipeline stages to an arbitrary DAG.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::errors::{RunnerProtocolError, SchedulerError};
use crate::model::{DepValue, TaskId, WorkflowDescriptor};
use crate::observability::messages::{scheduler as scheduler_messages, StructuredLog};
use crate::runner::{RunnerPool, RunnerRequest, RunnerResponse};

use super::event::Event;
use super::state::{Status, WorkflowState};

/// Tunables for a single run, distinct from the pool's own construction
/// bounds (SPEC_FULL §4.6's `EngineOptions`).
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub abort_grace: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { abort_grace: Duration::from_secs(5) }
    }
}

/// Drives one workflow descriptor to completion against a shared runner
/// pool, emitting events on a bounded (capacity 1) outbox channel.
pub struct Scheduler {
    pool: Arc<RunnerPool>,
    options: RunOptions,
}

impl Scheduler {
    pub fn new(pool: Arc<RunnerPool>, options: RunOptions) -> Self {
        Self { pool, options }
    }

    /// Run `descriptor` to completion (the caller is assumed to have run
    /// [`crate::validation::GraphValidator`] already; this does not
    /// re-validate). Returns the receiving half of the outbox; the run
    /// drives itself on a spawned task and keeps going even if the
    /// caller drops or lags behind on the receiver, modulo the channel's
    /// single-slot backpressure.
    pub fn run(
        &self,
        descriptor: WorkflowDescriptor,
        cancellation: CancellationToken,
    ) -> mpsc::Receiver<Result<Event, SchedulerError>> {
        let (outbox_tx, outbox_rx) = mpsc::channel(1);
        let pool = self.pool.clone();
        let abort_grace = self.options.abort_grace;

        tokio::spawn(async move {
            if let Err(err) = drive(descriptor, pool, cancellation, abort_grace, outbox_tx.clone()).await {
                scheduler_messages::RunFailed { error: &err }.log();
                let _ = outbox_tx.send(Err(err)).await;
            }
        });

        outbox_rx
    }
}

async fn drive(
    descriptor: WorkflowDescriptor,
    pool: Arc<RunnerPool>,
    cancellation: CancellationToken,
    abort_grace: Duration,
    outbox: mpsc::Sender<Result<Event, SchedulerError>>,
) -> Result<(), SchedulerError> {
    let started = Instant::now();
    let task_count = descriptor.tasks.len();

    let (state, mut readiness) = WorkflowState::build(&descriptor);
    if !state.has_initial_tasks() {
        return Err(SchedulerError::NoInitialTasks);
    }

    scheduler_messages::RunStarted { task_count }.log();

    let state = Arc::new(Mutex::new(state));
    let all_ids: Vec<TaskId> = readiness.keys().cloned().collect();

    // Abort listener: fails every not-yet-fired readiness gate the moment
    // the caller's token fires, independent of any in-flight fibre's own
    // detection of the same token. Aborted once the run settles below so it
    // never outlives `drive` (it would otherwise hold `state` — and every
    // completed task's Buffer inside it — open for the rest of the process).
    let abort_listener = {
        let state = state.clone();
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            cancellation.cancelled().await;
            let mut state = state.lock().await;
            state.status = Status::Aborted;
            state.fail_unfired_gates("workflow run was cancelled");
        })
    };

    let mut fibres = Vec::with_capacity(all_ids.len());
    for id in all_ids {
        let receiver = readiness.remove(&id).expect("every task has a readiness receiver");
        let fibre = tokio::spawn(run_task_fibre(
            id,
            receiver,
            state.clone(),
            pool.clone(),
            cancellation.clone(),
            abort_grace,
            outbox.clone(),
        ));
        fibres.push(fibre);
    }

    let mut causes = Vec::new();
    for fibre in fibres {
        match fibre.await {
            Ok(Ok(())) => {}
            Ok(Err(cause)) => causes.push(cause),
            Err(join_err) => causes.push(format!("task fibre panicked: {}", join_err)),
        }
    }

    abort_listener.abort();

    let mut state_guard = state.lock().await;
    if !causes.is_empty() || state_guard.status == Status::Aborted {
        state_guard.status = Status::Aborted;
        let reason = if causes.is_empty() {
            "workflow run was cancelled".to_string()
        } else {
            causes.join("; ")
        };
        scheduler_messages::RunAborted { reason: &reason }.log();
        return Err(SchedulerError::Aggregate { causes: if causes.is_empty() { vec![reason] } else { causes } });
    }

    state_guard.status = Status::Done;
    let results = state_guard.results.clone();
    drop(state_guard);

    scheduler_messages::RunCompleted { task_count, duration: started.elapsed() }.log();
    let _ = outbox.send(Ok(Event::Final { results })).await;
    Ok(())
}

/// One task's lifecycle: await readiness, resolve inputs, acquire a
/// runner, drive it to a terminal response, update shared state, and
/// release (or discard) the runner. Returns `Err(cause)` on any failure
/// that should abort the whole run.
async fn run_task_fibre(
    task_id: TaskId,
    mut readiness: crate::gate::GateReceiver,
    state: Arc<Mutex<WorkflowState>>,
    pool: Arc<RunnerPool>,
    cancellation: CancellationToken,
    abort_grace: Duration,
    outbox: mpsc::Sender<Result<Event, SchedulerError>>,
) -> Result<(), String> {
    match readiness.wait().await {
        crate::gate::GateOutcome::Failed(reason) => return Err(reason),
        crate::gate::GateOutcome::Ready => {}
    }

    {
        let guard = state.lock().await;
        if guard.status == Status::Aborted {
            return Err("workflow already aborted".to_string());
        }
    }

    let (task_type, output_type, config, inputs) = {
        let guard = state.lock().await;
        let task = guard
            .tasks
            .get(&task_id)
            .ok_or_else(|| format!("structural bug: task '{}' missing from state", task_id))?;
        let inputs = resolve_inputs(task, &guard)?;
        (task.task_type.clone(), task.output_type, task.config.clone(), inputs)
    };

    scheduler_messages::TaskStarted { task_id: &task_id }.log();
    let started = Instant::now();

    let mut handle = pool.acquire().await.map_err(|err| err.to_string())?;
    let request_id = task_id.clone();

    if !handle
        .send(RunnerRequest::Run {
            request_id: request_id.clone(),
            task_id: task_id.clone(),
            task_type,
            config,
            inputs,
            output_type,
        })
        .await
    {
        let _ = pool.discard(handle).await;
        return Err(format!("task '{}': runner channel closed before dispatch", task_id));
    }

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                handle
                    .send(RunnerRequest::Abort { request_id: request_id.clone(), reason: "workflow aborted".to_string() })
                    .await;
                let acked = tokio::time::timeout(abort_grace, handle.recv()).await;
                let _ = pool.discard(handle).await;
                if acked.is_err() {
                    break Err(RunnerProtocolError::AbortGraceExpired.to_string());
                }
                break Err("workflow aborted".to_string());
            }
            response = handle.recv() => {
                match response {
                    Some(RunnerResponse::Progress { note, .. }) => {
                        tracing::debug!(task_id = %task_id, note = %note, "task progress");
                    }
                    Some(RunnerResponse::Final { output, .. }) => {
                        let _ = pool.release(handle).await;
                        break Ok(output);
                    }
                    Some(RunnerResponse::Error { message, .. }) => {
                        let _ = pool.release(handle).await;
                        break Err(message);
                    }
                    Some(RunnerResponse::Ready) | None => {
                        let _ = pool.discard(handle).await;
                        break Err(format!("task '{}': {}", task_id, RunnerProtocolError::ChannelClosed));
                    }
                }
                continue;
            }
        }
    };

    match outcome {
        Ok(output) => {
            scheduler_messages::TaskCompleted {
                task_id: &task_id,
                duration: started.elapsed(),
                output_len: output.len(),
            }
            .log();

            let mut guard = state.lock().await;
            guard.results.insert(task_id.clone(), output.clone());
            guard.remaining.remove(&task_id);
            guard.on_task_finish(&task_id).map_err(|e| e.to_string())?;
            drop(guard);

            let _ = outbox.send(Ok(Event::Intermediate { task_id: task_id.clone(), output })).await;
            Ok(())
        }
        Err(cause) => {
            let mut guard = state.lock().await;
            guard.status = Status::Aborted;
            guard.failure_causes.push(format!("task '{}': {}", task_id, cause));
            guard.fail_unfired_gates("a sibling task failed");
            cancellation.cancel();
            Err(format!("task '{}': {}", task_id, cause))
        }
    }
}

fn resolve_inputs(
    task: &crate::model::Task,
    state: &WorkflowState,
) -> Result<HashMap<String, DepValue>, String> {
    let mut inputs = HashMap::with_capacity(task.dependencies.len());
    for (key, dep) in &task.dependencies {
        let value = match dep {
            crate::model::DepRef::Single(id) => {
                let buf = state
                    .results
                    .get(id)
                    .ok_or_else(|| format!("structural bug: dependency '{}' of '{}' not yet resolved", id, task.id))?;
                DepValue::Single(buf.clone())
            }
            crate::model::DepRef::Group(ids) => {
                let mut bufs = Vec::with_capacity(ids.len());
                for id in ids {
                    let buf = state
                        .results
                        .get(id)
                        .ok_or_else(|| format!("structural bug: dependency '{}' of '{}' not yet resolved", id, task.id))?;
                    bufs.push(buf.clone());
                }
                DepValue::Group(bufs)
            }
        };
        inputs.insert(key.clone(), value);
    }
    Ok(inputs)
}
