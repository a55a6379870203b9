// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The runner's own event loop: single-request-at-a-time dispatch against
//! the `TaskImpl` registry, with cooperative abort handling. Grounded on the
//! cancellation-racing idiom of `engine::reactive::ReactiveExecutor`
//! (`tokio::select!` racing a `CancellationToken` against channel receives).

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::errors::{PoolError, RunnerProtocolError};
use crate::model::{BufferTypeTag, DepValue, TaskId};
use crate::observability::messages::{runner as runner_messages, StructuredLog};

use super::protocol::{RunnerRequest, RunnerResponse, TaskContext};
use super::TaskImplRegistry;

/// A checked-out runner: both halves of its channel pair, owned exclusively
/// by whoever currently holds this handle (the `RunnerPool`, or a scheduler
/// fibre between `acquire` and `release`).
pub struct RunnerHandle {
    pub id: u64,
    to_runner: mpsc::Sender<RunnerRequest>,
    from_runner: mpsc::Receiver<RunnerResponse>,
}

impl RunnerHandle {
    pub async fn send(&self, request: RunnerRequest) -> bool {
        self.to_runner.send(request).await.is_ok()
    }

    pub async fn recv(&mut self) -> Option<RunnerResponse> {
        self.from_runner.recv().await
    }
}

/// Spawn a runner's event loop and perform the ready handshake (SPEC_FULL
/// §4.4: "Runner construction is asynchronous ... only then is it admitted
/// to the pool"). Returns once the runner's first message is `Ready`, or
/// fails if it sends anything else, closes its channel, or exceeds
/// `ready_timeout`.
pub async fn spawn_runner(
    id: u64,
    registry: TaskImplRegistry,
    ready_timeout: Duration,
) -> Result<RunnerHandle, PoolError> {
    let (to_runner_tx, to_runner_rx) = mpsc::channel(8);
    let (from_runner_tx, mut from_runner_rx) = mpsc::channel(32);

    tokio::spawn(runner_loop(id, registry, to_runner_rx, from_runner_tx));

    match tokio::time::timeout(ready_timeout, from_runner_rx.recv()).await {
        Ok(Some(RunnerResponse::Ready)) => {
            runner_messages::RunnerReady { runner_id: id }.log();
            Ok(RunnerHandle { id, to_runner: to_runner_tx, from_runner: from_runner_rx })
        }
        Ok(Some(other)) => Err(PoolError::ConstructionFailed {
            reason: format!("expected ready{{}}, got {:?}", other),
        }),
        Ok(None) => Err(PoolError::ConstructionFailed {
            reason: "runner channel closed before ready{}".to_string(),
        }),
        Err(_) => Err(PoolError::ConstructionFailed {
            reason: "ready{} handshake timed out".to_string(),
        }),
    }
}

async fn runner_loop(
    id: u64,
    registry: TaskImplRegistry,
    mut from_engine: mpsc::Receiver<RunnerRequest>,
    to_engine: mpsc::Sender<RunnerResponse>,
) {
    if to_engine.send(RunnerResponse::Ready).await.is_err() {
        return;
    }

    while let Some(request) = from_engine.recv().await {
        match request {
            RunnerRequest::Abort { request_id, .. } => {
                // No request in flight at the idle top of the loop: this is
                // a stale abort for a request already finished.
                let _ = to_engine
                    .send(RunnerResponse::Error { request_id, message: "no task in flight".to_string() })
                    .await;
            }
            RunnerRequest::Run { request_id, task_id, task_type, config, inputs, output_type } => {
                serve(
                    id,
                    &registry,
                    request_id,
                    task_id,
                    task_type,
                    config,
                    inputs,
                    output_type,
                    &mut from_engine,
                    &to_engine,
                )
                .await;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn serve(
    id: u64,
    registry: &TaskImplRegistry,
    request_id: String,
    task_id: TaskId,
    task_type: String,
    config: Option<serde_json::Value>,
    inputs: HashMap<String, DepValue>,
    output_type: BufferTypeTag,
    from_engine: &mut mpsc::Receiver<RunnerRequest>,
    to_engine: &mpsc::Sender<RunnerResponse>,
) {
    let Some(task_impl) = registry.get(&task_type).cloned() else {
        let _ = to_engine
            .send(RunnerResponse::Error {
                request_id,
                message: format!("unknown task type '{}'", task_type),
            })
            .await;
        return;
    };

    let cancellation = CancellationToken::new();
    let (progress_tx, mut progress_rx) = mpsc::channel(16);
    let ctx = TaskContext {
        task_id,
        task_type,
        output_type,
        config,
        inputs,
        progress: progress_tx,
        cancellation: cancellation.clone(),
    };

    let exec = task_impl.execute(ctx);
    tokio::pin!(exec);

    let result = loop {
        tokio::select! {
            biased;
            Some(note) = progress_rx.recv() => {
                let _ = to_engine
                    .send(RunnerResponse::Progress { request_id: request_id.clone(), note })
                    .await;
            }
            outcome = &mut exec => {
                break outcome;
            }
            maybe_request = from_engine.recv() => {
                match maybe_request {
                    None => break Err("engine channel closed while task was in flight".to_string()),
                    Some(RunnerRequest::Abort { request_id: rid, reason }) if rid == request_id => {
                        runner_messages::RunnerAborted {
                            runner_id: id,
                            request_id: rid,
                            reason: reason.clone(),
                        }
                        .log();
                        cancellation.cancel();
                    }
                    Some(RunnerRequest::Abort { request_id: rid, .. }) => {
                        runner_messages::RunnerBusyRejected {
                            runner_id: id,
                            in_flight_request: request_id.clone(),
                            rejected_request: rid.clone(),
                        }
                        .log();
                        let _ = to_engine
                            .send(RunnerResponse::Error { request_id: rid, message: RunnerProtocolError::WorkerBusy.to_string() })
                            .await;
                    }
                    Some(RunnerRequest::Run { request_id: rid, .. }) => {
                        runner_messages::RunnerBusyRejected {
                            runner_id: id,
                            in_flight_request: request_id.clone(),
                            rejected_request: rid.clone(),
                        }
                        .log();
                        let _ = to_engine
                            .send(RunnerResponse::Error { request_id: rid, message: RunnerProtocolError::WorkerBusy.to_string() })
                            .await;
                    }
                }
            }
        }
    };

    match result {
        Ok(output) => {
            let _ = to_engine.send(RunnerResponse::Final { request_id, output }).await;
        }
        Err(message) => {
            let _ = to_engine.send(RunnerResponse::Error { request_id, message }).await;
        }
    }
}
