// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The logical runner protocol (SPEC_FULL §4.5): the request/response
//! messages exchanged between the scheduler and a runner. Transport framing
//! (the wire envelope of §6's request/response grammar) is out of scope —
//! these are the in-process logical messages it would carry.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::{Buffer, BufferTypeTag, DepValue, TaskId};

/// Message sent from the scheduler to a runner.
#[derive(Debug)]
pub enum RunnerRequest {
    /// Dispatch a task. `request_id` correlates every response the runner
    /// sends back for this invocation.
    Run {
        request_id: String,
        task_id: TaskId,
        task_type: String,
        config: Option<serde_json::Value>,
        inputs: HashMap<String, DepValue>,
        output_type: BufferTypeTag,
    },
    /// Ask the runner to abandon the in-flight request `request_id`.
    Abort {
        request_id: String,
        reason: String,
    },
}

/// Message sent from a runner back to the scheduler.
#[derive(Debug, Clone)]
pub enum RunnerResponse {
    /// Sent exactly once, immediately after the runner's task loop starts.
    Ready,
    /// Zero or more per `request_id`, before its terminal message.
    Progress {
        request_id: String,
        note: String,
    },
    /// Exactly one per successful `request_id`.
    Final {
        request_id: String,
        output: Buffer,
    },
    /// Terminal on failure; also used to answer a request with a
    /// `request_id` that does not match the one currently being served.
    Error {
        request_id: String,
        message: String,
    },
}

/// Everything a [`TaskImpl`] needs to compute one task's output.
pub struct TaskContext {
    pub task_id: TaskId,
    pub task_type: String,
    pub output_type: BufferTypeTag,
    pub config: Option<serde_json::Value>,
    pub inputs: HashMap<String, DepValue>,
    /// Optional progress channel; a task body may send zero or more notes
    /// before returning, each forwarded as a `task:progress` message.
    pub progress: mpsc::Sender<String>,
    /// Cooperative cancellation: a well-behaved task body should poll this
    /// and return early if it is cancelled (SPEC_FULL §5's abort model).
    /// The runner body itself is out of scope; this is the contract it is
    /// invoked under.
    pub cancellation: CancellationToken,
}

/// The user-registered "runner body" — out of scope per §1, but the core
/// still defines the seam it is invoked through (SPEC_FULL §9's "Dynamic
/// dispatch" design note: a `map<string, TaskImpl>` registry consulted
/// inside each runner at dispatch time).
#[async_trait]
pub trait TaskImpl: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, ctx: TaskContext) -> Result<Buffer, String>;
}
