// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::errors::PoolError;

/// Errors surfaced by the scheduler while driving a single workflow run
/// (SPEC_FULL §6, §7).
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// The graph is non-empty but no task has `pending_count == 0` —
    /// validation should have caught this as a cycle; reaching here is a
    /// construction-time sanity check, not a user-facing validation path.
    NoInitialTasks,
    /// A runner reported a terminal `error{}` for a task.
    TaskExecutionError {
        task_id: String,
        inner: String,
    },
    /// The run was aborted, either by the caller's cancellation signal or
    /// because another task failed.
    AbortError {
        reason: String,
    },
    /// The pool backing this run refused further acquires because it was
    /// terminated mid-run.
    PoolTerminated,
    /// An invariant the scheduler relies on did not hold: decrementing a
    /// counter already at zero, a task missing from `reverse_index`, or any
    /// other condition §7 calls a "structural bug". Fatal; never expected
    /// in a correctly constructed `WorkflowState`.
    StructuralBug {
        message: String,
    },
    /// The terminal error sent to the outbox when a run aborts: every
    /// cause that contributed (runner failures racing the caller's
    /// cancellation), per §7's "terminal aggregate error whose inner list
    /// contains the original cause(s)".
    Aggregate {
        causes: Vec<String>,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::NoInitialTasks => {
                write!(f, "no task in the workflow has zero unresolved dependencies")
            }
            SchedulerError::TaskExecutionError { task_id, inner } => {
                write!(f, "task '{}' failed: {}", task_id, inner)
            }
            SchedulerError::AbortError { reason } => {
                write!(f, "workflow aborted: {}", reason)
            }
            SchedulerError::PoolTerminated => {
                write!(f, "runner pool was terminated")
            }
            SchedulerError::StructuralBug { message } => {
                write!(f, "structural bug: {}", message)
            }
            SchedulerError::Aggregate { causes } => {
                write!(f, "workflow run failed: {}", causes.join("; "))
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<PoolError> for SchedulerError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Terminated => SchedulerError::PoolTerminated,
            other => SchedulerError::StructuralBug { message: other.to_string() },
        }
    }
}
