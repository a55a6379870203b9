// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the logical runner protocol itself (SPEC_FULL §4.5),
/// as distinct from a task's own execution failure (`error{}` carrying the
/// task's message, which becomes a [`crate::errors::SchedulerError::TaskExecutionError`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunnerProtocolError {
    /// A message with `request_id != R` arrived while the runner was
    /// serving `R`.
    #[error("Worker is busy")]
    WorkerBusy,

    /// A runner's request/response channel closed unexpectedly — the
    /// runner's task loop panicked or was dropped without sending a
    /// terminal message.
    #[error("runner channel closed unexpectedly")]
    ChannelClosed,

    /// An aborted runner did not acknowledge within the grace period and
    /// was forcibly terminated.
    #[error("runner did not acknowledge abort within the grace period")]
    AbortGraceExpired,
}
