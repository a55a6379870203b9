// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by [`crate::runner::RunnerPool`] (SPEC_FULL §4.4).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    /// A newly spawned runner's first message was not `ready{}`, or the
    /// ready handshake timed out.
    #[error("runner construction failed: {reason}")]
    ConstructionFailed { reason: String },

    /// `acquire` was called, or is suspended, on a pool that has since been
    /// terminated.
    #[error("runner pool was terminated")]
    Terminated,

    /// `release` was called with a runner handle not currently issued by
    /// this pool — a structural bug (double release, or a foreign handle).
    #[error("released runner {runner_id} was not owned by this pool")]
    NotOwned { runner_id: u64 },

    /// `min`/`max` mutation was attempted with `min > max` or `min == 0`.
    #[error("invalid pool bounds: min={min}, max={max} (require 0 < min <= max)")]
    InvalidBounds { min: usize, max: usize },
}
