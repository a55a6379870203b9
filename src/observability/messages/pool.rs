// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for runner pool sizing and acquisition events.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

pub struct RunnerSpawned {
    pub runner_id: u64,
    pub pool_size: usize,
}

impl Display for RunnerSpawned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "spawned runner {} (pool size now {})", self.runner_id, self.pool_size)
    }
}

impl StructuredLog for RunnerSpawned {
    fn log(&self) {
        tracing::debug!(runner_id = self.runner_id, pool_size = self.pool_size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("runner_spawned", span_name = name, runner_id = self.runner_id)
    }
}

pub struct AcquireBlocked {
    pub pool_size: usize,
    pub max: usize,
    pub pending: usize,
}

impl Display for AcquireBlocked {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "pool saturated ({}/{}), queueing acquire ({} already waiting)",
            self.pool_size, self.max, self.pending
        )
    }
}

impl StructuredLog for AcquireBlocked {
    fn log(&self) {
        tracing::debug!(pool_size = self.pool_size, max = self.max, pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("acquire_blocked", span_name = name, pool_size = self.pool_size, max = self.max)
    }
}

pub struct PoolBoundsChanged {
    pub min: usize,
    pub max: usize,
    pub pool_size: usize,
}

impl Display for PoolBoundsChanged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "pool bounds changed: min={}, max={}, size={}",
            self.min, self.max, self.pool_size
        )
    }
}

impl StructuredLog for PoolBoundsChanged {
    fn log(&self) {
        tracing::info!(min = self.min, max = self.max, pool_size = self.pool_size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("pool_bounds_changed", span_name = name, min = self.min, max = self.max)
    }
}

pub struct PoolTerminated {
    pub runners_dropped: usize,
    pub pending_failed: usize,
}

impl Display for PoolTerminated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "pool terminated: {} runners dropped, {} pending acquires failed",
            self.runners_dropped, self.pending_failed
        )
    }
}

impl StructuredLog for PoolTerminated {
    fn log(&self) {
        tracing::warn!(
            runners_dropped = self.runners_dropped,
            pending_failed = self.pending_failed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("pool_terminated", span_name = name)
    }
}
