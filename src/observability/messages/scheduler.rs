// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow run lifecycle events.

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use super::StructuredLog;

pub struct RunStarted {
    pub task_count: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "starting workflow run: {} tasks", self.task_count)
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(task_count = self.task_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("workflow_run", span_name = name, task_count = self.task_count)
    }
}

pub struct TaskStarted<'a> {
    pub task_id: &'a str,
}

impl Display for TaskStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "task '{}' became ready and was dispatched", self.task_id)
    }
}

impl StructuredLog for TaskStarted<'_> {
    fn log(&self) {
        tracing::debug!(task_id = self.task_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("task", span_name = name, task_id = self.task_id)
    }
}

pub struct TaskCompleted<'a> {
    pub task_id: &'a str,
    pub duration: Duration,
    pub output_len: usize,
}

impl Display for TaskCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "task '{}' completed in {:?}: {} bytes",
            self.task_id, self.duration, self.output_len
        )
    }
}

impl StructuredLog for TaskCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            task_id = self.task_id,
            duration_ms = self.duration.as_millis() as u64,
            output_len = self.output_len,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task_completed",
            span_name = name,
            task_id = self.task_id,
            duration = ?self.duration,
        )
    }
}

pub struct RunCompleted {
    pub task_count: usize,
    pub duration: Duration,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "workflow run completed: {} tasks in {:?}",
            self.task_count, self.duration
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::info!(
            task_count = self.task_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow_run_completed",
            span_name = name,
            task_count = self.task_count,
            duration = ?self.duration,
        )
    }
}

pub struct RunAborted<'a> {
    pub reason: &'a str,
}

impl Display for RunAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow run aborted: {}", self.reason)
    }
}

impl StructuredLog for RunAborted<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("workflow_run_aborted", span_name = name, reason = self.reason)
    }
}

pub struct RunFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for RunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow run failed: {}", self.error)
    }
}

impl StructuredLog for RunFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("workflow_run_failed", span_name = name, error = %self.error)
    }
}
