// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph validation outcomes.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

/// Validation of a workflow descriptor completed successfully.
pub struct ValidationSucceeded {
    pub task_count: usize,
}

impl Display for ValidationSucceeded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "validated workflow descriptor: {} tasks, no duplicate ids, no missing deps, no cycles", self.task_count)
    }
}

impl StructuredLog for ValidationSucceeded {
    fn log(&self) {
        tracing::info!(task_count = self.task_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("validation", span_name = name, task_count = self.task_count)
    }
}

/// Validation rejected the descriptor.
pub struct ValidationFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow descriptor failed validation: {}", self.error)
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("validation_failed", span_name = name, error = %self.error)
    }
}
