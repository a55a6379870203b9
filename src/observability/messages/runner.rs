// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for individual runner lifecycle and protocol events.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

pub struct RunnerReady {
    pub runner_id: u64,
}

impl Display for RunnerReady {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "runner {} signalled ready", self.runner_id)
    }
}

impl StructuredLog for RunnerReady {
    fn log(&self) {
        tracing::debug!(runner_id = self.runner_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("runner_ready", span_name = name, runner_id = self.runner_id)
    }
}

pub struct RunnerBusyRejected {
    pub runner_id: u64,
    pub in_flight_request: String,
    pub rejected_request: String,
}

impl Display for RunnerBusyRejected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "runner {} rejected request {} while serving {}",
            self.runner_id, self.rejected_request, self.in_flight_request
        )
    }
}

impl StructuredLog for RunnerBusyRejected {
    fn log(&self) {
        tracing::warn!(
            runner_id = self.runner_id,
            in_flight_request = self.in_flight_request,
            rejected_request = self.rejected_request,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("runner_busy_rejected", span_name = name, runner_id = self.runner_id)
    }
}

pub struct RunnerAborted {
    pub runner_id: u64,
    pub request_id: String,
    pub reason: String,
}

impl Display for RunnerAborted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "runner {} abort requested for {}: {}",
            self.runner_id, self.request_id, self.reason
        )
    }
}

impl StructuredLog for RunnerAborted {
    fn log(&self) {
        tracing::warn!(
            runner_id = self.runner_id,
            request_id = self.request_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("runner_aborted", span_name = name, runner_id = self.runner_id)
    }
}

pub struct RunnerAbortGraceExpired {
    pub runner_id: u64,
}

impl Display for RunnerAbortGraceExpired {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "runner {} did not acknowledge abort within the grace period; terminating",
            self.runner_id
        )
    }
}

impl StructuredLog for RunnerAbortGraceExpired {
    fn log(&self) {
        tracing::error!(runner_id = self.runner_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("runner_abort_grace_expired", span_name = name, runner_id = self.runner_id)
    }
}
