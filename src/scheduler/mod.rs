// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dependency-driven scheduler (SPEC_FULL §4.3).

mod event;
mod run;
mod state;

#[cfg(test)]
mod integration_tests;

pub use event::Event;
pub use run::{RunOptions, Scheduler};
pub use state::{Status, WorkflowState};
