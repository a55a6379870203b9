// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The runner protocol and pool (SPEC_FULL §4.4, §4.5).

mod pool;
mod protocol;
mod worker;

use std::collections::HashMap;
use std::sync::Arc;

pub use pool::RunnerPool;
pub use protocol::{RunnerRequest, RunnerResponse, TaskContext, TaskImpl};
pub use worker::RunnerHandle;

/// Dynamic dispatch registry consulted by each runner at dispatch time
/// (SPEC_FULL §9's "Dynamic dispatch" design note); the scheduler never
/// dispatches on `type` itself.
pub type TaskImplRegistry = Arc<HashMap<String, Arc<dyn TaskImpl>>>;
