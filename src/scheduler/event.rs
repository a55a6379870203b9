// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::model::{Buffer, TaskId};

/// A streamed event (SPEC_FULL §4.3 Contract). Exactly one `Intermediate`
/// is emitted per task — one task's own completion, not a runner's
/// `task:progress` sub-messages, which have no counterpart in this enum
/// and are only surfaced via structured logging (see DESIGN.md). Exactly
/// one `Final` terminates the stream on success.
#[derive(Debug, Clone)]
pub enum Event {
    Intermediate { task_id: TaskId, output: Buffer },
    Final { results: HashMap<TaskId, Buffer> },
}
