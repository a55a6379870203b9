// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The workflow data model: wire-shaped descriptors and their internal,
//! per-run runtime counterparts.

mod buffer;
mod descriptor;
mod task;

pub use buffer::{Buffer, BufferTypeTag};
pub use descriptor::{DepRef, TaskDescriptor, WorkflowDescriptor};
pub use task::{DepValue, Task, TaskId};
