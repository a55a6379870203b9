// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use indexmap::IndexMap;

use super::buffer::{Buffer, BufferTypeTag};
use super::descriptor::{DepRef, TaskDescriptor};

pub type TaskId = String;

/// A dependency value once resolved to concrete output buffers: the
/// runtime counterpart of [`DepRef`].
#[derive(Clone, Debug)]
pub enum DepValue {
    Single(Buffer),
    Group(Vec<Buffer>),
}

/// The internal, per-run representation of a task: a [`TaskDescriptor`] plus
/// the bookkeeping the scheduler fills in once its dependencies resolve.
#[derive(Clone, Debug)]
pub struct Task {
    pub id: TaskId,
    pub task_type: String,
    pub output_type: BufferTypeTag,
    pub config: Option<serde_json::Value>,
    pub dependencies: IndexMap<String, DepRef>,
    pub resolved_dependencies: HashMap<String, DepValue>,
}

impl Task {
    pub fn from_descriptor(descriptor: &TaskDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            task_type: descriptor.task_type.clone(),
            output_type: descriptor.output_type,
            config: descriptor.config.clone(),
            dependencies: descriptor.dependencies.clone().unwrap_or_default(),
            resolved_dependencies: HashMap::new(),
        }
    }

    /// Every dependency target this task names, counted with multiplicity:
    /// a scalar key contributes one target, a group of length n contributes
    /// n targets (possibly repeating the same source) — see SPEC_FULL §4.3
    /// step 3 and §9's resolved Open Question on multiplicity.
    pub fn dependency_targets_with_multiplicity(&self) -> Vec<&str> {
        let mut targets = Vec::new();
        for dep in self.dependencies.values() {
            targets.extend(dep.targets());
        }
        targets
    }
}
