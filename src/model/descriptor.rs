// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::buffer::BufferTypeTag;

/// A single dependency value: either a scalar reference to one task, or an
/// ordered group of references. `serde(untagged)` lets the wire format use a
/// bare string or an array interchangeably, matching §6 of the descriptor
/// grammar: `(str | [str,...])`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepRef {
    Single(String),
    Group(Vec<String>),
}

impl DepRef {
    /// All task ids this dependency value names, in position order.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            DepRef::Single(id) => vec![id.as_str()],
            DepRef::Group(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// A user-provided, immutable description of one task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub output_type: BufferTypeTag,
    #[serde(default)]
    pub dependencies: Option<IndexMap<String, DepRef>>,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

impl Default for BufferTypeTag {
    fn default() -> Self {
        BufferTypeTag::Uint8
    }
}

/// The top-level workflow descriptor, as received on the wire (§6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowDescriptor {
    pub tasks: Vec<TaskDescriptor>,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}
