// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors raised while validating a workflow descriptor, before any task
/// executes. Listed here in the exact detection order the validator uses
/// (SPEC_FULL §4.2): duplicate ids, then missing dependencies, then cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two descriptors share an id.
    DuplicateTask {
        task_id: String,
    },
    /// A `DepRef` names a task id that is not present in the descriptor.
    DependencyNotFound {
        task_id: String,
        missing_dependency: String,
    },
    /// A cycle was found reachable from `task_id`.
    CyclicDependency {
        task_id: String,
        path: Vec<String>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateTask { task_id } => {
                write!(f, "duplicate task id '{}'", task_id)
            }
            ValidationError::DependencyNotFound { task_id, missing_dependency } => {
                write!(
                    f,
                    "task '{}' depends on '{}' which does not exist",
                    task_id, missing_dependency
                )
            }
            ValidationError::CyclicDependency { task_id, path } => {
                write!(
                    f,
                    "cyclic dependency detected starting at '{}': {}",
                    task_id,
                    path.join(" -> ")
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
