// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Loading a [`WorkflowDescriptor`] and the engine's own tunables from disk:
//! read the file, deserialize by extension, validate, return. YAML and JSON
//! are both accepted since `serde_yaml`/`serde_json` are already on the
//! dependency tree; anything else is rejected rather than guessed at.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::ValidationError;
use crate::model::WorkflowDescriptor;
use crate::validation::GraphValidator;

/// Tunables for the engine as a whole (SPEC_FULL §4.6's `EngineOptions`):
/// pool bounds, plus the two bounded waits the runner protocol relies on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub pool_min: usize,
    pub pool_max: usize,
    #[serde(with = "duration_millis")]
    pub ready_timeout: Duration,
    #[serde(with = "duration_millis")]
    pub abort_grace: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            pool_min: 1,
            pool_max: 4,
            ready_timeout: Duration::from_secs(2),
            abort_grace: Duration::from_secs(5),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Errors raised while loading a workflow descriptor from disk: anything
/// not caught by [`crate::validation::GraphValidator`] happens here, since
/// file I/O and deserialization are this module's own concern.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    UnsupportedExtension(String),
    Deserialize(String),
    Validation(ValidationError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "failed to read workflow descriptor: {}", err),
            LoadError::UnsupportedExtension(ext) => {
                write!(f, "unsupported workflow descriptor extension '{}' (expected .yaml, .yml or .json)", ext)
            }
            LoadError::Deserialize(msg) => write!(f, "failed to parse workflow descriptor: {}", msg),
            LoadError::Validation(err) => write!(f, "workflow descriptor failed validation: {}", err),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ValidationError> for LoadError {
    fn from(err: ValidationError) -> Self {
        LoadError::Validation(err)
    }
}

/// Load, deserialize and validate a workflow descriptor from `path`.
/// Dispatches on file extension: `.yaml`/`.yml` via `serde_yaml`, `.json`
/// via `serde_json`.
pub fn load_and_validate_descriptor(path: impl AsRef<Path>) -> Result<WorkflowDescriptor, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(LoadError::Io)?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
    let descriptor: WorkflowDescriptor = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| LoadError::Deserialize(e.to_string()))?,
        "json" => serde_json::from_str(&contents).map_err(|e| LoadError::Deserialize(e.to_string()))?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    GraphValidator::validate(&descriptor)?;
    Ok(descriptor)
}
