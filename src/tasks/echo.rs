// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Demo `TaskImpl`s, grounded on `backends::stub::StubProcessor` and
//! `backends::local::processors::*`: small, synchronous, dependency-free
//! transforms good enough to exercise the scheduler end to end without
//! needing a real host-facing backend (out of scope per SPEC_FULL §1).

use async_trait::async_trait;

use crate::model::{Buffer, DepValue};
use crate::runner::{TaskContext, TaskImpl};

/// Returns its configured `text` (or the task id, if unset) as bytes.
/// Typically used at entry points that have no dependencies to resolve.
pub struct EchoTask;

#[async_trait]
impl TaskImpl for EchoTask {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(&self, ctx: TaskContext) -> Result<Buffer, String> {
        let text = ctx
            .config
            .as_ref()
            .and_then(|c| c.get("text"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(ctx.task_id);
        Ok(Buffer::new(ctx.output_type, text.into_bytes()))
    }
}

/// Concatenates every resolved input's bytes, in the lexicographic order
/// of their dependency keys — deterministic regardless of map iteration.
pub struct ConcatTask;

#[async_trait]
impl TaskImpl for ConcatTask {
    fn name(&self) -> &str {
        "concat"
    }

    async fn execute(&self, ctx: TaskContext) -> Result<Buffer, String> {
        let mut keys: Vec<&String> = ctx.inputs.keys().collect();
        keys.sort();
        let mut bytes = Vec::new();
        for key in keys {
            match &ctx.inputs[key] {
                DepValue::Single(buf) => bytes.extend_from_slice(buf.as_bytes()),
                DepValue::Group(bufs) => {
                    for buf in bufs {
                        bytes.extend_from_slice(buf.as_bytes());
                    }
                }
            }
        }
        Ok(Buffer::new(ctx.output_type, bytes))
    }
}

/// Upper-cases its single `in` dependency's bytes, assuming they are
/// valid UTF-8.
pub struct UppercaseTask;

#[async_trait]
impl TaskImpl for UppercaseTask {
    fn name(&self) -> &str {
        "uppercase"
    }

    async fn execute(&self, ctx: TaskContext) -> Result<Buffer, String> {
        let input = ctx
            .inputs
            .get("in")
            .ok_or_else(|| "uppercase requires an 'in' dependency".to_string())?;
        let bytes = match input {
            DepValue::Single(buf) => buf.as_bytes().to_vec(),
            DepValue::Group(bufs) => bufs.iter().flat_map(|b| b.as_bytes().to_vec()).collect(),
        };
        let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
        Ok(Buffer::new(ctx.output_type, text.to_uppercase().into_bytes()))
    }
}
