// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging and tracing, organized
//! by subsystem to keep each module's messages single-responsibility.

pub mod pool;
pub mod runner;
pub mod scheduler;
pub mod validator;

use tracing::Span;

/// A message type that supports structured logging and span creation.
///
/// * `Display` (from the message struct itself) gives a human-readable line.
/// * [`StructuredLog::log`] emits that line plus machine-readable fields.
/// * [`StructuredLog::span`] wraps a block of work in a tracing span
///   carrying the same fields as attributes.
pub trait StructuredLog {
    fn log(&self);
    fn span(&self, name: &str) -> Span;
}
