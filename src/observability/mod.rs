// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with a `Display` impl plus
//! the [`messages::StructuredLog`] trait, so call sites never scatter
//! magic strings:
//!
//! * `messages::validator` — graph validation outcomes
//! * `messages::scheduler` — workflow run lifecycle
//! * `messages::pool` — runner pool sizing and acquisition
//! * `messages::runner` — individual runner lifecycle and protocol events

pub mod messages;
