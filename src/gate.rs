// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One-shot, multi-awaiter readiness gate (SPEC_FULL §2's "Deferred/OneShot"
//! component, §9's "one-shot gates replace 'deferred'").
//!
//! A gate starts `Pending` and transitions to `Resolved` or `Failed` exactly
//! once; any number of fibres may be awaiting it at that moment, and any
//! number may call `wait()` afterwards and observe the already-settled
//! state immediately. Built on `tokio::sync::watch`, whose receivers each
//! track their own "have I seen this value" cursor independently — the
//! natural primitive for "settle once, many independent awaiters".

use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq, Eq)]
enum GateState {
    Pending,
    Resolved,
    Failed(String),
}

/// The sender half: owned by whoever is responsible for firing the gate
/// (the scheduler, on `on_task_finish` or abort).
#[derive(Clone)]
pub struct GateSender {
    tx: watch::Sender<GateState>,
}

/// The receiver half: cloned out to every fibre that needs to await this
/// gate.
#[derive(Clone)]
pub struct GateReceiver {
    rx: watch::Receiver<GateState>,
}

/// Outcome of awaiting a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Ready,
    Failed(String),
}

pub fn readiness_gate() -> (GateSender, GateReceiver) {
    let (tx, rx) = watch::channel(GateState::Pending);
    (GateSender { tx }, GateReceiver { rx })
}

impl GateSender {
    /// Fire the gate as ready. A no-op if already settled — firing "at most
    /// once" is an invariant the caller (the scheduler) upholds by
    /// construction, not something this type re-derives from state.
    pub fn fire_ready(&self) {
        let _ = self.tx.send(GateState::Resolved);
    }

    pub fn fire_failed(&self, reason: impl Into<String>) {
        let _ = self.tx.send(GateState::Failed(reason.into()));
    }
}

impl GateReceiver {
    /// Suspend until the gate settles, returning its outcome immediately if
    /// it already has.
    pub async fn wait(&mut self) -> GateOutcome {
        loop {
            match &*self.rx.borrow() {
                GateState::Resolved => return GateOutcome::Ready,
                GateState::Failed(reason) => return GateOutcome::Failed(reason.clone()),
                GateState::Pending => {}
            }
            if self.rx.changed().await.is_err() {
                // Sender dropped without settling: treat as a failed gate.
                return GateOutcome::Failed("readiness gate sender dropped".to_string());
            }
        }
    }
}
