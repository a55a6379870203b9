// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `RunnerPool`: a bounded pool of isolated execution contexts (SPEC_FULL
//! §4.4). Lazily creates runners up to `max`, keeps at least `min` idle,
//! queues acquires FIFO when saturated, and reuses idle runners LIFO (the
//! literal push-front/pop-front of the Policy steps; §4.4's Fairness note
//! explicitly allows this as a documented alternative to FIFO reuse).

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};

use crate::errors::PoolError;
use crate::observability::messages::{pool as pool_messages, StructuredLog};

use super::worker::{spawn_runner, RunnerHandle};
use super::TaskImplRegistry;

struct PoolInner {
    idle: VecDeque<RunnerHandle>,
    pending: VecDeque<oneshot::Sender<Result<RunnerHandle, PoolError>>>,
    issued: HashSet<u64>,
    size: usize,
    min: usize,
    max: usize,
    terminated: bool,
}

pub struct RunnerPool {
    inner: Mutex<PoolInner>,
    registry: TaskImplRegistry,
    ready_timeout: Duration,
    next_id: AtomicU64,
}

impl RunnerPool {
    /// Construct a pool, eagerly creating `min` idle runners. Fails if
    /// `0 < min <= max` does not hold, or if eager construction of any of
    /// the `min` runners fails.
    pub async fn new(
        min: usize,
        max: usize,
        registry: TaskImplRegistry,
        ready_timeout: Duration,
    ) -> Result<Arc<Self>, PoolError> {
        if min == 0 || min > max {
            return Err(PoolError::InvalidBounds { min, max });
        }

        let pool = Arc::new(Self {
            inner: Mutex::new(PoolInner {
                idle: VecDeque::new(),
                pending: VecDeque::new(),
                issued: HashSet::new(),
                size: 0,
                min,
                max,
                terminated: false,
            }),
            registry,
            ready_timeout,
            next_id: AtomicU64::new(1),
        });

        for _ in 0..min {
            let handle = pool.spawn_one().await?;
            let mut inner = pool.inner.lock().await;
            inner.idle.push_back(handle);
            inner.size += 1;
        }

        Ok(pool)
    }

    async fn spawn_one(&self) -> Result<RunnerHandle, PoolError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        spawn_runner(id, self.registry.clone(), self.ready_timeout).await
    }

    /// Acquire a runner, suspending if the pool is saturated (SPEC_FULL
    /// §4.4 Policy: idle FIFO-popped first, else lazily created up to
    /// `max`, else a FIFO pending wait).
    pub async fn acquire(self: &Arc<Self>) -> Result<RunnerHandle, PoolError> {
        enum Action {
            Got(RunnerHandle),
            Spawn,
            Wait(oneshot::Receiver<Result<RunnerHandle, PoolError>>),
        }

        let action = {
            let mut inner = self.inner.lock().await;
            if inner.terminated {
                return Err(PoolError::Terminated);
            }
            if let Some(handle) = inner.idle.pop_front() {
                inner.issued.insert(handle.id);
                Action::Got(handle)
            } else if inner.size < inner.max {
                inner.size += 1; // reserve the slot before releasing the lock
                Action::Spawn
            } else {
                let (tx, rx) = oneshot::channel();
                inner.pending.push_back(tx);
                pool_messages::AcquireBlocked {
                    pool_size: inner.size,
                    max: inner.max,
                    pending: inner.pending.len(),
                }
                .log();
                Action::Wait(rx)
            }
        };

        match action {
            Action::Got(handle) => Ok(handle),
            Action::Spawn => match self.spawn_one().await {
                Ok(handle) => {
                    let mut inner = self.inner.lock().await;
                    inner.issued.insert(handle.id);
                    pool_messages::RunnerSpawned { runner_id: handle.id, pool_size: inner.size }.log();
                    Ok(handle)
                }
                Err(err) => {
                    let mut inner = self.inner.lock().await;
                    inner.size -= 1;
                    Err(err)
                }
            },
            Action::Wait(rx) => rx.await.unwrap_or(Err(PoolError::Terminated)),
        }
    }

    /// Release a previously acquired runner. Double release, or releasing
    /// a handle not issued by this pool, is a structural bug surfaced as
    /// [`PoolError::NotOwned`].
    pub async fn release(&self, handle: RunnerHandle) -> Result<(), PoolError> {
        let mut inner = self.inner.lock().await;
        if !inner.issued.remove(&handle.id) {
            return Err(PoolError::NotOwned { runner_id: handle.id });
        }

        if inner.terminated || inner.size > inner.max {
            inner.size = inner.size.saturating_sub(1);
            drop(handle);
            return Ok(());
        }

        if let Some(waiter) = inner.pending.pop_front() {
            inner.issued.insert(handle.id);
            if let Err(Ok(handle)) = waiter.send(Ok(handle)) {
                // The waiter dropped its receiver (its acquire future was
                // cancelled); undo the hand-off by idling the runner.
                inner.issued.remove(&handle.id);
                inner.idle.push_front(handle);
            }
        } else {
            inner.idle.push_front(handle);
        }
        Ok(())
    }

    /// Discard a runner instead of returning it to the idle set: used when
    /// an abort grace period expires and the runner can no longer be
    /// trusted to be idle (SPEC_FULL §4.4/§5). Unlike [`Self::release`], the
    /// slot is not handed to a pending waiter; a replacement is created
    /// lazily on the next `acquire` if the pool is below `max`.
    pub async fn discard(&self, handle: RunnerHandle) -> Result<(), PoolError> {
        let mut inner = self.inner.lock().await;
        if !inner.issued.remove(&handle.id) {
            return Err(PoolError::NotOwned { runner_id: handle.id });
        }
        inner.size = inner.size.saturating_sub(1);
        drop(handle);
        Ok(())
    }

    /// Drop every runner and fail all pending acquires with
    /// [`PoolError::Terminated`]. Idempotent.
    pub async fn terminate(&self) {
        let mut inner = self.inner.lock().await;
        inner.terminated = true;
        let runners_dropped = inner.idle.len();
        inner.idle.clear();
        let pending_failed = inner.pending.len();
        for waiter in inner.pending.drain(..) {
            let _ = waiter.send(Err(PoolError::Terminated));
        }
        inner.size = 0;
        pool_messages::PoolTerminated { runners_dropped, pending_failed }.log();
    }

    /// Reduce or raise `max`. Lowering below `size` terminates idle runners
    /// until `size <= max`; busy runners are left to finish and are not
    /// re-idled on release once that would exceed the new `max`.
    pub async fn set_max(&self, new_max: usize) -> Result<(), PoolError> {
        let mut inner = self.inner.lock().await;
        if new_max == 0 || new_max < inner.min {
            return Err(PoolError::InvalidBounds { min: inner.min, max: new_max });
        }
        inner.max = new_max;
        while inner.size > inner.max {
            match inner.idle.pop_back() {
                Some(handle) => {
                    drop(handle);
                    inner.size -= 1;
                }
                None => break, // remaining excess is busy; it exits on release
            }
        }
        pool_messages::PoolBoundsChanged { min: inner.min, max: inner.max, pool_size: inner.size }.log();
        Ok(())
    }

    /// Raise or lower `min`. Raising above `size` eagerly creates the
    /// deficit as new idle runners.
    pub async fn set_min(self: &Arc<Self>, new_min: usize) -> Result<(), PoolError> {
        let deficit = {
            let mut inner = self.inner.lock().await;
            if new_min == 0 || new_min > inner.max {
                return Err(PoolError::InvalidBounds { min: new_min, max: inner.max });
            }
            inner.min = new_min;
            let deficit = new_min.saturating_sub(inner.size);
            inner.size += deficit;
            deficit
        };

        for _ in 0..deficit {
            match self.spawn_one().await {
                Ok(handle) => {
                    let mut inner = self.inner.lock().await;
                    inner.idle.push_back(handle);
                }
                Err(_) => {
                    let mut inner = self.inner.lock().await;
                    inner.size = inner.size.saturating_sub(1);
                }
            }
        }

        let inner = self.inner.lock().await;
        pool_messages::PoolBoundsChanged { min: inner.min, max: inner.max, pool_size: inner.size }.log();
        Ok(())
    }

    pub async fn size(&self) -> usize {
        self.inner.lock().await.size
    }

    pub async fn idle_count(&self) -> usize {
        self.inner.lock().await.idle.len()
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.lock().await.pending.len()
    }
}
