// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-task unresolved-dependency counting (SPEC_FULL §4.1).
//!
//! Not thread-shared: the scheduler owns one `DependencyCounter` per run and
//! serialises all access to it from its own executor, exactly like
//! `WorkflowState::pending_count`.

use std::collections::HashMap;

use crate::errors::SchedulerError;
use crate::model::TaskId;

/// A non-negative integer counter keyed by `TaskId`.
#[derive(Debug, Default)]
pub struct DependencyCounter {
    counts: HashMap<TaskId, u32>,
}

impl DependencyCounter {
    pub fn new() -> Self {
        Self { counts: HashMap::new() }
    }

    /// Initialise a counter at zero for every key, if not already present.
    pub fn init(&mut self, keys: impl IntoIterator<Item = TaskId>) {
        for key in keys {
            self.counts.entry(key).or_insert(0);
        }
    }

    pub fn set(&mut self, id: &str, n: u32) {
        self.counts.insert(id.to_string(), n);
    }

    /// Increment `id`'s count by `n` (default 1 when called via `increment_by_one`).
    pub fn increment(&mut self, id: &str, n: u32) {
        *self.counts.entry(id.to_string()).or_insert(0) += n;
    }

    pub fn increment_by_one(&mut self, id: &str) {
        self.increment(id, 1);
    }

    /// Decrement `id`'s count by one, single-decrement (SPEC_FULL §9's
    /// resolved Open Question — never double-decrement). Fails if `id` is
    /// absent or its count is already zero: both are structural bugs per
    /// §4.1, not user-facing errors.
    pub fn decrement(&mut self, id: &str) -> Result<u32, SchedulerError> {
        match self.counts.get_mut(id) {
            None => Err(SchedulerError::StructuralBug {
                message: format!("decrement of unknown dependency counter '{}'", id),
            }),
            Some(count) => {
                if *count == 0 {
                    return Err(SchedulerError::StructuralBug {
                        message: format!("decrement of dependency counter '{}' below zero", id),
                    });
                }
                *count -= 1;
                Ok(*count)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<u32> {
        self.counts.get(id).copied()
    }

    pub fn is_zero(&self, id: &str) -> bool {
        self.get(id) == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_then_decrement_is_single_step() {
        let mut counter = DependencyCounter::new();
        counter.set("T", 3);
        assert_eq!(counter.decrement("T").unwrap(), 2);
        assert_eq!(counter.decrement("T").unwrap(), 1);
        assert_eq!(counter.get("T"), Some(1));
    }

    #[test]
    fn decrement_below_zero_is_structural_bug() {
        let mut counter = DependencyCounter::new();
        counter.set("T", 0);
        assert!(matches!(
            counter.decrement("T"),
            Err(SchedulerError::StructuralBug { .. })
        ));
    }

    #[test]
    fn decrement_missing_id_is_structural_bug() {
        let mut counter = DependencyCounter::new();
        assert!(matches!(
            counter.decrement("ghost"),
            Err(SchedulerError::StructuralBug { .. })
        ));
    }

    #[test]
    fn is_zero_reflects_current_count() {
        let mut counter = DependencyCounter::new();
        counter.set("T", 1);
        assert!(!counter.is_zero("T"));
        counter.decrement("T").unwrap();
        assert!(counter.is_zero("T"));
    }

    #[test]
    fn init_does_not_clobber_existing_counts() {
        let mut counter = DependencyCounter::new();
        counter.set("T", 5);
        counter.init(vec!["T".to_string(), "U".to_string()]);
        assert_eq!(counter.get("T"), Some(5));
        assert_eq!(counter.get("U"), Some(0));
    }
}
