// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in `TaskImpl`s and the registry that wires them up (SPEC_FULL
//! §9's "Dynamic dispatch" design note), grounded on
//! `config::registry::build_registry` / `backends::local::factory`.

mod echo;

use std::collections::HashMap;
use std::sync::Arc;

pub use echo::{ConcatTask, EchoTask, UppercaseTask};

use crate::runner::{TaskImpl, TaskImplRegistry};

/// Build the registry of built-in task implementations. Callers needing
/// custom `TaskImpl`s assemble their own `TaskImplRegistry` directly;
/// this is a convenience default covering the demo CLI and tests.
pub fn builtin_registry() -> TaskImplRegistry {
    let mut map: HashMap<String, Arc<dyn TaskImpl>> = HashMap::new();
    map.insert("echo".to_string(), Arc::new(EchoTask));
    map.insert("concat".to_string(), Arc::new(ConcatTask));
    map.insert("uppercase".to_string(), Arc::new(UppercaseTask));
    Arc::new(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_the_demo_task_types() {
        let registry = builtin_registry();
        assert!(registry.contains_key("echo"));
        assert!(registry.contains_key("concat"));
        assert!(registry.contains_key("uppercase"));
    }
}
