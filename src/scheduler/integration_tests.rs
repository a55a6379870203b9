// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end scenarios driving validation, scheduling and pooling
//! together, colocated as a dedicated integration suite alongside each
//! module's own unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::{SchedulerError, ValidationError};
use crate::model::{Buffer, BufferTypeTag, DepRef, DepValue, TaskDescriptor, WorkflowDescriptor};
use crate::runner::{RunnerPool, TaskContext, TaskImpl, TaskImplRegistry};
use crate::validation::GraphValidator;

use super::event::Event;
use super::run::{RunOptions, Scheduler};

struct Echo;

#[async_trait]
impl TaskImpl for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(&self, ctx: TaskContext) -> Result<Buffer, String> {
        Ok(Buffer::new(ctx.output_type, ctx.task_id.into_bytes()))
    }
}

/// Concatenates the bytes of every resolved input, in the order its keys
/// sort lexicographically — deterministic without depending on map order.
struct Concat;

#[async_trait]
impl TaskImpl for Concat {
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

/// Blocks until cancelled, for exercising the abort path.
struct Sleeper;

#[async_trait]
impl TaskImpl for Sleeper {
    fn name(&self) -> &str {
        "sleeper"
    }

    async fn execute(&self, ctx: TaskContext) -> Result<Buffer, String> {
        ctx.cancellation.cancelled().await;
        Err("cancelled while sleeping".to_string())
    }
}

fn registry() -> TaskImplRegistry {
    let mut map: HashMap<String, Arc<dyn TaskImpl>> = HashMap::new();
    map.insert("echo".to_string(), Arc::new(Echo));
    map.insert("concat".to_string(), Arc::new(Concat));
    map.insert("sleeper".to_string(), Arc::new(Sleeper));
    Arc::new(map)
}

fn descriptor(id: &str, task_type: &str, deps: &[(&str, DepRef)]) -> TaskDescriptor {
    let dependencies: indexmap::IndexMap<String, DepRef> =
        deps.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    TaskDescriptor {
        id: id.to_string(),
        task_type: task_type.to_string(),
        output_type: BufferTypeTag::Uint8,
        dependencies: if dependencies.is_empty() { None } else { Some(dependencies) },
        config: None,
    }
}

async fn pool(min: usize, max: usize) -> Arc<RunnerPool> {
    RunnerPool::new(min, max, registry(), Duration::from_millis(500)).await.unwrap()
}

async fn drain(mut rx: tokio::sync::mpsc::Receiver<Result<Event, SchedulerError>>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(item) = rx.recv().await {
        events.push(item.unwrap());
    }
    events
}

#[tokio::test]
async fn linear_chain_runs_in_dependency_order() {
    let wf = WorkflowDescriptor {
        tasks: vec![
            descriptor("A", "echo", &[]),
            descriptor("B", "concat", &[("in", DepRef::Single("A".into()))]),
            descriptor("C", "concat", &[("in", DepRef::Single("B".into()))]),
        ],
        config: None,
    };
    GraphValidator::validate(&wf).unwrap();

    let scheduler = Scheduler::new(pool(2, 2).await, RunOptions::default());
    let events = drain(scheduler.run(wf, CancellationToken::new())).await;

    let intermediates: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::Intermediate { task_id, .. } => Some(task_id.as_str()),
            Event::Final { .. } => None,
        })
        .collect();
    assert_eq!(intermediates, vec!["A", "B", "C"]);

    match events.last().unwrap() {
        Event::Final { results } => assert_eq!(results.len(), 3),
        _ => panic!("expected a Final event last"),
    }
}

#[tokio::test]
async fn diamond_joins_both_branches_before_the_sink() {
    let wf = WorkflowDescriptor {
        tasks: vec![
            descriptor("A", "echo", &[]),
            descriptor("B", "concat", &[("in", DepRef::Single("A".into()))]),
            descriptor("C", "concat", &[("in", DepRef::Single("A".into()))]),
            descriptor(
                "D",
                "concat",
                &[("in", DepRef::Group(vec!["B".into(), "C".into()]))],
            ),
        ],
        config: None,
    };
    GraphValidator::validate(&wf).unwrap();

    let scheduler = Scheduler::new(pool(4, 4).await, RunOptions::default());
    let events = drain(scheduler.run(wf, CancellationToken::new())).await;

    let order: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::Intermediate { task_id, .. } => Some(task_id.as_str()),
            Event::Final { .. } => None,
        })
        .collect();
    assert_eq!(order.len(), 4);
    assert_eq!(order[0], "A");
    assert_eq!(order[3], "D");
    assert!(order.contains(&"B"));
    assert!(order.contains(&"C"));
}

#[test]
fn two_node_cycle_is_rejected_with_exact_path() {
    let wf = WorkflowDescriptor {
        tasks: vec![
            descriptor("A", "echo", &[("in", DepRef::Single("B".into()))]),
            descriptor("B", "echo", &[("in", DepRef::Single("A".into()))]),
        ],
        config: None,
    };
    match GraphValidator::validate(&wf) {
        Err(ValidationError::CyclicDependency { task_id, path }) => {
            assert_eq!(task_id, "A");
            assert_eq!(path, vec!["A".to_string(), "B".to_string(), "A".to_string()]);
        }
        other => panic!("expected CyclicDependency, got {:?}", other),
    }
}

#[test]
fn missing_dependency_is_rejected() {
    let wf = WorkflowDescriptor {
        tasks: vec![descriptor("B", "echo", &[("in", DepRef::Single("A".into()))])],
        config: None,
    };
    assert!(matches!(
        GraphValidator::validate(&wf),
        Err(ValidationError::DependencyNotFound { .. })
    ));
}

#[test]
fn duplicate_task_id_is_rejected() {
    let wf = WorkflowDescriptor {
        tasks: vec![descriptor("A", "echo", &[]), descriptor("A", "echo", &[])],
        config: None,
    };
    assert!(matches!(
        GraphValidator::validate(&wf),
        Err(ValidationError::DuplicateTask { .. })
    ));
}

#[tokio::test]
async fn cancelling_mid_flight_aborts_the_run() {
    let wf = WorkflowDescriptor {
        tasks: vec![
            descriptor("A", "sleeper", &[]),
            descriptor("B", "concat", &[("in", DepRef::Single("A".into()))]),
        ],
        config: None,
    };
    GraphValidator::validate(&wf).unwrap();

    let token = CancellationToken::new();
    let scheduler = Scheduler::new(pool(1, 1).await, RunOptions { abort_grace: Duration::from_millis(200) });
    let mut rx = scheduler.run(wf, token.clone());

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let mut saw_error = false;
    while let Some(item) = rx.recv().await {
        if item.is_err() {
            saw_error = true;
        }
    }
    assert!(saw_error, "expected the aborted run to terminate with an error event");
}

#[tokio::test]
async fn pool_saturation_serves_more_tasks_than_the_pool_max() {
    let wf = WorkflowDescriptor {
        tasks: (0..5)
            .map(|i| descriptor(&format!("T{i}"), "echo", &[]))
            .collect(),
        config: None,
    };
    GraphValidator::validate(&wf).unwrap();

    let scheduler = Scheduler::new(pool(1, 2).await, RunOptions::default());
    let events = drain(scheduler.run(wf, CancellationToken::new())).await;

    let completed = events
        .iter()
        .filter(|e| matches!(e, Event::Intermediate { .. }))
        .count();
    assert_eq!(completed, 5);
    assert!(matches!(events.last().unwrap(), Event::Final { results } if results.len() == 5));
}
