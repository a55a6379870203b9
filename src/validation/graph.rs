// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::errors::ValidationError;
use crate::model::{TaskDescriptor, WorkflowDescriptor};
use crate::observability::messages::{validator, StructuredLog};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// Validates a workflow descriptor before any task executes
/// (SPEC_FULL §4.2): duplicate ids, missing dependencies, then cycles, in
/// that detection order.
pub struct GraphValidator;

impl GraphValidator {
    /// Validate `descriptor`, returning the duplicate-free, dependency-
    /// complete, acyclic task list in input order on success.
    pub fn validate(descriptor: &WorkflowDescriptor) -> Result<(), ValidationError> {
        let task_map = Self::build_task_map(&descriptor.tasks)?;

        let mut colour: HashMap<&str, Colour> = task_map
            .keys()
            .map(|id| (id.as_str(), Colour::White))
            .collect();

        for descriptor in &descriptor.tasks {
            if colour[descriptor.id.as_str()] == Colour::White {
                let mut stack = Vec::new();
                if let Err(err) = Self::visit(&descriptor.id, &task_map, &mut colour, &mut stack) {
                    validator::ValidationFailed { error: &err }.log();
                    return Err(err);
                }
            }
        }

        validator::ValidationSucceeded { task_count: descriptor.tasks.len() }.log();
        Ok(())
    }

    fn build_task_map<'a>(
        tasks: &'a [TaskDescriptor],
    ) -> Result<HashMap<&'a str, &'a TaskDescriptor>, ValidationError> {
        let mut task_map = HashMap::with_capacity(tasks.len());
        for task in tasks {
            if task_map.insert(task.id.as_str(), task).is_some() {
                let err = ValidationError::DuplicateTask { task_id: task.id.clone() };
                validator::ValidationFailed { error: &err }.log();
                return Err(err);
            }
        }
        Ok(task_map)
    }

    /// Recursive three-colour DFS from `id`. On return, every node reached
    /// from `id` is black. `stack` holds the grey path from the initial
    /// entry point down to the current node, in visitation order.
    fn visit<'a>(
        id: &'a str,
        task_map: &HashMap<&'a str, &'a TaskDescriptor>,
        colour: &mut HashMap<&'a str, Colour>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), ValidationError> {
        colour.insert(id, Colour::Grey);
        stack.push(id);

        let task = task_map[id];
        if let Some(dependencies) = &task.dependencies {
            // Dep keys in insertion order, group elements in position order
            // (SPEC_FULL §4.2 tie-break rule), so error paths are reproducible.
            for dep in dependencies.values() {
                for target in dep.targets() {
                    match task_map.get(target) {
                        None => {
                            let err = ValidationError::DependencyNotFound {
                                task_id: id.to_string(),
                                missing_dependency: target.to_string(),
                            };
                            return Err(err);
                        }
                        Some(_) => match colour[target] {
                            Colour::White => Self::visit(target, task_map, colour, stack)?,
                            Colour::Grey => {
                                let cycle_start = stack.iter().position(|&n| n == target).unwrap();
                                let mut path: Vec<String> =
                                    stack[cycle_start..].iter().map(|s| s.to_string()).collect();
                                path.push(target.to_string());
                                return Err(ValidationError::CyclicDependency {
                                    task_id: stack[cycle_start].to_string(),
                                    path,
                                });
                            }
                            Colour::Black => {}
                        },
                    }
                }
            }
        }

        stack.pop();
        colour.insert(id, Colour::Black);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BufferTypeTag, DepRef};
    use indexmap::IndexMap as Map;

    fn descriptor(id: &str, deps: &[(&str, DepRef)]) -> TaskDescriptor {
        let dependencies: Map<String, DepRef> =
            deps.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        TaskDescriptor {
            id: id.to_string(),
            task_type: "echo".to_string(),
            output_type: BufferTypeTag::Uint8,
            dependencies: if dependencies.is_empty() { None } else { Some(dependencies) },
            config: None,
        }
    }

    #[test]
    fn accepts_a_linear_chain() {
        let wf = WorkflowDescriptor {
            tasks: vec![
                descriptor("A", &[]),
                descriptor("B", &[("in", DepRef::Single("A".into()))]),
                descriptor("C", &[("in", DepRef::Single("B".into()))]),
            ],
            config: None,
        };
        assert!(GraphValidator::validate(&wf).is_ok());
    }

    #[test]
    fn accepts_a_diamond() {
        let wf = WorkflowDescriptor {
            tasks: vec![
                descriptor("A", &[]),
                descriptor("B", &[("in", DepRef::Single("A".into()))]),
                descriptor("C", &[("in", DepRef::Single("A".into()))]),
                descriptor(
                    "D",
                    &[("in", DepRef::Group(vec!["B".into(), "C".into()]))],
                ),
            ],
            config: None,
        };
        assert!(GraphValidator::validate(&wf).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let wf = WorkflowDescriptor {
            tasks: vec![descriptor("A", &[]), descriptor("A", &[])],
            config: None,
        };
        assert_eq!(
            GraphValidator::validate(&wf),
            Err(ValidationError::DuplicateTask { task_id: "A".to_string() })
        );
    }

    #[test]
    fn rejects_missing_dependency() {
        let wf = WorkflowDescriptor {
            tasks: vec![descriptor("A", &[("in", DepRef::Single("Z".into()))])],
            config: None,
        };
        assert_eq!(
            GraphValidator::validate(&wf),
            Err(ValidationError::DependencyNotFound {
                task_id: "A".to_string(),
                missing_dependency: "Z".to_string(),
            })
        );
    }

    #[test]
    fn rejects_a_two_node_cycle() {
        let wf = WorkflowDescriptor {
            tasks: vec![
                descriptor("A", &[("in", DepRef::Single("B".into()))]),
                descriptor("B", &[("in", DepRef::Single("A".into()))]),
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
    fn group_deps_visit_each_element_once_even_with_repeats() {
        let wf = WorkflowDescriptor {
            tasks: vec![
                descriptor("A", &[]),
                descriptor(
                    "B",
                    &[("in", DepRef::Group(vec!["A".into(), "A".into(), "A".into()]))],
                ),
            ],
            config: None,
        };
        assert!(GraphValidator::validate(&wf).is_ok());
    }

    #[test]
    fn zero_task_workflow_is_valid() {
        let wf = WorkflowDescriptor { tasks: vec![], config: None };
        assert!(GraphValidator::validate(&wf).is_ok());
    }
}
