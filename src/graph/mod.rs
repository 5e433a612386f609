// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Dependency graph resolution.
//!
//! Turns the flat registry of declarations into a deterministic, cycle-free
//! build order. Traversal is depth-first with post-order emission, so every
//! dependency appears before the node that references it. Cycle detection
//! tracks the current recursion path and reports the full cycle, e.g.
//! `a -> b -> c -> a`.
//!
//! Determinism: requested roots are visited in sorted order and each node's
//! dependencies in declared order, so the same registry contents and root
//! set always yield the same sequence.

use std::collections::HashSet;

use crate::errors::ValidationError;
use crate::registry::AgentRegistry;

/// Newtype wrapper for a resolved build order.
///
/// Invariants: no name appears twice; every dependency precedes its
/// dependent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOrder(pub Vec<String>);

impl BuildOrder {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BuildOrder> for Vec<String> {
    fn from(order: BuildOrder) -> Self {
        order.0
    }
}

/// Traversal state threaded explicitly through the walk: fully-ordered
/// nodes, the current recursion stack as a set, and the path for cycle
/// reporting.
#[derive(Debug, Default)]
struct Traversal {
    visited: HashSet<String>,
    on_path: HashSet<String>,
    path: Vec<String>,
    order: Vec<String>,
}

/// Compute a build order covering every registered node reachable from
/// `roots`.
///
/// Names absent from the registry are externally-supplied leaves: they are
/// neither expanded nor emitted, and are not an error. Registered basic
/// nodes emit without expansion; composite kinds expand their referenced
/// names first.
pub fn order(roots: &[String], registry: &AgentRegistry) -> Result<BuildOrder, ValidationError> {
    let mut sorted_roots: Vec<&String> = roots.iter().collect();
    sorted_roots.sort();
    sorted_roots.dedup();

    let mut traversal = Traversal::default();
    for root in sorted_roots {
        visit(root, registry, &mut traversal)?;
    }

    tracing::debug!(
        "{}",
        crate::observability::messages::validation::BuildOrderResolved {
            count: traversal.order.len(),
        }
    );
    Ok(BuildOrder(traversal.order))
}

fn visit(
    name: &str,
    registry: &AgentRegistry,
    traversal: &mut Traversal,
) -> Result<(), ValidationError> {
    if traversal.on_path.contains(name) {
        // Back edge: extract the cycle from where it first entered the path.
        let start = traversal
            .path
            .iter()
            .position(|n| n == name)
            .unwrap_or(0);
        let mut cycle = traversal.path[start..].to_vec();
        cycle.push(name.to_string());
        return Err(ValidationError::CircularDependency { cycle });
    }
    if traversal.visited.contains(name) {
        return Ok(());
    }
    let Some(config) = registry.lookup(name) else {
        // Externally-supplied leaf: no expansion, no emission.
        return Ok(());
    };

    traversal.on_path.insert(name.to_string());
    traversal.path.push(name.to_string());

    for (dependency, _role) in config.dependencies() {
        visit(dependency, registry, traversal)?;
    }

    traversal.on_path.remove(name);
    traversal.path.pop();

    traversal.visited.insert(name.to_string());
    traversal.order.push(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::RequestParams;
    use crate::registry::{AgentConfig, AgentKind};
    use crate::workflows::QualityRating;

    fn registry_with(configs: Vec<AgentConfig>) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        for config in configs {
            registry.register(config).unwrap();
        }
        registry
    }

    fn node(name: &str, kind: AgentKind) -> AgentConfig {
        AgentConfig {
            name: name.to_string(),
            kind,
            instruction: String::new(),
            servers: vec![],
            model: None,
            use_history: true,
            request_params: RequestParams::default(),
        }
    }

    fn parallel(name: &str, fan_in: &str, fan_out: &[&str]) -> AgentConfig {
        node(
            name,
            AgentKind::Parallel {
                fan_in: fan_in.to_string(),
                fan_out: fan_out.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn position(order: &BuildOrder, name: &str) -> usize {
        order.0.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn dependencies_precede_dependents() {
        let registry = registry_with(vec![
            node("a", AgentKind::Basic),
            node("b", AgentKind::Basic),
            node("collect", AgentKind::Basic),
            parallel("p", "collect", &["a", "b"]),
        ]);

        let order = order(&["p".to_string()], &registry).unwrap();
        assert!(position(&order, "a") < position(&order, "p"));
        assert!(position(&order, "b") < position(&order, "p"));
        assert!(position(&order, "collect") < position(&order, "p"));
    }

    #[test]
    fn nested_parallel_builds_inner_first() {
        let registry = registry_with(vec![
            node("a", AgentKind::Basic),
            node("b", AgentKind::Basic),
            node("collect", AgentKind::Basic),
            parallel("inner", "collect", &["a"]),
            parallel("outer", "collect", &["inner", "b"]),
        ]);

        let order = order(&["outer".to_string()], &registry).unwrap();
        assert!(position(&order, "inner") < position(&order, "outer"));
        assert!(position(&order, "a") < position(&order, "inner"));
    }

    #[test]
    fn unknown_dependency_is_a_leaf_not_an_error() {
        let registry = registry_with(vec![
            node("collect", AgentKind::Basic),
            parallel("p", "collect", &["external"]),
        ]);

        let order = order(&["p".to_string()], &registry).unwrap();
        assert!(!order.0.contains(&"external".to_string()));
        assert!(order.0.contains(&"p".to_string()));
    }

    #[test]
    fn no_name_appears_twice() {
        // Diamond: both parallels share a fan-out agent.
        let registry = registry_with(vec![
            node("shared", AgentKind::Basic),
            node("collect", AgentKind::Basic),
            parallel("left", "collect", &["shared"]),
            parallel("right", "collect", &["shared"]),
            parallel("top", "collect", &["left", "right"]),
        ]);

        let order = order(&["top".to_string()], &registry).unwrap();
        let mut seen = HashSet::new();
        for name in order.iter() {
            assert!(seen.insert(name.clone()), "duplicate {name}");
        }
    }

    #[test]
    fn two_node_cycle_reports_both_names() {
        let registry = registry_with(vec![
            node("collect", AgentKind::Basic),
            parallel("x", "collect", &["y"]),
            parallel("y", "collect", &["x"]),
        ]);

        let err = order(&["x".to_string()], &registry).unwrap_err();
        match err {
            ValidationError::CircularDependency { cycle } => {
                assert!(cycle.contains(&"x".to_string()));
                assert!(cycle.contains(&"y".to_string()));
                // Closed path: first and last entries match.
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn self_cycle_is_detected() {
        let registry = registry_with(vec![
            node("collect", AgentKind::Basic),
            parallel("x", "collect", &["x"]),
        ]);
        let err = order(&["x".to_string()], &registry).unwrap_err();
        assert!(matches!(err, ValidationError::CircularDependency { .. }));
    }

    #[test]
    fn order_is_idempotent() {
        let registry = registry_with(vec![
            node("a", AgentKind::Basic),
            node("b", AgentKind::Basic),
            node("collect", AgentKind::Basic),
            parallel("p", "collect", &["b", "a"]),
            node(
                "orch",
                AgentKind::Orchestrator {
                    children: vec!["a".to_string(), "b".to_string()],
                },
            ),
        ]);

        let roots = vec!["p".to_string(), "orch".to_string()];
        let first = order(&roots, &registry).unwrap();
        let second = order(&roots, &registry).unwrap();
        assert_eq!(first, second);

        // Root order in the request does not change the result.
        let flipped = order(&["orch".to_string(), "p".to_string()], &registry).unwrap();
        assert_eq!(first, flipped);
    }

    #[test]
    fn evaluator_optimizer_expands_both_references() {
        let registry = registry_with(vec![
            node("opt", AgentKind::Basic),
            node("eval", AgentKind::Basic),
            node(
                "loop",
                AgentKind::EvaluatorOptimizer {
                    optimizer: "opt".to_string(),
                    evaluator: "eval".to_string(),
                    min_rating: QualityRating::Good,
                    max_refinements: 3,
                },
            ),
        ]);

        let order = order(&["loop".to_string()], &registry).unwrap();
        assert!(position(&order, "opt") < position(&order, "loop"));
        assert!(position(&order, "eval") < position(&order, "loop"));
    }
}
