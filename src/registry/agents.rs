// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Declarative agent registry.
//!
//! Callers declare named workflow nodes before any execution begins; the
//! registry is a snapshot handed read-only to the build phase, so the
//! single-writer-then-many-readers discipline needs no locking.

use std::collections::BTreeMap;

use crate::config::params::RequestParams;
use crate::errors::ConfigError;
use crate::workflows::QualityRating;

/// The role a dependency edge plays in a composite declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyRole {
    FanOut,
    FanIn,
    ChildAgent,
}

/// What kind of node a declaration produces, with its per-kind wiring.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentKind {
    /// A plain LLM-backed agent.
    Basic,
    /// Plans a sequence of steps and delegates to child agents.
    Orchestrator { children: Vec<String> },
    /// Fans the same input out to several agents, then joins through one.
    Parallel {
        fan_in: String,
        fan_out: Vec<String>,
    },
    /// Optimizer/evaluator refinement loop.
    EvaluatorOptimizer {
        optimizer: String,
        evaluator: String,
        min_rating: QualityRating,
        max_refinements: u32,
    },
}

impl AgentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::Basic => "agent",
            AgentKind::Orchestrator { .. } => "orchestrator",
            AgentKind::Parallel { .. } => "parallel",
            AgentKind::EvaluatorOptimizer { .. } => "evaluator_optimizer",
        }
    }
}

/// One registered declaration. Immutable once registered under a name.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    pub instruction: String,
    /// Tool/resource server names this agent may use.
    pub servers: Vec<String>,
    /// Call-site model specifier, the highest precedence tier.
    pub model: Option<String>,
    pub use_history: bool,
    /// Call-site request parameter overrides.
    pub request_params: RequestParams,
}

impl AgentConfig {
    fn with_kind(name: impl Into<String>, instruction: impl Into<String>, kind: AgentKind) -> Self {
        AgentConfig {
            name: name.into(),
            kind,
            instruction: instruction.into(),
            servers: Vec::new(),
            model: None,
            use_history: true,
            request_params: RequestParams::default(),
        }
    }

    pub fn basic(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        AgentConfig::with_kind(name, instruction, AgentKind::Basic)
    }

    pub fn orchestrator(
        name: impl Into<String>,
        instruction: impl Into<String>,
        children: Vec<String>,
    ) -> Self {
        AgentConfig::with_kind(name, instruction, AgentKind::Orchestrator { children })
    }

    pub fn parallel(
        name: impl Into<String>,
        fan_in: impl Into<String>,
        fan_out: Vec<String>,
    ) -> Self {
        AgentConfig::with_kind(
            name,
            String::new(),
            AgentKind::Parallel {
                fan_in: fan_in.into(),
                fan_out,
            },
        )
    }

    pub fn evaluator_optimizer(
        name: impl Into<String>,
        optimizer: impl Into<String>,
        evaluator: impl Into<String>,
        min_rating: QualityRating,
        max_refinements: u32,
    ) -> Self {
        AgentConfig::with_kind(
            name,
            String::new(),
            AgentKind::EvaluatorOptimizer {
                optimizer: optimizer.into(),
                evaluator: evaluator.into(),
                min_rating,
                max_refinements,
            },
        )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_servers(mut self, servers: Vec<String>) -> Self {
        self.servers = servers;
        self
    }

    pub fn with_use_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }

    pub fn with_request_params(mut self, params: RequestParams) -> Self {
        self.request_params = params;
        self
    }

    /// The names this declaration depends on, in declared order.
    pub fn dependencies(&self) -> Vec<(&str, DependencyRole)> {
        match &self.kind {
            AgentKind::Basic => Vec::new(),
            AgentKind::Orchestrator { children } => children
                .iter()
                .map(|c| (c.as_str(), DependencyRole::ChildAgent))
                .collect(),
            AgentKind::Parallel { fan_in, fan_out } => {
                let mut deps: Vec<(&str, DependencyRole)> = fan_out
                    .iter()
                    .map(|f| (f.as_str(), DependencyRole::FanOut))
                    .collect();
                deps.push((fan_in.as_str(), DependencyRole::FanIn));
                deps
            }
            AgentKind::EvaluatorOptimizer {
                optimizer,
                evaluator,
                ..
            } => vec![
                (optimizer.as_str(), DependencyRole::ChildAgent),
                (evaluator.as_str(), DependencyRole::ChildAgent),
            ],
        }
    }

    /// Call-site tier for parameter resolution: the declaration's explicit
    /// overrides, with `model` and `use_history` folded in.
    pub fn call_site_params(&self) -> RequestParams {
        let mut params = self.request_params.clone();
        if params.model.is_none() {
            params.model = self.model.clone();
        }
        if params.use_history.is_none() {
            params.use_history = Some(self.use_history);
        }
        params
    }
}

/// Name -> declaration mapping with stable (sorted) iteration order.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentConfig>,
    strict: bool,
}

impl AgentRegistry {
    pub fn new() -> Self {
        AgentRegistry::default()
    }

    /// Enable strict mode: repeated declarations under one name are rejected
    /// instead of silently overwriting.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register a declaration. A later declaration under the same name
    /// silently overwrites the earlier one (documented behavior); strict
    /// mode turns that into [`ConfigError::DuplicateAgent`].
    pub fn register(&mut self, config: AgentConfig) -> Result<(), ConfigError> {
        if config.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.agents.contains_key(&config.name) {
            if self.strict {
                return Err(ConfigError::DuplicateAgent { name: config.name });
            }
            tracing::debug!(
                "{}",
                crate::observability::messages::validation::DeclarationOverwritten {
                    name: &config.name,
                }
            );
        }
        self.agents.insert(config.name.clone(), config);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Declared names in stable sorted order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.agents.keys()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(name: &str, instruction: &str) -> AgentConfig {
        AgentConfig {
            name: name.to_string(),
            kind: AgentKind::Basic,
            instruction: instruction.to_string(),
            servers: vec![],
            model: None,
            use_history: true,
            request_params: RequestParams::default(),
        }
    }

    #[test]
    fn later_declaration_silently_overwrites() {
        let mut registry = AgentRegistry::new();
        registry.register(basic("a", "first")).unwrap();
        registry.register(basic("a", "second")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("a").unwrap().instruction, "second");
    }

    #[test]
    fn strict_mode_rejects_duplicates() {
        let mut registry = AgentRegistry::new().strict(true);
        registry.register(basic("a", "first")).unwrap();
        let err = registry.register(basic("a", "second")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateAgent {
                name: "a".to_string()
            }
        );
        // The original declaration is untouched.
        assert_eq!(registry.lookup("a").unwrap().instruction, "first");
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut registry = AgentRegistry::new();
        assert_eq!(registry.register(basic("", "x")).unwrap_err(), ConfigError::EmptyName);
    }

    #[test]
    fn names_iterate_in_sorted_order() {
        let mut registry = AgentRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(basic(name, "i")).unwrap();
        }
        let names: Vec<&String> = registry.names().collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn parallel_dependencies_keep_declared_order() {
        let config = AgentConfig {
            name: "p".to_string(),
            kind: AgentKind::Parallel {
                fan_in: "collect".to_string(),
                fan_out: vec!["b".to_string(), "a".to_string()],
            },
            instruction: String::new(),
            servers: vec![],
            model: None,
            use_history: true,
            request_params: RequestParams::default(),
        };
        let deps = config.dependencies();
        assert_eq!(
            deps,
            vec![
                ("b", DependencyRole::FanOut),
                ("a", DependencyRole::FanOut),
                ("collect", DependencyRole::FanIn),
            ]
        );
    }

    #[test]
    fn call_site_params_fold_in_model_and_history() {
        let mut config = basic("a", "i");
        config.model = Some("gpt-4o".to_string());
        config.use_history = false;
        let params = config.call_site_params();
        assert_eq!(params.model.as_deref(), Some("gpt-4o"));
        assert_eq!(params.use_history, Some(false));
    }
}
