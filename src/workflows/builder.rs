// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Declaration-to-node builder.
//!
//! Walks the dependency-resolved build order and instantiates each
//! declaration bottom-up: by the time a composite is built, every node it
//! references already exists in the build map. Requested names must be
//! declared; references inside a composite must resolve to a built node.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::collaborators::LlmClient;
use crate::config::params::{resolve, RequestParams};
use crate::errors::{BuildError, ValidationError};
use crate::executor::ExecutionEngine;
use crate::graph;
use crate::observability::messages::workflow::WorkflowBuilt;
use crate::registry::{AgentConfig, AgentKind, AgentRegistry};

use super::{Agent, EvaluatorOptimizer, Orchestrator, Parallel, WorkflowNode};

pub struct WorkflowBuilder {
    engine: Arc<dyn ExecutionEngine>,
    llm: Arc<dyn LlmClient>,
    file_params: RequestParams,
    cli_params: RequestParams,
    cancel: CancellationToken,
}

impl WorkflowBuilder {
    pub fn new(
        engine: Arc<dyn ExecutionEngine>,
        llm: Arc<dyn LlmClient>,
        file_params: RequestParams,
        cli_params: RequestParams,
        cancel: CancellationToken,
    ) -> Self {
        WorkflowBuilder {
            engine,
            llm,
            file_params,
            cli_params,
            cancel,
        }
    }

    /// Build the requested nodes and everything they depend on. Returns a
    /// map covering the full dependency closure, keyed by name.
    pub fn build(
        &self,
        registry: &AgentRegistry,
        requested: &[String],
    ) -> Result<BTreeMap<String, Arc<dyn WorkflowNode>>, BuildError> {
        for name in requested {
            if !registry.contains(name) {
                return Err(ValidationError::UnknownWorkflow { name: name.clone() }.into());
            }
        }

        let order = graph::order(requested, registry)?;
        let mut built: BTreeMap<String, Arc<dyn WorkflowNode>> = BTreeMap::new();

        for name in order.iter() {
            let Some(config) = registry.lookup(name) else {
                // Unreachable by construction: the order only emits
                // registered names.
                continue;
            };
            let node = self.build_one(config, &built)?;
            tracing::debug!(
                "{}",
                WorkflowBuilt {
                    name,
                    kind: config.kind.label(),
                }
            );
            built.insert(name.clone(), node);
        }

        Ok(built)
    }

    fn build_one(
        &self,
        config: &AgentConfig,
        built: &BTreeMap<String, Arc<dyn WorkflowNode>>,
    ) -> Result<Arc<dyn WorkflowNode>, BuildError> {
        let params = resolve(
            &RequestParams::baseline(),
            &self.file_params,
            &self.cli_params,
            &config.call_site_params(),
        )?;

        let node: Arc<dyn WorkflowNode> = match &config.kind {
            AgentKind::Basic => Arc::new(Agent::new(
                config.name.clone(),
                config.instruction.clone(),
                params,
                config.servers.clone(),
                self.llm.clone(),
                self.engine.clone(),
            )),
            AgentKind::Orchestrator { children } => {
                let mut resolved = BTreeMap::new();
                for child in children {
                    resolved.insert(
                        child.clone(),
                        self.reference(&config.name, child, built)?,
                    );
                }
                Arc::new(Orchestrator::new(
                    config.name.clone(),
                    config.instruction.clone(),
                    resolved,
                    self.llm.clone(),
                    self.engine.clone(),
                    params,
                ))
            }
            AgentKind::Parallel { fan_in, fan_out } => {
                let fan_out_nodes = fan_out
                    .iter()
                    .map(|name| self.reference(&config.name, name, built))
                    .collect::<Result<Vec<_>, _>>()?;
                let fan_in_node = self.reference(&config.name, fan_in, built)?;
                Arc::new(Parallel::new(
                    config.name.clone(),
                    fan_out_nodes,
                    fan_in_node,
                    self.cancel.clone(),
                ))
            }
            AgentKind::EvaluatorOptimizer {
                optimizer,
                evaluator,
                min_rating,
                max_refinements,
            } => Arc::new(EvaluatorOptimizer::new(
                config.name.clone(),
                self.reference(&config.name, optimizer, built)?,
                self.reference(&config.name, evaluator, built)?,
                *min_rating,
                *max_refinements,
            )),
        };
        Ok(node)
    }

    /// Resolve a composite's reference against the nodes built so far.
    fn reference(
        &self,
        workflow: &str,
        name: &str,
        built: &BTreeMap<String, Arc<dyn WorkflowNode>>,
    ) -> Result<Arc<dyn WorkflowNode>, BuildError> {
        built
            .get(name)
            .cloned()
            .ok_or_else(|| {
                ValidationError::UnresolvedReference {
                    workflow: workflow.to_string(),
                    missing: name.to_string(),
                }
                .into()
            })
    }
}
