// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Workflow node implementations.
//!
//! Every runnable node, whether a single agent or a composite, exposes the
//! same [`WorkflowNode`] surface: a name and an async `send`. Composites
//! hold their children as `Arc<dyn WorkflowNode>`, so nesting falls out of
//! the trait with no special cases.

pub mod agent;
pub mod builder;
pub mod evaluator_optimizer;
pub mod orchestrator;
pub mod parallel;


use async_trait::async_trait;

use crate::errors::ExecutionError;

pub use agent::Agent;
pub use builder::WorkflowBuilder;
pub use evaluator_optimizer::{EvaluatorOptimizer, QualityRating, RefinementOutcome};
pub use orchestrator::{Orchestrator, OrchestratorState, Plan, PlanStep, PlanTask};
pub use parallel::Parallel;

/// A runnable workflow node.
#[async_trait]
pub trait WorkflowNode: Send + Sync {
    fn name(&self) -> &str;

    /// Process one message and return the node's response.
    async fn send(&self, message: &str) -> Result<String, ExecutionError>;
}

impl std::fmt::Debug for dyn WorkflowNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowNode")
            .field("name", &self.name())
            .finish()
    }
}
