// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Planning orchestrator.
//!
//! Asks its own LLM for a JSON plan over the available child agents, then
//! executes the plan step by step: steps run sequentially, the tasks inside
//! a step run concurrently. Partial step failures are surfaced to later
//! steps; a step where every task fails aborts the run. A final synthesis
//! call turns the accumulated results into the response.
//!
//! Plan generation and synthesis are engine activities like any other LLM
//! call: cancellation reaches an in-flight planning call, and under the
//! durable engine a resumed run replays the recorded plan instead of
//! generating a new one.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::collaborators::LlmClient;
use crate::config::ResolvedParams;
use crate::errors::ExecutionError;
use crate::executor::ExecutionEngine;
use crate::observability::messages::workflow::{StepPartial, StepStarted};
use crate::registry::{ExecutionMetadata, TaskFn};

use super::WorkflowNode;

/// One delegated unit inside a plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    pub agent: String,
    pub objective: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub description: String,
    pub tasks: Vec<PlanTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

/// Lifecycle of one orchestrated run, observable by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Planning,
    Executing,
    Done,
    Failed,
}

pub struct Orchestrator {
    name: String,
    instruction: String,
    children: BTreeMap<String, Arc<dyn WorkflowNode>>,
    llm: Arc<dyn LlmClient>,
    engine: Arc<dyn ExecutionEngine>,
    params: ResolvedParams,
    plan_metadata: ExecutionMetadata,
    synthesis_metadata: ExecutionMetadata,
    state: Mutex<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        children: BTreeMap<String, Arc<dyn WorkflowNode>>,
        llm: Arc<dyn LlmClient>,
        engine: Arc<dyn ExecutionEngine>,
        params: ResolvedParams,
    ) -> Self {
        let name = name.into();
        let plan_metadata = ExecutionMetadata::new(format!("{name}.plan"));
        let synthesis_metadata = ExecutionMetadata::new(format!("{name}.synthesize"));
        Orchestrator {
            name,
            instruction: instruction.into(),
            children,
            llm,
            engine,
            params,
            plan_metadata,
            synthesis_metadata,
            state: Mutex::new(OrchestratorState::Planning),
        }
    }

    /// Run one LLM call as an engine activity, like [`super::Agent`] does.
    async fn generate(
        &self,
        metadata: &ExecutionMetadata,
        prompt: String,
    ) -> Result<String, ExecutionError> {
        let llm = self.llm.clone();
        let params = self.params.clone();
        let call: TaskFn = Arc::new(move |input: String| {
            let llm = llm.clone();
            let params = params.clone();
            Box::pin(async move { llm.generate(&input, &params).await })
        });
        self.engine.run(metadata, call, prompt).await
    }

    pub fn state(&self) -> OrchestratorState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: OrchestratorState) {
        match self.state.lock() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn plan_prompt(&self, objective: &str) -> String {
        let mut prompt = String::new();
        if !self.instruction.is_empty() {
            prompt.push_str(&self.instruction);
            prompt.push_str("\n\n");
        }
        prompt.push_str("Available agents:\n");
        for name in self.children.keys() {
            prompt.push_str("- ");
            prompt.push_str(name);
            prompt.push('\n');
        }
        prompt.push_str(
            "\nProduce a JSON plan for the objective below. Respond with only \
             JSON of the shape {\"steps\": [{\"description\": ..., \"tasks\": \
             [{\"agent\": ..., \"objective\": ...}]}]}.\n\nObjective: ",
        );
        prompt.push_str(objective);
        prompt
    }

    fn parse_plan(&self, raw: &str) -> Result<Plan, ExecutionError> {
        let stripped = strip_code_fences(raw);
        serde_json::from_str(stripped).map_err(|err| ExecutionError::PlanParse {
            orchestrator: self.name.clone(),
            reason: err.to_string(),
        })
    }

    async fn run_task(&self, task: &PlanTask, context: &str) -> Result<String, ExecutionError> {
        let child = self
            .children
            .get(&task.agent)
            .ok_or_else(|| ExecutionError::UnknownWorkflow {
                name: task.agent.clone(),
            })?;
        let mut input = String::new();
        if !context.is_empty() {
            input.push_str("Results so far:\n");
            input.push_str(context);
            input.push_str("\n\n");
        }
        input.push_str(&task.objective);
        child.send(&input).await
    }

    async fn execute(&self, plan: &Plan, objective: &str) -> Result<String, ExecutionError> {
        let total = plan.steps.len();
        let mut context = String::new();

        for (index, step) in plan.steps.iter().enumerate() {
            tracing::debug!(
                "{}",
                StepStarted {
                    orchestrator: &self.name,
                    step: index,
                    total,
                }
            );

            let results = join_all(step.tasks.iter().map(|task| self.run_task(task, &context)))
                .await;

            if results
                .iter()
                .any(|r| matches!(r, Err(err) if err.is_cancelled()))
            {
                self.set_state(OrchestratorState::Failed);
                return Err(ExecutionError::Cancelled {
                    name: self.name.clone(),
                });
            }

            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed == step.tasks.len() && !step.tasks.is_empty() {
                self.set_state(OrchestratorState::Failed);
                return Err(ExecutionError::StepFailed {
                    orchestrator: self.name.clone(),
                    step: index,
                    count: failed,
                });
            }
            if failed > 0 {
                tracing::warn!(
                    "{}",
                    StepPartial {
                        orchestrator: &self.name,
                        step: index,
                        failed,
                        total: step.tasks.len(),
                    }
                );
            }

            for (task, result) in step.tasks.iter().zip(results) {
                context.push_str("### ");
                context.push_str(&task.agent);
                context.push('\n');
                match result {
                    Ok(output) => context.push_str(&output),
                    Err(err) => {
                        context.push_str("(failed: ");
                        context.push_str(&err.to_string());
                        context.push(')');
                    }
                }
                context.push('\n');
            }
        }

        let synthesis_prompt = format!(
            "Objective: {objective}\n\nResults from all steps:\n{context}\n\
             Synthesize a final answer to the objective."
        );
        self.generate(&self.synthesis_metadata, synthesis_prompt).await
    }
}

/// Strip a leading/trailing markdown code fence if the model wrapped its
/// JSON in one.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[async_trait]
impl WorkflowNode for Orchestrator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<String, ExecutionError> {
        self.set_state(OrchestratorState::Planning);
        let raw_plan = self
            .generate(&self.plan_metadata, self.plan_prompt(message))
            .await
            .map_err(|err| {
                self.set_state(OrchestratorState::Failed);
                err
            })?;
        let plan = self.parse_plan(&raw_plan).map_err(|err| {
            self.set_state(OrchestratorState::Failed);
            err
        })?;

        self.set_state(OrchestratorState::Executing);
        match self.execute(&plan, message).await {
            Ok(result) => {
                self.set_state(OrchestratorState::Done);
                Ok(result)
            }
            Err(err) => {
                self.set_state(OrchestratorState::Failed);
                Err(err)
            }
        }
    }
}
