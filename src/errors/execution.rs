// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Runtime execution errors. Under the cooperative engine these propagate
//! immediately; under the durable engine, task failures are retried per the
//! task's retry policy before surfacing.

use std::time::Duration;

/// Errors raised while a workflow node or bound callable is executing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    /// A bound callable failed after any engine-level retries were exhausted.
    #[error("Task '{name}' failed: {message}")]
    TaskFailed { name: String, message: String },

    /// The LLM collaborator reported a provider error.
    #[error("LLM call for '{agent}' failed: {message}")]
    LlmFailed { agent: String, message: String },

    /// The durable engine's schedule-to-close timeout elapsed, including
    /// retry attempts.
    #[error("Task '{name}' exceeded its schedule-to-close timeout of {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    /// The planner produced output that could not be parsed into a plan.
    #[error("Could not parse plan for orchestrator '{orchestrator}': {reason}")]
    PlanParse { orchestrator: String, reason: String },

    /// Every sub-task of an orchestrator step failed; fatal for the run.
    #[error("All {count} sub-tasks of step {step} failed in orchestrator '{orchestrator}'")]
    StepFailed {
        orchestrator: String,
        step: usize,
        count: usize,
    },

    /// The work was abandoned, not failed. Kept distinct so callers can tell
    /// cancellation apart from failure.
    #[error("Workflow '{name}' was cancelled")]
    Cancelled { name: String },

    /// A message was sent to a name with no built node in this scope.
    #[error("No workflow named '{name}' is available in this scope")]
    UnknownWorkflow { name: String },
}

impl ExecutionError {
    /// True when the work was abandoned rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionError::Cancelled { .. })
    }
}
