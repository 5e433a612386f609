// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Workflow lifecycle log messages.

use std::fmt;

pub struct WorkflowBuilt<'a> {
    pub name: &'a str,
    pub kind: &'a str,
}

impl fmt::Display for WorkflowBuilt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workflow '{}' built ({})", self.name, self.kind)
    }
}

pub struct StepStarted<'a> {
    pub orchestrator: &'a str,
    pub step: usize,
    pub total: usize,
}

impl fmt::Display for StepStarted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Orchestrator '{}' starting step {}/{}",
            self.orchestrator,
            self.step + 1,
            self.total
        )
    }
}

pub struct StepPartial<'a> {
    pub orchestrator: &'a str,
    pub step: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for StepPartial<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Orchestrator '{}' step {} completed with {}/{} task(s) failed",
            self.orchestrator,
            self.step + 1,
            self.failed,
            self.total
        )
    }
}

pub struct RefinementBelowThreshold<'a> {
    pub workflow: &'a str,
    pub iterations: u32,
    pub best_rating: &'a str,
}

impl fmt::Display for RefinementBelowThreshold<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Refinement loop '{}' exhausted {} iteration(s) below threshold (best: {})",
            self.workflow, self.iterations, self.best_rating
        )
    }
}

pub struct ScopeInitialized<'a> {
    pub app: &'a str,
}

impl fmt::Display for ScopeInitialized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Run scope for '{}' initialized", self.app)
    }
}

pub struct ScopeTornDown<'a> {
    pub app: &'a str,
}

impl fmt::Display for ScopeTornDown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Run scope for '{}' torn down", self.app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_render() {
        assert_eq!(
            WorkflowBuilt {
                name: "report",
                kind: "parallel"
            }
            .to_string(),
            "Workflow 'report' built (parallel)"
        );
        assert_eq!(
            StepStarted {
                orchestrator: "lead",
                step: 0,
                total: 3
            }
            .to_string(),
            "Orchestrator 'lead' starting step 1/3"
        );
    }
}
