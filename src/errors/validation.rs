// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Errors raised while resolving the dependency graph at build time.

/// Errors that can occur during dependency graph resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A workflow transitively depends on itself. Carries the full cycle
    /// path, e.g. `a -> b -> c -> a`. Fatal to the build call, not to the
    /// registry.
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// A composite workflow references a name absent from both the registry
    /// and the already-built set.
    #[error("Workflow '{workflow}' references '{missing}' which does not exist")]
    UnresolvedReference { workflow: String, missing: String },

    /// A build was requested for a name that was never declared.
    #[error("Requested workflow '{name}' is not declared")]
    UnknownWorkflow { name: String },
}
