// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Configuration errors: surfaced synchronously at declaration or load time,
//! never retried.

/// Errors raised while resolving configuration or registering declarations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The model specifier did not match `provider.model_name[.reasoning_effort]`
    /// and is not a known alias. Never silently substituted.
    #[error("Invalid model specifier '{spec}': {reason}")]
    InvalidModelSpec { spec: String, reason: String },

    /// No tier (call site, CLI, config file, baseline) supplied a model.
    #[error("No model specified at any configuration tier")]
    MissingModel,

    /// A declaration was missing a required field.
    #[error("Workflow '{workflow}' is missing required field '{field}'")]
    MissingField { workflow: String, field: String },

    /// Strict mode rejected a repeated declaration. The default (non-strict)
    /// registry silently overwrites instead.
    #[error("Agent '{name}' is already declared")]
    DuplicateAgent { name: String },

    /// Agent and task names must be non-empty.
    #[error("Declaration name must not be empty")]
    EmptyName,

    /// A retry policy entry had a value the durable engine cannot interpret.
    #[error("Invalid retry policy entry '{key}': {reason}")]
    InvalidRetryPolicy { key: String, reason: String },

    /// A configuration file could not be read or parsed.
    #[error("Failed to load configuration from '{path}': {reason}")]
    LoadFailed { path: String, reason: String },
}
