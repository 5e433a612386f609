// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! External collaborator seams.
//!
//! Everything outside the orchestration core sits behind a trait: the LLM
//! backend, tool providers, human input, and notification sinks. Production
//! wiring supplies real implementations; tests and demos use
//! [`scripted::ScriptedLlm`].

pub mod scripted;

use async_trait::async_trait;

use crate::config::ResolvedParams;
use crate::errors::ExecutionError;

pub use scripted::ScriptedLlm;

/// Text-generation backend. One prompt in, one completion out; the resolved
/// parameters carry the model choice and generation settings.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &ResolvedParams,
    ) -> Result<String, ExecutionError>;
}

/// A named source of callable tools and resources.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn list_tools(&self) -> Result<Vec<String>, ExecutionError>;

    async fn call_tool(
        &self,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<String, ExecutionError>;
}

/// Blocking-style human interaction, surfaced asynchronously.
#[async_trait]
pub trait HumanInput: Send + Sync {
    async fn prompt(&self, message: &str) -> Result<String, ExecutionError>;
}

/// Outbound notification sink for progress events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), ExecutionError>;
}
