// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Basic LLM-backed agent.
//!
//! Composes its instruction, optional conversation history, and the
//! incoming message into one prompt, then routes the generation call
//! through the scope's execution engine so engine semantics (cancellation,
//! retries, journaling) apply uniformly.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::collaborators::LlmClient;
use crate::config::ResolvedParams;
use crate::errors::ExecutionError;
use crate::executor::ExecutionEngine;
use crate::registry::{ExecutionMetadata, TaskFn};

use super::WorkflowNode;

pub struct Agent {
    name: String,
    instruction: String,
    params: ResolvedParams,
    servers: Vec<String>,
    llm: Arc<dyn LlmClient>,
    engine: Arc<dyn ExecutionEngine>,
    metadata: ExecutionMetadata,
    history: Mutex<Vec<(String, String)>>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        params: ResolvedParams,
        servers: Vec<String>,
        llm: Arc<dyn LlmClient>,
        engine: Arc<dyn ExecutionEngine>,
    ) -> Self {
        let name = name.into();
        let metadata = ExecutionMetadata::new(format!("{name}.generate"));
        Agent {
            name,
            instruction: instruction.into(),
            params,
            servers,
            llm,
            engine,
            metadata,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.params
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    async fn compose_prompt(&self, message: &str) -> String {
        let mut prompt = String::new();
        if !self.instruction.is_empty() {
            prompt.push_str(&self.instruction);
            prompt.push_str("\n\n");
        }
        if self.params.use_history {
            let history = self.history.lock().await;
            for (user, assistant) in history.iter() {
                prompt.push_str("User: ");
                prompt.push_str(user);
                prompt.push_str("\nAssistant: ");
                prompt.push_str(assistant);
                prompt.push('\n');
            }
        }
        prompt.push_str(message);
        prompt
    }
}

#[async_trait]
impl WorkflowNode for Agent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<String, ExecutionError> {
        let prompt = self.compose_prompt(message).await;
        let llm = self.llm.clone();
        let params = self.params.clone();
        let call: TaskFn = Arc::new(move |input: String| {
            let llm = llm.clone();
            let params = params.clone();
            Box::pin(async move { llm.generate(&input, &params).await })
        });

        let response = self.engine.run(&self.metadata, call, prompt).await?;
        if self.params.use_history {
            self.history
                .lock()
                .await
                .push((message.to_string(), response.clone()));
        }
        Ok(response)
    }
}
