// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Deterministic scripted LLM.
//!
//! Substring-matching stub backend for tests and the demo binary. Rules are
//! checked in registration order; the first prompt substring that matches
//! wins, otherwise the default response is returned. Every prompt seen is
//! recorded for later assertion.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::config::ResolvedParams;
use crate::errors::ExecutionError;

use super::LlmClient;

pub struct ScriptedLlm {
    rules: Vec<(String, String)>,
    default_response: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(default_response: impl Into<String>) -> Self {
        ScriptedLlm {
            rules: Vec::new(),
            default_response: default_response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `response` whenever the prompt contains `needle`.
    pub fn respond_when(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), response.into()));
        self
    }

    /// Every prompt this backend has seen, in order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(prompts) => prompts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        _params: &ResolvedParams,
    ) -> Result<String, ExecutionError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        for (needle, response) in &self.rules {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_response.clone())
    }
}
