// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Structured model specifiers.
//!
//! A model is selected with a string of the form
//! `provider.model_name[.reasoning_effort]`, for example
//! `openai.o3-mini.low`, or with a bare alias such as `sonnet` or `gpt-4o`.
//! Parsing is strict: a malformed specifier is a [`ConfigError`], never a
//! guessed substitute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// LLM providers a model specifier can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Anthropic,
    OpenAi,
    DeepSeek,
}

impl FromStr for Provider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            "deepseek" => Ok(Provider::DeepSeek),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAi => write!(f, "openai"),
            Provider::DeepSeek => write!(f, "deepseek"),
        }
    }
}

/// Reasoning effort hint, supported by some providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl FromStr for ReasoningEffort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            _ => Err(()),
        }
    }
}

/// A fully parsed model specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
    pub reasoning_effort: Option<ReasoningEffort>,
}

/// Named aliases for common models.
fn resolve_alias(name: &str) -> Option<ModelSpec> {
    let (provider, model) = match name {
        "haiku" => (Provider::Anthropic, "claude-3-5-haiku-latest"),
        "sonnet" => (Provider::Anthropic, "claude-3-5-sonnet-latest"),
        "opus" => (Provider::Anthropic, "claude-3-opus-latest"),
        "gpt-4o" => (Provider::OpenAi, "gpt-4o"),
        "gpt-4o-mini" => (Provider::OpenAi, "gpt-4o-mini"),
        "o3-mini" => (Provider::OpenAi, "o3-mini"),
        "deepseek" => (Provider::DeepSeek, "deepseek-chat"),
        _ => return None,
    };
    Some(ModelSpec {
        provider,
        model: model.to_string(),
        reasoning_effort: None,
    })
}

impl ModelSpec {
    /// Parse a model specifier string or alias.
    ///
    /// Fails explicitly when the specifier is malformed; the caller must
    /// surface the error rather than fall back to a default.
    pub fn parse(spec: &str) -> Result<ModelSpec, ConfigError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ConfigError::InvalidModelSpec {
                spec: spec.to_string(),
                reason: "specifier is empty".to_string(),
            });
        }

        if let Some(aliased) = resolve_alias(spec) {
            return Ok(aliased);
        }

        let parts: Vec<&str> = spec.split('.').collect();
        if parts.len() < 2 {
            return Err(ConfigError::InvalidModelSpec {
                spec: spec.to_string(),
                reason: format!(
                    "'{spec}' is neither a known alias nor of the form provider.model_name"
                ),
            });
        }

        let provider = Provider::from_str(parts[0]).map_err(|_| ConfigError::InvalidModelSpec {
            spec: spec.to_string(),
            reason: format!("unknown provider '{}'", parts[0]),
        })?;

        // A trailing segment is treated as a reasoning effort only when it
        // parses as one; model ids themselves may contain dots.
        let (model_parts, reasoning_effort) = match parts.last() {
            Some(last) if parts.len() > 2 => match ReasoningEffort::from_str(last) {
                Ok(effort) => (&parts[1..parts.len() - 1], Some(effort)),
                Err(_) => (&parts[1..], None),
            },
            _ => (&parts[1..], None),
        };

        let model = model_parts.join(".");
        if model.is_empty() || model_parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidModelSpec {
                spec: spec.to_string(),
                reason: "model name is empty".to_string(),
            });
        }

        Ok(ModelSpec {
            provider,
            model,
            reasoning_effort,
        })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.provider, self.model)?;
        match self.reasoning_effort {
            Some(ReasoningEffort::Low) => write!(f, ".low"),
            Some(ReasoningEffort::Medium) => write!(f, ".medium"),
            Some(ReasoningEffort::High) => write!(f, ".high"),
            None => Ok(()),
        }
    }
}
