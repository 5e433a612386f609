// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Durable engine.
//!
//! Emulates durable-execution semantics in-process: completed activity
//! results are journaled and replayed instead of re-run, failures retry
//! with exponential backoff per the registered policy, and the whole
//! attempt chain is bounded by the schedule-to-close timeout.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::errors::{ConfigError, ExecutionError};
use crate::observability::messages::engine::{TaskReplayed, TaskRetry, TaskStarted, TaskTimedOut};
use crate::registry::{ExecutionMetadata, TaskFn};

use super::{EngineKind, ExecutionEngine};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_BACKOFF_COEFFICIENT: f64 = 2.0;
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);

/// Retry policy parsed from a task's registered metadata. Unknown keys are
/// ignored; wrongly-typed values are an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            backoff_coefficient: DEFAULT_BACKOFF_COEFFICIENT,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl RetryPolicy {
    pub fn from_metadata(
        policy: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        let mut parsed = RetryPolicy::default();
        if let Some(value) = policy.get("max_attempts") {
            parsed.max_attempts = as_u64(value, "max_attempts")? as u32;
        }
        if let Some(value) = policy.get("initial_interval_ms") {
            parsed.initial_interval = Duration::from_millis(as_u64(value, "initial_interval_ms")?);
        }
        if let Some(value) = policy.get("backoff_coefficient") {
            parsed.backoff_coefficient =
                value
                    .as_f64()
                    .ok_or_else(|| ConfigError::InvalidRetryPolicy {
                        key: "backoff_coefficient".to_string(),
                        reason: "expected a number".to_string(),
                    })?;
        }
        if let Some(value) = policy.get("max_interval_ms") {
            parsed.max_interval = Duration::from_millis(as_u64(value, "max_interval_ms")?);
        }
        Ok(parsed)
    }

    /// Sleep interval before the given retry (attempt numbering starts
    /// at 1, so the first retry waits the initial interval).
    fn interval_before(&self, attempt: u32) -> Duration {
        let factor = self.backoff_coefficient.powi(attempt.saturating_sub(1) as i32);
        let millis = self.initial_interval.as_millis() as f64 * factor;
        Duration::from_millis(millis as u64).min(self.max_interval)
    }
}

fn as_u64(value: &serde_json::Value, key: &str) -> Result<u64, ConfigError> {
    value.as_u64().ok_or_else(|| ConfigError::InvalidRetryPolicy {
        key: key.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}

/// Durable engine state: the replay journal maps `activity::input` to the
/// recorded result. The journal lives for the scope's lifetime.
pub struct DurableEngine {
    cancel: CancellationToken,
    journal: Mutex<HashMap<String, String>>,
}

impl DurableEngine {
    pub fn new(cancel: CancellationToken) -> Self {
        DurableEngine {
            cancel,
            journal: Mutex::new(HashMap::new()),
        }
    }

    fn journal_key(metadata: &ExecutionMetadata, input: &str) -> String {
        format!("{}::{}", metadata.activity_name, input)
    }

    async fn run_with_retries(
        &self,
        metadata: &ExecutionMetadata,
        policy: &RetryPolicy,
        call: TaskFn,
        input: String,
    ) -> Result<String, ExecutionError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ExecutionError::Cancelled {
                    name: metadata.activity_name.clone(),
                });
            }
            let result = tokio::select! {
                _ = self.cancel.cancelled() => Err(ExecutionError::Cancelled {
                    name: metadata.activity_name.clone(),
                }),
                result = call(input.clone()) => result,
            };
            match result {
                Ok(output) => return Ok(output),
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) if attempt >= max_attempts => return Err(err),
                Err(err) => {
                    tracing::debug!(
                        "{}",
                        TaskRetry {
                            activity: &metadata.activity_name,
                            attempt,
                            max_attempts,
                            error: &err,
                        }
                    );
                    tokio::time::sleep(policy.interval_before(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl ExecutionEngine for DurableEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Durable
    }

    async fn run(
        &self,
        metadata: &ExecutionMetadata,
        call: TaskFn,
        input: String,
    ) -> Result<String, ExecutionError> {
        let key = Self::journal_key(metadata, &input);
        if let Some(recorded) = self.journal.lock().await.get(&key) {
            tracing::debug!(
                "{}",
                TaskReplayed {
                    activity: &metadata.activity_name,
                }
            );
            return Ok(recorded.clone());
        }

        let policy = RetryPolicy::from_metadata(&metadata.retry_policy).map_err(|err| {
            ExecutionError::TaskFailed {
                name: metadata.activity_name.clone(),
                message: err.to_string(),
            }
        })?;

        tracing::debug!(
            "{}",
            TaskStarted {
                activity: &metadata.activity_name,
                engine: self.kind(),
            }
        );

        let outcome = tokio::time::timeout(
            metadata.schedule_to_close_timeout,
            self.run_with_retries(metadata, &policy, call, input),
        )
        .await;

        match outcome {
            Ok(Ok(output)) => {
                self.journal.lock().await.insert(key, output.clone());
                Ok(output)
            }
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => {
                tracing::warn!(
                    "{}",
                    TaskTimedOut {
                        activity: &metadata.activity_name,
                        timeout: metadata.schedule_to_close_timeout,
                    }
                );
                Err(ExecutionError::Timeout {
                    name: metadata.activity_name.clone(),
                    timeout: metadata.schedule_to_close_timeout,
                })
            }
        }
    }
}
