// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Callable-unit registry.
//!
//! Tasks are async callables registered with execution metadata (timeout,
//! retry policy) so the active execution engine can schedule them. The
//! asynchronous-invocation contract is carried by the [`TaskFn`] type
//! itself: a task is a closure producing a boxed future, so a blocking
//! function simply cannot be registered.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::config::consts::DEFAULT_TASK_TIMEOUT;
use crate::errors::{ConfigError, ExecutionError};

/// Future produced by one task invocation.
pub type TaskFuture = BoxFuture<'static, Result<String, ExecutionError>>;

/// A bindable task: invoked with an input payload, yields a future. Engines
/// may invoke it more than once (retries), so it must be re-invocable.
pub type TaskFn = Arc<dyn Fn(String) -> TaskFuture + Send + Sync>;

/// Scheduling metadata registered alongside a callable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionMetadata {
    /// Callable-unit identity, also the human-facing name.
    pub activity_name: String,
    /// Bounds total wall-clock time including retries under the durable
    /// engine.
    pub schedule_to_close_timeout: Duration,
    /// Opaque retry policy, interpreted by the durable engine.
    pub retry_policy: BTreeMap<String, serde_json::Value>,
    /// Arbitrary extension metadata.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ExecutionMetadata {
    pub fn new(activity_name: impl Into<String>) -> Self {
        ExecutionMetadata {
            activity_name: activity_name.into(),
            schedule_to_close_timeout: DEFAULT_TASK_TIMEOUT,
            retry_policy: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.schedule_to_close_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, policy: BTreeMap<String, serde_json::Value>) -> Self {
        self.retry_policy = policy;
        self
    }
}

/// A callable bound to its metadata.
#[derive(Clone)]
pub struct RegisteredTask {
    pub metadata: ExecutionMetadata,
    pub call: TaskFn,
}

impl std::fmt::Debug for RegisteredTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTask")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Identity -> task mapping with stable iteration order. Mutated only
/// during the declaration phase; cleared at lifecycle teardown.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, RegisteredTask>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        TaskRegistry::default()
    }

    /// Register a callable unit. Re-registration under the same identity
    /// overwrites.
    pub fn register(
        &mut self,
        metadata: ExecutionMetadata,
        call: TaskFn,
    ) -> Result<(), ConfigError> {
        if metadata.activity_name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        self.tasks
            .insert(metadata.activity_name.clone(), RegisteredTask { metadata, call });
        Ok(())
    }

    pub fn get(&self, activity_name: &str) -> Option<&RegisteredTask> {
        self.tasks.get(activity_name)
    }

    /// Metadata for every registered callable, in stable order.
    pub fn list(&self) -> Vec<&ExecutionMetadata> {
        self.tasks.values().map(|t| &t.metadata).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
