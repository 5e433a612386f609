// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Execution engines.
//!
//! Every callable unit routes through an [`ExecutionEngine`], selected once
//! per run scope from configuration. The cooperative engine runs futures
//! in-process with cancellation; the durable engine adds a replay journal
//! and retry-with-backoff semantics.

pub mod cooperative;
pub mod durable;
pub mod factory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ExecutionError;
use crate::registry::{ExecutionMetadata, TaskFn};

pub use cooperative::CooperativeEngine;
pub use durable::DurableEngine;
pub use factory::EngineFactory;

/// Which engine backs a run scope. Declared in settings, fixed for the
/// scope's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Cooperative,
    Durable,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Cooperative => write!(f, "cooperative"),
            EngineKind::Durable => write!(f, "durable"),
        }
    }
}

/// Strategy interface every engine implements. Workflow nodes call
/// [`ExecutionEngine::run`] for each unit of work and never schedule
/// futures directly.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Run one callable unit to completion under this engine's semantics.
    async fn run(
        &self,
        metadata: &ExecutionMetadata,
        call: TaskFn,
        input: String,
    ) -> Result<String, ExecutionError>;

    /// Notification hooks for declaration-time bookkeeping. The cooperative
    /// engine ignores these; a durable backend may need them to register
    /// workflow definitions with its runtime.
    fn on_workflow_registered(&self, _name: &str) {}

    fn on_entry_point_registered(&self, _workflow: &str, _method: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_kind_serde_round_trip() {
        let yaml = "durable";
        let kind: EngineKind = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(kind, EngineKind::Durable);
        assert_eq!(serde_yaml::to_string(&kind).unwrap().trim(), "durable");
    }

    #[test]
    fn default_is_cooperative() {
        assert_eq!(EngineKind::default(), EngineKind::Cooperative);
        assert_eq!(EngineKind::Cooperative.to_string(), "cooperative");
    }
}
