// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Engine selection.
//!
//! One factory call per run scope: settings name the engine, the factory
//! instantiates it behind the [`ExecutionEngine`] trait so the rest of the
//! crate never branches on the kind.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::observability::messages::engine::EngineSelected;

use super::{CooperativeEngine, DurableEngine, EngineKind, ExecutionEngine};

pub struct EngineFactory;

impl EngineFactory {
    pub fn from_settings(
        settings: &Settings,
        cancel: CancellationToken,
    ) -> Arc<dyn ExecutionEngine> {
        let engine: Arc<dyn ExecutionEngine> = match settings.execution_engine {
            EngineKind::Cooperative => Arc::new(CooperativeEngine::new(cancel)),
            EngineKind::Durable => Arc::new(DurableEngine::new(cancel)),
        };
        tracing::debug!("{}", EngineSelected { kind: engine.kind() });
        engine
    }
}
