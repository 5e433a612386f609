// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! In-process cooperative engine.
//!
//! Runs each callable unit as a plain future on the ambient runtime. The
//! only semantics it layers on are cancellation: once the scope's token
//! fires, in-flight units resolve to [`ExecutionError::Cancelled`] and new
//! units refuse to start.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::ExecutionError;
use crate::observability::messages::engine::TaskStarted;
use crate::registry::{ExecutionMetadata, TaskFn};

use super::{EngineKind, ExecutionEngine};

#[derive(Debug, Clone)]
pub struct CooperativeEngine {
    cancel: CancellationToken,
}

impl CooperativeEngine {
    pub fn new(cancel: CancellationToken) -> Self {
        CooperativeEngine { cancel }
    }
}

#[async_trait]
impl ExecutionEngine for CooperativeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Cooperative
    }

    async fn run(
        &self,
        metadata: &ExecutionMetadata,
        call: TaskFn,
        input: String,
    ) -> Result<String, ExecutionError> {
        if self.cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled {
                name: metadata.activity_name.clone(),
            });
        }
        tracing::debug!(
            "{}",
            TaskStarted {
                activity: &metadata.activity_name,
                engine: self.kind(),
            }
        );
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ExecutionError::Cancelled {
                name: metadata.activity_name.clone(),
            }),
            result = call(input) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn echo() -> TaskFn {
        Arc::new(|input: String| Box::pin(async move { Ok(input) }))
    }

    #[tokio::test]
    async fn runs_a_task_to_completion() {
        let engine = CooperativeEngine::new(CancellationToken::new());
        let out = engine
            .run(&ExecutionMetadata::new("echo"), echo(), "hi".to_string())
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn cancelled_token_stops_new_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let engine = CooperativeEngine::new(cancel);
        let err = engine
            .run(&ExecutionMetadata::new("echo"), echo(), "hi".to_string())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_interrupts_in_flight_work() {
        let cancel = CancellationToken::new();
        let engine = CooperativeEngine::new(cancel.clone());
        let slow: TaskFn = Arc::new(|_input: String| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("never".to_string())
            })
        });

        let handle = tokio::spawn({
            let engine = engine.clone();
            async move {
                engine
                    .run(&ExecutionMetadata::new("slow"), slow, String::new())
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
    }
}
