// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Fan-out / fan-in composite.
//!
//! Sends the same message to every fan-out node concurrently, then joins
//! the responses through the fan-in node. The aggregate preserves
//! declaration order regardless of completion order, so the fan-in prompt
//! is deterministic.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::errors::ExecutionError;

use super::WorkflowNode;

pub struct Parallel {
    name: String,
    fan_out: Vec<Arc<dyn WorkflowNode>>,
    fan_in: Arc<dyn WorkflowNode>,
    cancel: CancellationToken,
}

impl Parallel {
    pub fn new(
        name: impl Into<String>,
        fan_out: Vec<Arc<dyn WorkflowNode>>,
        fan_in: Arc<dyn WorkflowNode>,
        cancel: CancellationToken,
    ) -> Self {
        Parallel {
            name: name.into(),
            fan_out,
            fan_in,
            cancel,
        }
    }

    /// Responses joined as named sections, fan-out declaration order.
    fn aggregate(&self, responses: &[String]) -> String {
        let mut combined = String::new();
        for (node, response) in self.fan_out.iter().zip(responses) {
            combined.push_str("## ");
            combined.push_str(node.name());
            combined.push('\n');
            combined.push_str(response);
            combined.push_str("\n\n");
        }
        combined
    }
}

#[async_trait]
impl WorkflowNode for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<String, ExecutionError> {
        if self.cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled {
                name: self.name.clone(),
            });
        }

        let branches = self.fan_out.iter().map(|node| node.send(message));
        let results = join_all(branches).await;

        // A cancelled branch cancels the whole composite, never a partial
        // aggregate.
        if results
            .iter()
            .any(|r| matches!(r, Err(err) if err.is_cancelled()))
        {
            return Err(ExecutionError::Cancelled {
                name: self.name.clone(),
            });
        }

        let mut responses = Vec::with_capacity(results.len());
        for result in results {
            responses.push(result?);
        }

        self.fan_in.send(&self.aggregate(&responses)).await
    }
}
