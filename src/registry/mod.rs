// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

pub mod agents;
pub mod tasks;

pub use agents::{AgentConfig, AgentKind, AgentRegistry, DependencyRole};
pub use tasks::{ExecutionMetadata, RegisteredTask, TaskFn, TaskFuture, TaskRegistry};
