// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Declarative LLM agent workflow orchestration.
//!
//! Declare agents and composite workflows on an [`lifecycle::App`], open a
//! run scope, and send messages. Dependencies between declarations are
//! resolved into a build order, nodes are instantiated bottom-up, and every
//! unit of work routes through a configurable execution engine.

pub mod collaborators; // External seams: LLM backends, tools, human input
pub mod config; // Settings file, model specifiers, parameter resolution
pub mod errors;
pub mod executor; // Cooperative and durable execution engines
pub mod graph; // Dependency resolution and cycle detection
pub mod lifecycle; // App declaration surface and run scopes
pub mod observability;
pub mod registry; // Agent and task registries
pub mod workflows; // Agent, orchestrator, parallel, evaluator-optimizer

pub use errors::Error;
