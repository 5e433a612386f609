// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Execution-engine log messages.

use std::fmt;
use std::time::Duration;

use crate::errors::ExecutionError;
use crate::executor::EngineKind;

pub struct EngineSelected {
    pub kind: EngineKind,
}

impl fmt::Display for EngineSelected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Execution engine selected: {}", self.kind)
    }
}

pub struct TaskStarted<'a> {
    pub activity: &'a str,
    pub engine: EngineKind,
}

impl fmt::Display for TaskStarted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task '{}' started on {} engine", self.activity, self.engine)
    }
}

pub struct TaskRetry<'a> {
    pub activity: &'a str,
    pub attempt: u32,
    pub max_attempts: u32,
    pub error: &'a ExecutionError,
}

impl fmt::Display for TaskRetry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task '{}' failed on attempt {}/{}, retrying: {}",
            self.activity, self.attempt, self.max_attempts, self.error
        )
    }
}

pub struct TaskReplayed<'a> {
    pub activity: &'a str,
}

impl fmt::Display for TaskReplayed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task '{}' replayed from journal", self.activity)
    }
}

pub struct TaskTimedOut<'a> {
    pub activity: &'a str,
    pub timeout: Duration,
}

impl fmt::Display for TaskTimedOut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task '{}' exceeded schedule-to-close timeout of {:?}",
            self.activity, self.timeout
        )
    }
}
