// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod validation;

pub use config::ConfigError;
pub use execution::ExecutionError;
pub use validation::ValidationError;

/// Errors that can surface while turning declarations into runtime nodes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Top-level error for callers that drive a full run scope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Config(e) => Error::Config(e),
            BuildError::Validation(e) => Error::Validation(e),
        }
    }
}
