// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

pub mod consts;
pub mod model_spec;
pub mod params;
pub mod settings;

pub use model_spec::{ModelSpec, Provider, ReasoningEffort};
pub use params::{resolve, RequestParams, ResolvedParams};
pub use settings::{LoggerSettings, ServerSettings, Settings};
