// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

use std::time::Duration;

/// Baseline model when no tier supplies one.
pub const DEFAULT_MODEL: &str = "haiku";

/// Baseline completion budget for agents.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Agents keep conversation history unless told otherwise.
pub const DEFAULT_USE_HISTORY: bool = true;

/// Default schedule-to-close timeout for registered tasks.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(600);

/// Config file looked up in the working directory and its parents.
pub const CONFIG_FILE_NAME: &str = "ensemble.config.yaml";

/// Secrets overlay merged on top of the main config file.
pub const SECRETS_FILE_NAME: &str = "ensemble.secrets.yaml";
