// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! File-tier application settings.
//!
//! Settings are loaded from a YAML mapping. The loader looks for
//! `ensemble.config.yaml` in the working directory and its parents, and
//! deep-merges a sibling `ensemble.secrets.yaml` (first one found walking
//! up) over the main file. This module supplies the "file config" tier to
//! parameter resolution; it does not interpret per-workflow declarations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::consts::{CONFIG_FILE_NAME, SECRETS_FILE_NAME};
use crate::config::params::RequestParams;
use crate::errors::ConfigError;
use crate::executor::EngineKind;

/// Connection settings for a named tool/resource server. The connection
/// lifecycle itself is owned by the protocol collaborator, not this crate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub description: Option<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
}

/// Logger settings, consumed by the binary when installing a subscriber.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// Minimum level, as understood by the env-filter syntax.
    pub level: String,
    /// Echo agent exchanges to the console.
    pub show_chat: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        LoggerSettings {
            level: "warn".to_string(),
            show_chat: true,
        }
    }
}

/// Application settings: the file tier of parameter resolution plus the
/// process-wide execution engine switch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which execution engine backs bound callables. Read once at lifecycle
    /// startup; must not vary mid-run.
    pub execution_engine: EngineKind,

    /// Default model for agents, e.g. `haiku` or `openai.o3-mini.low`.
    pub default_model: Option<String>,

    /// File-tier request parameter overrides.
    pub default_request: RequestParams,

    /// Reject duplicate declarations instead of silently overwriting.
    pub strict_declarations: bool,

    pub logger: LoggerSettings,

    /// Named tool/resource servers agents may reference.
    pub servers: BTreeMap<String, ServerSettings>,
}

impl Settings {
    /// The file tier handed to parameter resolution. `default_model` feeds
    /// the model field unless `default_request` already sets one.
    pub fn file_request_params(&self) -> RequestParams {
        let mut params = self.default_request.clone();
        if params.model.is_none() {
            params.model = self.default_model.clone();
        }
        params
    }

    /// Load settings from a YAML file, overlaying the nearest secrets file.
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let load_err = |reason: String| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let mut value: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| load_err(e.to_string()))?;

        if let Some(secrets_path) = find_upwards(path.parent(), SECRETS_FILE_NAME) {
            let secrets = fs::read_to_string(&secrets_path)
                .map_err(|e| load_err(e.to_string()))
                .and_then(|s| serde_yaml::from_str(&s).map_err(|e| load_err(e.to_string())))?;
            value = deep_merge(value, secrets);
        }

        serde_yaml::from_value(value).map_err(|e| load_err(e.to_string()))
    }

    /// Find the config file in the working directory or its parents.
    pub fn find_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        find_upwards(Some(&cwd), CONFIG_FILE_NAME)
    }
}

fn find_upwards(start: Option<&Path>, file_name: &str) -> Option<PathBuf> {
    let mut dir = start?;
    loop {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Recursively merge `update` over `base`, key-wise for mappings.
fn deep_merge(base: serde_yaml::Value, update: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;
    match (base, update) {
        (Value::Mapping(mut base_map), Value::Mapping(update_map)) => {
            for (key, update_value) in update_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, update_value),
                    None => update_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, update) => update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.execution_engine, EngineKind::Cooperative);
        assert_eq!(settings.default_model, None);
        assert!(!settings.strict_declarations);
        assert_eq!(settings.logger.level, "warn");
    }

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
execution_engine: durable
default_model: sonnet
default_request:
  max_tokens: 2048
logger:
  level: debug
servers:
  fetch:
    command: uvx
    args: [mcp-server-fetch]
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.execution_engine, EngineKind::Durable);
        assert_eq!(settings.default_model.as_deref(), Some("sonnet"));
        assert_eq!(settings.default_request.max_tokens, Some(2048));
        assert_eq!(settings.servers["fetch"].command.as_deref(), Some("uvx"));
    }

    #[test]
    fn file_request_params_inherits_default_model() {
        let settings: Settings = serde_yaml::from_str("default_model: sonnet").unwrap();
        assert_eq!(
            settings.file_request_params().model.as_deref(),
            Some("sonnet")
        );

        let explicit: Settings =
            serde_yaml::from_str("default_model: sonnet\ndefault_request:\n  model: gpt-4o")
                .unwrap();
        assert_eq!(
            explicit.file_request_params().model.as_deref(),
            Some("gpt-4o")
        );
    }

    #[test]
    fn secrets_overlay_deep_merges() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &config_path,
            "default_model: haiku\nservers:\n  fetch:\n    command: uvx\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(SECRETS_FILE_NAME),
            "servers:\n  fetch:\n    api_key: sk-test\n",
        )
        .unwrap();

        let settings = Settings::load(&config_path).unwrap();
        assert_eq!(settings.default_model.as_deref(), Some("haiku"));
        // Both the main entry and the secret survive the merge.
        assert_eq!(settings.servers["fetch"].command.as_deref(), Some("uvx"));
        assert_eq!(settings.servers["fetch"].api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = Settings::load(Path::new("/nonexistent/ensemble.config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
