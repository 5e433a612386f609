// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Request parameter precedence.
//!
//! Parameters overlay across four tiers: baseline defaults, the loaded
//! config file, command-line overrides, and call-site declarations. For each
//! field the first value found scanning call site -> CLI -> file -> baseline
//! wins. [`resolve`] is a pure function of its four inputs; no global state
//! leaks between resolutions for different nodes.

use serde::{Deserialize, Serialize};

use crate::config::consts::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_USE_HISTORY};
use crate::config::model_spec::ModelSpec;
use crate::errors::ConfigError;

/// One tier of request parameters. Unset fields defer to lower tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    pub model: Option<String>,
    pub use_history: Option<bool>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl RequestParams {
    /// The lowest-precedence tier: built-in defaults.
    pub fn baseline() -> Self {
        RequestParams {
            model: Some(DEFAULT_MODEL.to_string()),
            use_history: Some(DEFAULT_USE_HISTORY),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: None,
        }
    }
}

/// The effective parameter set for one node, immutable once resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    /// Parsed model specifier.
    pub model: ModelSpec,
    /// The winning model string before parsing, kept for diagnostics.
    pub model_string: String,
    pub use_history: bool,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

fn pick<T: Clone>(
    call_site: &Option<T>,
    cli: &Option<T>,
    file: &Option<T>,
    baseline: &Option<T>,
) -> Option<T> {
    call_site
        .as_ref()
        .or(cli.as_ref())
        .or(file.as_ref())
        .or(baseline.as_ref())
        .cloned()
}

/// Merge the four tiers into one effective parameter set.
///
/// The model string is parsed into a [`ModelSpec`]; a malformed specifier is
/// a configuration error, never a silently substituted value.
pub fn resolve(
    baseline: &RequestParams,
    file: &RequestParams,
    cli: &RequestParams,
    call_site: &RequestParams,
) -> Result<ResolvedParams, ConfigError> {
    let model_string = pick(&call_site.model, &cli.model, &file.model, &baseline.model)
        .ok_or(ConfigError::MissingModel)?;
    let model = ModelSpec::parse(&model_string)?;

    Ok(ResolvedParams {
        model,
        model_string,
        use_history: pick(
            &call_site.use_history,
            &cli.use_history,
            &file.use_history,
            &baseline.use_history,
        )
        .unwrap_or(DEFAULT_USE_HISTORY),
        max_tokens: pick(
            &call_site.max_tokens,
            &cli.max_tokens,
            &file.max_tokens,
            &baseline.max_tokens,
        )
        .unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: pick(
            &call_site.temperature,
            &cli.temperature,
            &file.temperature,
            &baseline.temperature,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_model(model: &str) -> RequestParams {
        RequestParams {
            model: Some(model.to_string()),
            ..RequestParams::default()
        }
    }

    #[test]
    fn call_site_wins_over_all_tiers() {
        let baseline = RequestParams {
            model: Some("haiku".to_string()),
            use_history: Some(true),
            ..RequestParams::default()
        };
        let file = with_model("sonnet");
        let cli = RequestParams::default();
        let call_site = with_model("gpt-4o");

        let resolved = resolve(&baseline, &file, &cli, &call_site).unwrap();
        assert_eq!(resolved.model_string, "gpt-4o");
        assert!(resolved.use_history);
    }

    #[test]
    fn file_tier_fills_when_call_site_is_unset() {
        let baseline = RequestParams {
            model: Some("haiku".to_string()),
            use_history: Some(true),
            ..RequestParams::default()
        };
        let file = with_model("sonnet");

        let resolved = resolve(
            &baseline,
            &file,
            &RequestParams::default(),
            &RequestParams::default(),
        )
        .unwrap();
        assert_eq!(resolved.model_string, "sonnet");
    }

    #[test]
    fn cli_wins_over_file() {
        let resolved = resolve(
            &RequestParams::baseline(),
            &with_model("sonnet"),
            &with_model("o3-mini"),
            &RequestParams::default(),
        )
        .unwrap();
        assert_eq!(resolved.model_string, "o3-mini");
    }

    #[test]
    fn baseline_fills_everything_else() {
        let resolved = resolve(
            &RequestParams::baseline(),
            &RequestParams::default(),
            &RequestParams::default(),
            &RequestParams::default(),
        )
        .unwrap();
        assert_eq!(resolved.model_string, "haiku");
        assert!(resolved.use_history);
        assert_eq!(resolved.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(resolved.temperature, None);
    }

    #[test]
    fn malformed_model_is_an_error_not_a_fallback() {
        let err = resolve(
            &RequestParams::baseline(),
            &RequestParams::default(),
            &RequestParams::default(),
            &with_model("nonsense-model"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidModelSpec { .. }));
    }

    #[test]
    fn no_model_anywhere_is_an_error() {
        let empty = RequestParams::default();
        let err = resolve(&empty, &empty, &empty, &empty).unwrap_err();
        assert_eq!(err, ConfigError::MissingModel);
    }

    #[test]
    fn resolution_is_pure() {
        let baseline = RequestParams::baseline();
        let file = with_model("sonnet");
        let cli = RequestParams::default();
        let call_site = with_model("gpt-4o");

        let first = resolve(&baseline, &file, &cli, &call_site).unwrap();
        let second = resolve(&baseline, &file, &cli, &call_site).unwrap();
        assert_eq!(first, second);

        // A different node's resolution is unaffected by the previous one.
        let other = resolve(&baseline, &file, &cli, &RequestParams::default()).unwrap();
        assert_eq!(other.model_string, "sonnet");
    }
}
