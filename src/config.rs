//! Pipeline configuration.
//!
//! Settings come from an optional JSON file, then environment overrides,
//! then CLI flags. The result is built once per process and handed to the
//! client by reference.
use crate::service::ModelSettings;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MODEL_ENV: &str = "OPENAI_MODEL";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const DEFAULT_MODEL: &str = "gpt-5";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

const VERBOSITY_LEVELS: [&str; 3] = ["low", "medium", "high"];
const REASONING_EFFORTS: [&str; 4] = ["minimal", "low", "medium", "high"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub model: String,
    pub base_url: String,
    /// Replacement input schema; the embedded one is used when unset.
    pub input_schema: Option<PathBuf>,
    /// Replacement output schema; the embedded one is used when unset.
    pub output_schema: Option<PathBuf>,
    pub verbosity: String,
    pub reasoning_effort: String,
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            input_schema: None,
            output_schema: None,
            verbosity: "low".to_string(),
            reasoning_effort: "medium".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model.clone(),
            verbosity: self.verbosity.clone(),
            reasoning_effort: self.reasoning_effort.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load the config file, or defaults when no path is given.
///
/// Relative schema paths are resolved against the config file's directory.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let mut config: PipelineConfig =
        serde_json::from_slice(&bytes).context("parse pipeline config JSON")?;
    if let Some(base) = path.parent() {
        config.input_schema = config.input_schema.map(|rel| base.join(rel));
        config.output_schema = config.output_schema.map(|rel| base.join(rel));
    }
    Ok(config)
}

/// Apply `OPENAI_MODEL` / `OPENAI_BASE_URL` style overrides from `lookup`.
pub fn apply_env_overrides<F>(config: &mut PipelineConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let set = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    if let Some(model) = set(MODEL_ENV) {
        config.model = model;
    }
    if let Some(base_url) = set(BASE_URL_ENV) {
        config.base_url = base_url;
    }
}

pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.model.trim().is_empty() {
        return Err(anyhow!("model must be non-empty"));
    }
    if config.base_url.trim().is_empty() {
        return Err(anyhow!("base_url must be non-empty"));
    }
    if !VERBOSITY_LEVELS.contains(&config.verbosity.as_str()) {
        return Err(anyhow!(
            "verbosity must be one of {} (got {:?})",
            VERBOSITY_LEVELS.join("|"),
            config.verbosity
        ));
    }
    if !REASONING_EFFORTS.contains(&config.reasoning_effort.as_str()) {
        return Err(anyhow!(
            "reasoning_effort must be one of {} (got {:?})",
            REASONING_EFFORTS.join("|"),
            config.reasoning_effort
        ));
    }
    if config.timeout_secs == 0 {
        return Err(anyhow!("timeout_secs must be greater than zero"));
    }
    Ok(())
}
