//! Endpoint configuration: defaults, optional TOML file, environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
pub const DEFAULT_PREDICT_PATH: &str = "/predict";
/// Looked up in the working directory unless `CLASSIFIER_CONFIG` names another file.
pub const CONFIG_FILE: &str = "classifier.toml";

pub const ENV_CONFIG: &str = "CLASSIFIER_CONFIG";
pub const ENV_API_BASE: &str = "CLASSIFIER_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "CLASSIFIER_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scheme, host and port of the prediction service.
    pub api_base: String,
    pub predict_path: String,
    /// Client-side request timeout; `None` or `0` means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            predict_path: DEFAULT_PREDICT_PATH.into(),
            timeout_secs: None,
        }
    }
}

/// Loads settings from the process environment and the default config file.
pub fn load_settings() -> Result<Settings> {
    Settings::load(|key| std::env::var(key).ok())
}

impl Settings {
    /// Resolves settings using `env` for variable lookups.
    ///
    /// A missing default config file is fine; a missing file named through
    /// `CLASSIFIER_CONFIG` is an error.
    pub fn load(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let explicit = non_empty(env(ENV_CONFIG));
        let path = explicit
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut settings = if path.is_file() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            anyhow::bail!("Config file does not exist: {}", path.display());
        } else {
            Self::default()
        };
        settings.apply_env(env)?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Applies `CLASSIFIER_API_BASE` and `CLASSIFIER_TIMEOUT_SECS`; empty values are ignored.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base) = non_empty(env(ENV_API_BASE)) {
            self.api_base = base;
        }
        if let Some(raw) = non_empty(env(ENV_TIMEOUT_SECS)) {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} is not a number of seconds: {raw}"))?;
            self.timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Full URL of the prediction endpoint.
    pub fn predict_url(&self) -> String {
        let base = self.api_base.trim().trim_end_matches('/');
        let path = self.predict_path.trim().trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
