//! Configuration management for the Devin CLI
//!
//! Settings are read from `config.yaml` in the CLI's configuration directory
//! (`~/.config/devin-cli/` by default, or `DEVIN_CLI_CONFIG_DIR`). A missing
//! file means built-in defaults. After the file is applied, `DEVIN_API_URL`
//! overrides the API base URL.
//!
//! ## Environment Variable Expansion
//!
//! The config file supports environment variable expansion with the following syntax:
//! - `${VAR}` - Simple substitution
//! - `${VAR:-default}` - Use default if VAR is unset or empty
//! - `${VAR-default}` - Use default if VAR is unset
//! - `${VAR:+alt}` - Use alt if VAR is set and non-empty
//! - `${VAR+alt}` - Use alt if VAR is set

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use std::{env, fs, path::PathBuf};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VALIDATE_TIMEOUT_SECS, DEVIN_API_URL_ENV,
    DEVIN_CONFIG_DIR_ENV, TOKEN_FILE_NAME,
};

/// CLI settings loaded from `config.yaml`
///
/// # Example
///
/// ```yaml
/// apiUrl: ${DEVIN_API_URL:-https://api.devin.ai/v1}
/// requestTimeoutSecs: 30
/// validateTimeoutSecs: 10
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    #[serde(flatten)]
    pub api: ApiConfig,
}

/// Connection settings for the remote session API
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Base URL; `/sessions` is appended for session calls
    pub api_url: String,
    /// Upper bound for a session-creation call
    pub request_timeout_secs: u64,
    /// Upper bound for a credential validation call
    pub validate_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            validate_timeout_secs: DEFAULT_VALIDATE_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(self.validate_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Reject settings that would make a call hang forever or go nowhere
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("apiUrl must not be empty");
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            anyhow::bail!("apiUrl must be an http(s) URL, got '{}'", self.api_url);
        }
        if self.request_timeout_secs == 0
            || self.validate_timeout_secs == 0
            || self.connect_timeout_secs == 0
        {
            anyhow::bail!("timeouts must be at least one second");
        }
        Ok(())
    }
}

/// Directory holding `config.yaml` and the credential file
pub fn config_dir() -> PathBuf {
    env::var(DEVIN_CONFIG_DIR_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push(CONFIG_DIR_NAME);
            p
        })
}

pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

pub fn token_file_path() -> PathBuf {
    config_dir().join(TOKEN_FILE_NAME)
}

/// Load settings from the default location, then apply `DEVIN_API_URL`
pub fn load_config() -> anyhow::Result<CliConfig> {
    let mut cfg = load_config_from(&config_file_path())?;
    if let Ok(url) = env::var(DEVIN_API_URL_ENV) {
        if !url.trim().is_empty() {
            cfg.api.api_url = url.trim().to_string();
        }
    }
    cfg.api.validate()?;
    Ok(cfg)
}

/// Load settings from `path`; a missing file yields defaults
pub fn load_config_from(path: &Path) -> anyhow::Result<CliConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(CliConfig::default());
    }
    let data = preprocess_config(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    if data.trim().is_empty() {
        return Ok(CliConfig::default());
    }
    let cfg: CliConfig = serde_yaml::from_str(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

pub fn expand_env_placeholders(input: &str) -> anyhow::Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?[-+])([^}]*))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let op = caps.get(2).map_or("", |m| m.as_str());
        let val = caps.get(3).map_or("", |m| m.as_str());
        let var = env::var(var_name).ok();

        match (var.as_deref(), op) {
            (Some(v), "") => v.to_string(),                      // ${VAR}
            (Some(v), ":-") if !v.is_empty() => v.to_string(),   // ${VAR:-default}
            (_, ":-") => val.to_string(),
            (Some(v), "-") => v.to_string(),                     // ${VAR-default}
            (None, "-") => val.to_string(),
            (Some(v), ":+") if !v.is_empty() => val.to_string(), // ${VAR:+alt}
            (Some(_), "+") => val.to_string(),                   // ${VAR+alt}
            _ => String::new(),
        }
    });
    Ok(expanded.into_owned())
}

pub fn preprocess_config(path: &Path) -> anyhow::Result<String> {
    let raw_data = fs::read_to_string(path)?;
    expand_env_placeholders(&raw_data)
}
