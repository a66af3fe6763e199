//! Configuration management for Motorpool.

use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;

use crate::error::CoreError;

/// Environment variable overriding [`ApiConfig::base_url`].
pub const ENV_API_URL: &str = "MOTORPOOL_API_URL";
/// Environment variable overriding [`ApiConfig::timeout_ms`].
pub const ENV_TIMEOUT_MS: &str = "MOTORPOOL_TIMEOUT_MS";
/// Environment variable overriding [`LoggingConfig::format`].
pub const ENV_LOG_FORMAT: &str = "MOTORPOOL_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin the `api/<resource>` paths are resolved against.
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Append a `cacheBuster` timestamp to list requests.
    #[serde(default = "default_cache_buster")]
    pub cache_buster: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub reconcile: ReconcileMode,
}

/// How list consumers are kept consistent after a successful mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Re-issue the list fetch.
    #[default]
    Refetch,
    /// Patch the cached collection with the server's answer.
    LocalPatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(CoreError::Config(format!("unknown log format: {other}"))),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_cache_buster() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_ms: default_timeout_ms(),
                cache_buster: default_cache_buster(),
            },
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Apply `MOTORPOOL_*` environment overrides on top of this config.
    pub fn with_env_overrides(self) -> Result<Self, CoreError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.api.timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("{ENV_TIMEOUT_MS} is not a number: {raw}")))?;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = raw.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the store cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(CoreError::Config("api.base_url must not be empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "api.base_url must be an http(s) origin: {base}"
            )));
        }
        if self.api.timeout_ms == 0 {
            return Err(CoreError::Config("api.timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
