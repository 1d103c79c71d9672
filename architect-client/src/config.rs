//! Client configuration.
//!
//! Resolution order, lowest to highest: built-in defaults, the TOML file,
//! `ARCHITECT_*` environment variables. Front ends may override individual
//! fields from their own flags after loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use architect_core::AlignmentPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "portfolio-architect";

const ENV_API_URL: &str = "ARCHITECT_API_URL";
const ENV_TIMEOUT_SECS: &str = "ARCHITECT_TIMEOUT_SECS";
const ENV_PRESETS_DIR: &str = "ARCHITECT_PRESETS_DIR";
const ENV_LOG_LEVEL: &str = "ARCHITECT_LOG_LEVEL";
const ENV_ALIGNMENT: &str = "ARCHITECT_ALIGNMENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the optimization service.
    pub api_url: String,
    /// Request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Where presets are stored. `None` uses the platform config directory.
    pub presets_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub alignment: AlignmentPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
            presets_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            alignment: AlignmentPolicy::Lenient,
        }
    }
}

impl ClientConfig {
    /// Load from `path` if given, else from the default config file when it
    /// exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_file().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `ARCHITECT_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("timeout_secs", &raw, e.to_string()))?;
            self.timeout_secs = Some(secs);
        }
        if let Some(dir) = lookup(ENV_PRESETS_DIR) {
            self.presets_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(raw) = lookup(ENV_ALIGNMENT) {
            self.alignment = raw
                .parse()
                .map_err(|reason: String| ConfigError::invalid("alignment", &raw, reason))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "api_url",
                &self.api_url,
                "must start with http:// or https://",
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "timeout_secs",
                "0",
                "must be positive; omit it to disable the timeout",
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::invalid("log_level", "", "must not be empty"));
        }
        Ok(())
    }

    /// Full URL of the optimize endpoint.
    pub fn optimize_url(&self) -> String {
        format!("{}/api/optimize", self.api_url.trim().trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn resolved_presets_dir(&self) -> PathBuf {
        self.presets_dir.clone().unwrap_or_else(default_presets_dir)
    }
}

/// `<config dir>/portfolio-architect/config.toml`, if the platform has a config dir.
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

pub fn default_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Directory for log files and other local state.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
