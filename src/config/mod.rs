//! Configuration module
//!
//! Handles loading and managing runner configuration.

mod env;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::executor::{Filter, DEFAULT_TIMEOUT_MS};
use crate::output::OutputFormat;
use crate::utils::LogLevel;

/// Config file locations searched in order
const CONFIG_SEARCH_PATHS: &[&str] = &["./swat.yaml", "./.swat.yaml", "~/.config/swat/config.yaml"];

/// Runner configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Timeout applied to every hook, test and middleware step
    pub default_timeout_ms: u64,

    /// Entries matching this are recorded as SKIP
    pub skip_pattern: String,

    /// Entries not matching this are recorded as SKIP
    pub only_pattern: String,

    pub colorize: bool,

    /// Report format (spec, json, json-pretty, csv, summary)
    pub format: String,

    pub log_level: LogLevel,

    /// Install the timer middleware
    pub timer: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            skip_pattern: "(?i)^skip-".to_string(),
            only_pattern: ".*".to_string(),
            colorize: true,
            format: "spec".to_string(),
            log_level: LogLevel::Info,
            timer: true,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// First existing config file in the search paths
    pub fn discover() -> Option<PathBuf> {
        CONFIG_SEARCH_PATHS
            .iter()
            .map(|p| expand_path(p))
            .find(|p| p.is_file())
    }

    /// Load the discovered config file, or defaults when none exists
    pub fn load_or_default() -> Result<Self> {
        match Self::discover() {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from `SWAT_*` environment variables
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if let Some(timeout) = env.timeout {
            self.default_timeout_ms = timeout;
        }
        if let Some(skip) = &env.skip {
            self.skip_pattern = skip.clone();
        }
        if let Some(only) = &env.only {
            self.only_pattern = only.clone();
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if env.no_color == Some(true) {
            self.colorize = false;
        }
        if let Some(level) = env.log_level.as_deref().and_then(LogLevel::from_str) {
            self.log_level = level;
        }
        self
    }

    /// Compile the skip / only patterns
    pub fn filter(&self) -> Result<Filter> {
        Filter::new(Some(&self.skip_pattern), Some(&self.only_pattern))
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.format)
            .with_context(|| format!("Unknown output format: {}", self.format))
    }
}

/// Default location used by `swat config init`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("swat").join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("swat.yaml"))
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.default_timeout_ms, 5000);
        assert!(config.timer);
        assert_eq!(config.output_format().unwrap(), OutputFormat::Spec);
    }

    #[test]
    fn test_default_filter_matches_builtin_rules() {
        let filter = RunnerConfig::default().filter().unwrap();
        assert!(!filter.allows("Skip-me"));
        assert!(filter.allows("anything else"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("swat.yaml");
        let config = RunnerConfig {
            default_timeout_ms: 250,
            only_pattern: "^api".to_string(),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(RunnerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swat.json");
        std::fs::write(&path, r#"{ "format": "csv", "log_level": "debug" }"#).unwrap();

        let config = RunnerConfig::load(&path).unwrap();
        assert_eq!(config.format, "csv");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.default_timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_merge_env() {
        let env = EnvConfig {
            timeout: Some(42),
            only: Some("^ui".to_string()),
            no_color: Some(true),
            log_level: Some("warn".to_string()),
            ..Default::default()
        };
        let config = RunnerConfig::default().merge_env(&env);

        assert_eq!(config.default_timeout_ms, 42);
        assert_eq!(config.only_pattern, "^ui");
        assert!(!config.colorize);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_format() {
        let config = RunnerConfig {
            format: "xml".to_string(),
            ..Default::default()
        };
        assert!(config.output_format().is_err());
    }
}
