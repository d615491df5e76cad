//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SWAT";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Timeout in milliseconds from SWAT_TIMEOUT
    pub timeout: Option<u64>,
    /// Skip pattern from SWAT_SKIP
    pub skip: Option<String>,
    /// Only pattern from SWAT_ONLY
    pub only: Option<String>,
    /// Output format from SWAT_FORMAT
    pub format: Option<String>,
    /// Disable colors from SWAT_NO_COLOR
    pub no_color: Option<bool>,
    /// Log level from SWAT_LOG
    pub log_level: Option<String>,
    /// Config file from SWAT_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            timeout: get_env_parse("TIMEOUT"),
            skip: get_env("SKIP"),
            only: get_env("ONLY"),
            format: get_env("FORMAT"),
            no_color: get_env_bool("NO_COLOR"),
            log_level: get_env("LOG"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.timeout.is_some()
            || self.skip.is_some()
            || self.only.is_some()
            || self.format.is_some()
            || self.no_color.is_some()
            || self.log_level.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_TIMEOUT:   {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_SKIP:      {:?}", ENV_PREFIX, self.skip);
        println!("  {}_ONLY:      {:?}", ENV_PREFIX, self.only);
        println!("  {}_FORMAT:    {:?}", ENV_PREFIX, self.format);
        println!("  {}_NO_COLOR:  {:?}", ENV_PREFIX, self.no_color);
        println!("  {}_LOG:       {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_CONFIG:    {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
#[derive(Default)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn var(mut self, name: &str, value: String) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value));
        self
    }

    pub fn timeout(self, timeout_ms: u64) -> Self {
        self.var("TIMEOUT", timeout_ms.to_string())
    }

    pub fn skip(self, pattern: impl Into<String>) -> Self {
        self.var("SKIP", pattern.into())
    }

    pub fn only(self, pattern: impl Into<String>) -> Self {
        self.var("ONLY", pattern.into())
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.var("FORMAT", format.into())
    }

    pub fn no_color(self, no_color: bool) -> Self {
        self.var("NO_COLOR", no_color.to_string())
    }

    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.var("LOG", level.into())
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all SWAT environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_TIMEOUT     Default timeout in milliseconds");
    println!("  {ENV_PREFIX}_SKIP        Regex of entry names to skip");
    println!("  {ENV_PREFIX}_ONLY        Regex of entry names to run");
    println!("  {ENV_PREFIX}_FORMAT      Output format (spec, json, json-pretty, csv, summary)");
    println!("  {ENV_PREFIX}_NO_COLOR    Disable colored output (true/false)");
    println!("  {ENV_PREFIX}_LOG         Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_ONLY='^basic'");
    println!("  swat run --format summary");
}
