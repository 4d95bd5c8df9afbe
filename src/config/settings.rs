//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable overriding [`MoonrakerConfig::url`].
pub const ENV_MOONRAKER_URL: &str = "MOONRAKER_URL";

/// Environment variable overriding [`MoonrakerConfig::timeout_secs`].
pub const ENV_MOONRAKER_TIMEOUT: &str = "MOONRAKER_TIMEOUT";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Moonraker connection settings.
    #[serde(default)]
    pub moonraker: MoonrakerConfig,

    /// Log-reading settings.
    #[serde(default)]
    pub logs: LogsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Applies environment overrides, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_MOONRAKER_URL).filter(|v| !v.trim().is_empty()) {
            self.moonraker.url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_MOONRAKER_TIMEOUT) {
            self.moonraker.timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_MOONRAKER_TIMEOUT,
                    value: raw.clone(),
                })?;
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.moonraker.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid Moonraker URL '{url}'. Must start with http:// or https://"
                ),
            });
        }

        if self.moonraker.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "moonraker.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.logs.default_lines == 0 {
            return Err(ConfigError::ValidationError {
                message: "logs.default_lines must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Moonraker connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoonrakerConfig {
    /// Base URL of the Moonraker API.
    /// Default: `http://localhost:7125`
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MoonrakerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:7125".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

/// Log-reading configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogsConfig {
    /// Lines returned by `read_log` when the caller doesn't say.
    #[serde(default = "default_lines")]
    pub default_lines: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            default_lines: default_lines(),
        }
    }
}

const fn default_lines() -> usize {
    100
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
