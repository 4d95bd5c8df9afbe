//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk, applying
//! environment overrides, and validating the result.
//!
//! # Configuration File Locations
//!
//! 1. Path given on the command line (must exist)
//! 2. Default location, used only if present:
//!    - **Linux/macOS:** `~/.klipper-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.klipper-mcp\config.json`
//!
//! Without a file, built-in defaults apply (`http://localhost:7125`).
//!
//! # Environment
//!
//! - `MOONRAKER_URL` overrides `moonraker.url`
//! - `MOONRAKER_TIMEOUT` overrides `moonraker.timeout_secs`

mod settings;

pub use settings::{
    Config, LoggingConfig, LogsConfig, MoonrakerConfig, ENV_MOONRAKER_TIMEOUT, ENV_MOONRAKER_URL,
};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.klipper-mcp/`
/// - **Windows:** `%USERPROFILE%\.klipper-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".klipper-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration, applies environment overrides and validates it.
///
/// If `path` is `None`, the default location is tried and built-in
/// defaults are used when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - An environment override is malformed
/// - Validation fails
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            read_config_file(p)?
        }
        None => match default_config_path().filter(|p| p.exists()) {
            Some(p) => read_config_file(&p)?,
            None => Config::default(),
        },
    };

    config.apply_env(|name| std::env::var(name).ok())?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Reads and deserialises a configuration file without overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
