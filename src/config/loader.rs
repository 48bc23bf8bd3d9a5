//! Configuration file parsing (JSON, or TOML by extension).
use std::path::Path;

use super::value::ConfigValue;
use crate::error::ConfigError;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Load a configuration file into a [`ConfigValue`].
///
/// Files ending in `.toml` are parsed as TOML; everything else as JSON.
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] if `path` does not exist,
/// [`ConfigError::Io`] if it cannot be read, and
/// [`ConfigError::InvalidSyntax`] if it cannot be parsed.
pub fn load(path: &Path) -> Result<ConfigValue, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let parsed = if is_toml {
        parse_toml(&content)
    } else {
        parse_json(&content)
    };
    parsed.map_err(|message| ConfigError::InvalidSyntax {
        file: path.display().to_string(),
        message,
    })
}

/// Parse JSON text into a [`ConfigValue`].
///
/// # Errors
///
/// Returns the parser diagnostic if `content` is not valid JSON.
pub fn parse_json(content: &str) -> Result<ConfigValue, String> {
    serde_json::from_str(content).map_err(|e| e.to_string())
}

/// Parse TOML text into a [`ConfigValue`].
///
/// # Errors
///
/// Returns the parser diagnostic if `content` is not valid TOML.
pub fn parse_toml(content: &str) -> Result<ConfigValue, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}
