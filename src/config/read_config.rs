//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{Config, S3Settings, SyncSettings};

// =============================================================================
// Constants - Default Values
// =============================================================================

/// Object key the upload log is written to unless configured otherwise.
pub const DEFAULT_LOG_OBJECT_KEY: &str = "upload_log.txt";
/// Data-file extensions that are never uploaded unless configured otherwise.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &str = ".csv,.xlsx,.xls,.parquet";
const DEFAULT_CLEAR_NOTEBOOKS: bool = true;

const ENV_CONFIG_FILE: &str = "ARTIFACT_SYNC_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".artifactsyncconfig";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid boolean '{value}' for key '{key}'")]
    InvalidBoolean { key: String, value: String },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to ARTIFACT_SYNC_CONFIG_FILE env var, then ~/.artifactsyncconfig.
    pub config_file: Option<PathBuf>,

    /// Additional override config file (layered on top of base config).
    pub override_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "sync.log_object_key", "s3.region"
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Value Parsing
// =============================================================================

fn parse_bool_value(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a comma-separated list, dropping empty items.
fn parse_comma_separated(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_log_object_key(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "log object key must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

/// Treat empty strings as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
struct ResolvedConfigFile {
    /// The path to the config file, if one was found.
    path: Option<PathBuf>,
    /// Warning message if env var pointed to nonexistent file.
    warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        }
        return Err(ConfigError::FileNotFound(path.clone()));
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        }
        // Warn but continue with defaults
        return Ok(ResolvedConfigFile {
            path: None,
            warning: Some(format!(
                "config file specified by {} does not exist: {}",
                ENV_CONFIG_FILE, env_path
            )),
        });
    }

    if let Some(home) = env::var_os("HOME").map(PathBuf::from) {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
pub fn default_config() -> Config {
    Config {
        sync: SyncSettings {
            log_object_key: DEFAULT_LOG_OBJECT_KEY.to_string(),
            excluded_extensions: parse_comma_separated(DEFAULT_EXCLUDED_EXTENSIONS),
            clear_notebooks: DEFAULT_CLEAR_NOTEBOOKS,
        },
        s3: S3Settings::default(),
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

/// Apply an INI file's contents to a Config, layering on top of existing values.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    // [sync] section
    if let Some(key) = ini.get("sync", "log_object_key") {
        config.sync.log_object_key = parse_log_object_key("sync.log_object_key", &key)?;
    }
    if let Some(extensions) = ini.get("sync", "excluded_extensions") {
        config.sync.excluded_extensions = parse_comma_separated(&extensions);
    }
    if let Some(value) = ini.get("sync", "clear_notebooks") {
        config.sync.clear_notebooks = parse_bool_value("sync.clear_notebooks", &value)?;
    }

    // [s3] section
    if let Some(endpoint_url) = non_empty(ini.get("s3", "endpoint_url")) {
        config.s3.endpoint_url = Some(endpoint_url);
    }
    if let Some(region) = non_empty(ini.get("s3", "region")) {
        config.s3.region = Some(region);
    }

    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Override Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.splitn(2, '.').collect();

    match parts.as_slice() {
        ["sync", param] => apply_sync_override(config, param, value),
        ["s3", param] => apply_s3_override(config, param, value),
        _ => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

fn apply_sync_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "log_object_key" => {
            config.sync.log_object_key = parse_log_object_key("sync.log_object_key", value)?;
            Ok(())
        }
        "excluded_extensions" => {
            config.sync.excluded_extensions = parse_comma_separated(value);
            Ok(())
        }
        "clear_notebooks" => {
            config.sync.clear_notebooks = parse_bool_value("sync.clear_notebooks", value)?;
            Ok(())
        }
        _ => Err(ConfigError::InvalidOverrideKey {
            key: format!("sync.{}", param),
            message: "unknown parameter".to_string(),
        }),
    }
}

fn apply_s3_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "endpoint_url" => {
            config.s3.endpoint_url = non_empty(Some(value.to_string()));
            Ok(())
        }
        "region" => {
            config.s3.region = non_empty(Some(value.to_string()));
            Ok(())
        }
        _ => Err(ConfigError::InvalidOverrideKey {
            key: format!("s3.{}", param),
            message: "unknown parameter".to_string(),
        }),
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Base config file (from CLI, env var, or ~/.artifactsyncconfig)
/// 3. Override config file (if specified)
/// 4. Individual overrides (applied last)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut warnings = Vec::new();
    let mut config = default_config();

    let resolved = resolve_config_file(source)?;
    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    if let Some(ref override_path) = source.override_file {
        if !override_path.exists() {
            return Err(ConfigError::FileNotFound(override_path.clone()));
        }
        let ini = load_ini(override_path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================
