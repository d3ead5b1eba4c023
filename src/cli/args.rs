//! Command-line argument definitions and helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::ConfigSource;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during argument processing.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// I/O error writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The action is neither `upload` nor `download`.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for argument operations.
pub type Result<T> = std::result::Result<T, ArgsError>;

// =============================================================================
// Global Arguments
// =============================================================================

/// Global arguments that apply to every action.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the main configuration file.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Path to the configuration overrides file.
    #[arg(long = "config-file-overrides", global = true)]
    pub config_file_overrides: Option<PathBuf>,

    /// Configuration overrides in the form name=value.
    #[arg(long = "config", value_parser = parse_config_override, global = true)]
    pub config_overrides: Vec<(String, String)>,

    /// Format output as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Convert to a ConfigSource for reading configuration.
    pub fn to_config_source(&self) -> ConfigSource {
        ConfigSource {
            config_file: self.config_file.clone(),
            override_file: self.config_file_overrides.clone(),
            overrides: self.config_overrides.clone(),
        }
    }
}

/// Parse a config override from "name=value" format.
fn parse_config_override(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid config override '{}': expected name=value", s))?;
    Ok((name.to_string(), value.to_string()))
}

// =============================================================================
// Positional Arguments
// =============================================================================

/// The five positional arguments of a run.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// `upload` or `download`.
    pub action: String,

    /// Operator name recorded in the upload log.
    pub username: String,

    /// Directory to upload from or download into.
    pub local_directory: PathBuf,

    /// Target bucket.
    pub bucket: String,

    /// Key prefix objects live under.
    pub key_prefix: String,
}

/// What a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Download,
}

impl FromStr for Action {
    type Err = ArgsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upload" => Ok(Action::Upload),
            "download" => Ok(Action::Download),
            other => Err(ArgsError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upload => write!(f, "upload"),
            Action::Download => write!(f, "download"),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Write a line to stdout.
pub async fn write_str(value: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(value.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/// Write a value to stdout, as pretty JSON if `json` is set and through
/// `Display` otherwise.
pub async fn write<T: serde::Serialize + fmt::Display>(value: &T, json: bool) -> Result<()> {
    let output = if json {
        serde_json::to_string_pretty(value)?
    } else {
        value.to_string()
    };
    write_str(&output).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_override() {
        assert_eq!(
            parse_config_override("sync.log_object_key=a=b").unwrap(),
            ("sync.log_object_key".to_string(), "a=b".to_string())
        );
        assert!(parse_config_override("no-equals").is_err());
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("upload".parse::<Action>().unwrap(), Action::Upload);
        assert_eq!("download".parse::<Action>().unwrap(), Action::Download);
        assert!(matches!(
            "Upload".parse::<Action>(),
            Err(ArgsError::UnknownAction(_))
        ));
        assert_eq!(Action::Download.to_string(), "download");
    }

    #[test]
    fn test_to_config_source() {
        let global = GlobalArgs {
            config_file: Some(PathBuf::from("/etc/sync.ini")),
            config_overrides: vec![("s3.region".to_string(), "us-west-2".to_string())],
            ..Default::default()
        };
        let source = global.to_config_source();
        assert_eq!(source.config_file, Some(PathBuf::from("/etc/sync.ini")));
        assert!(source.override_file.is_none());
        assert_eq!(source.overrides.len(), 1);
    }
}
