//! Command-line interface for artifact-sync.

pub mod args;

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, ConfigError, ConfigResult, read_config};
use crate::notebook::clear_outputs_in_directory;
use crate::storage::{ObjectStore, S3ObjectStore, S3ObjectStoreConfig};
use crate::sync::{DownloadSummary, SyncClient, SyncConfig, SyncError, UploadSummary};

pub use args::{Action, GlobalArgs, SyncArgs};

/// Printed when the positional arguments are wrong.
pub const USAGE: &str =
    "Usage: artifact-sync <action> <username> <local_directory> <bucket> <key_prefix>";

/// Printed when the action is neither `upload` nor `download`.
pub const INVALID_ACTION_MESSAGE: &str = "Invalid action. Use 'upload' or 'download'.";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Wrong number of positional arguments. Displays the usage line.
    #[error("{0}")]
    Usage(String),

    /// Arguments clap rejected for another reason, such as a malformed
    /// `--config` value.
    #[error("{0}")]
    InvalidArguments(String),

    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Upload or download error.
    #[error("{0}")]
    Sync(#[from] SyncError),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// artifact-sync - Upload a directory to S3 or download a prefix from it.
#[derive(Parser, Debug)]
#[command(name = "artifact-sync", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub sync: SyncArgs,
}

/// Parse arguments, including the program name.
///
/// A wrong number of positional arguments becomes [`CliError::Usage`].
/// `--help` and `--version` print and exit the process.
pub fn parse_args_from<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        ErrorKind::MissingRequiredArgument
        | ErrorKind::UnknownArgument
        | ErrorKind::TooManyValues
        | ErrorKind::WrongNumberOfValues => CliError::Usage(USAGE.to_string()),
        _ => CliError::InvalidArguments(e.to_string().trim_end().to_string()),
    })
}

// =============================================================================
// Run Summary
// =============================================================================

/// What a completed run did, printed after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RunSummary {
    Upload {
        notebooks_cleared: usize,
        summary: UploadSummary,
    },
    Download(DownloadSummary),
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunSummary::Upload {
                notebooks_cleared,
                summary,
            } => write!(
                f,
                "Uploaded {} files ({} bytes), cleared {} notebooks",
                summary.uploaded_keys.len(),
                summary.bytes_uploaded,
                notebooks_cleared
            ),
            RunSummary::Download(summary) => write!(
                f,
                "Downloaded {} files, skipped {} keys",
                summary.downloaded.len(),
                summary.skipped.len()
            ),
        }
    }
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments from the process environment.
    pub fn parse_args() -> Result<Self> {
        parse_args_from(std::env::args_os())
    }

    /// Run the selected action against S3.
    ///
    /// An unknown action prints a message and succeeds without reading
    /// configuration or touching storage.
    pub async fn run(self) -> Result<()> {
        let Ok(action) = self.sync.action.parse::<Action>() else {
            args::write_str(INVALID_ACTION_MESSAGE).await?;
            return Ok(());
        };

        let ConfigResult { config, warnings } = read_config(&self.global.to_config_source())?;
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        let store = S3ObjectStore::new(S3ObjectStoreConfig {
            endpoint_url: config.s3.endpoint_url.clone(),
            region: config.s3.region.clone(),
        })
        .await;

        let summary = self.execute(action, &config, Arc::new(store)).await?;
        args::write(&summary, self.global.json).await?;
        Ok(())
    }

    /// Run `action` with an already loaded configuration and store.
    pub async fn execute(
        &self,
        action: Action,
        config: &Config,
        store: Arc<dyn ObjectStore>,
    ) -> Result<RunSummary> {
        let args = &self.sync;
        let sync_config =
            SyncConfig::from_config(config, &args.username, &args.bucket, &args.key_prefix);
        let client = SyncClient::new(sync_config, store);

        match action {
            Action::Upload => {
                let notebooks_cleared = if config.sync.clear_notebooks {
                    clear_outputs_in_directory(&args.local_directory)
                        .await
                        .map_err(SyncError::from)?
                } else {
                    0
                };
                let summary = client.upload_directory(&args.local_directory).await?;
                Ok(RunSummary::Upload {
                    notebooks_cleared,
                    summary,
                })
            }
            Action::Download => {
                let summary = client
                    .download_directory(&args.bucket, &args.key_prefix, &args.local_directory)
                    .await?;
                Ok(RunSummary::Download(summary))
            }
        }
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args()?;
    cli.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use crate::storage::MemoryObjectStore;
    use serde_json::{Value, json};
    use std::path::Path;
    use tempfile::TempDir;

    fn cli_for(action: &str, dir: &Path, prefix: &str) -> Cli {
        parse_args_from([
            "artifact-sync",
            action,
            "alice",
            dir.to_str().unwrap(),
            "artifacts",
            prefix,
        ])
        .unwrap()
    }

    fn notebook_json() -> Value {
        json!({
            "cells": [
                {"cell_type": "code", "execution_count": 3, "outputs": [{"text": "hi"}], "source": "print('hi')"}
            ],
            "metadata": {},
            "nbformat": 4
        })
    }

    #[test]
    fn test_parse_five_positionals() {
        let cli = parse_args_from([
            "artifact-sync",
            "--json",
            "--config",
            "sync.clear_notebooks=false",
            "upload",
            "alice",
            "./out",
            "bucket",
            "proj",
        ])
        .unwrap();

        assert!(cli.global.json);
        assert_eq!(cli.global.config_overrides.len(), 1);
        assert_eq!(cli.sync.action, "upload");
        assert_eq!(cli.sync.username, "alice");
        assert_eq!(cli.sync.key_prefix, "proj");
    }

    #[test]
    fn test_four_positionals_is_usage_error() {
        let result = parse_args_from(["artifact-sync", "upload", "alice", "./out", "bucket"]);
        match result {
            Err(CliError::Usage(message)) => assert_eq!(message, USAGE),
            other => panic!("expected usage error, got {:?}", other),
        }
    }

    #[test]
    fn test_six_positionals_is_usage_error() {
        let result = parse_args_from([
            "artifact-sync",
            "upload",
            "alice",
            "./out",
            "bucket",
            "proj",
            "extra",
        ]);
        assert!(matches!(result, Err(CliError::Usage(_))));
    }

    #[test]
    fn test_malformed_config_override() {
        let result = parse_args_from([
            "artifact-sync",
            "--config",
            "no-equals",
            "upload",
            "alice",
            "./out",
            "bucket",
            "proj",
        ]);
        assert!(matches!(result, Err(CliError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn test_invalid_action_succeeds_without_config() {
        let temp = TempDir::new().unwrap();
        let cli = parse_args_from([
            "artifact-sync".to_string(),
            "--config-file".to_string(),
            temp.path().join("missing.ini").display().to_string(),
            "sync".to_string(),
            "alice".to_string(),
            temp.path().display().to_string(),
            "artifacts".to_string(),
            "proj".to_string(),
        ])
        .unwrap();

        cli.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_clears_notebooks_before_upload() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("nb.ipynb"), notebook_json().to_string()).unwrap();
        std::fs::write(temp.path().join("data.csv"), "1,2").unwrap();

        let store = Arc::new(MemoryObjectStore::new());
        let cli = cli_for("upload", temp.path(), "proj");
        let summary = cli
            .execute(Action::Upload, &default_config(), store.clone())
            .await
            .unwrap();

        match &summary {
            RunSummary::Upload {
                notebooks_cleared,
                summary,
            } => {
                assert_eq!(*notebooks_cleared, 1);
                assert_eq!(summary.uploaded_keys, vec!["proj/nb.ipynb"]);
                assert!(summary.log_written);
            }
            other => panic!("expected upload summary, got {:?}", other),
        }

        let uploaded = store.get("artifacts", "proj/nb.ipynb").unwrap();
        let value: Value = serde_json::from_slice(&uploaded).unwrap();
        assert_eq!(value["cells"][0]["outputs"], json!([]));
        assert_eq!(value["cells"][0]["execution_count"], Value::Null);
    }

    #[tokio::test]
    async fn test_upload_without_notebook_pass() {
        let temp = TempDir::new().unwrap();
        let original = notebook_json().to_string();
        std::fs::write(temp.path().join("nb.ipynb"), &original).unwrap();

        let mut config = default_config();
        config.sync.clear_notebooks = false;

        let store = Arc::new(MemoryObjectStore::new());
        let cli = cli_for("upload", temp.path(), "proj");
        cli.execute(Action::Upload, &config, store.clone())
            .await
            .unwrap();

        assert_eq!(store.get("artifacts", "proj/nb.ipynb").unwrap(), original);
    }

    #[tokio::test]
    async fn test_malformed_notebook_aborts_before_any_put() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp.path().join("bad.ipynb"), r#"{"cells": [{"source": "x"}]}"#).unwrap();

        let store = Arc::new(MemoryObjectStore::new());
        let cli = cli_for("upload", temp.path(), "proj");
        let result = cli
            .execute(Action::Upload, &default_config(), store.clone())
            .await;

        assert!(matches!(
            result,
            Err(CliError::Sync(SyncError::Notebook(_)))
        ));
        assert!(store.puts().is_empty());
    }

    #[tokio::test]
    async fn test_download_action() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        store.insert("artifacts", "proj/sub/a.txt", "alpha");

        let cli = cli_for("download", temp.path(), "proj");
        let summary = cli
            .execute(Action::Download, &default_config(), store.clone())
            .await
            .unwrap();

        assert_eq!(summary.to_string(), "Downloaded 1 files, skipped 0 keys");
        assert_eq!(
            std::fs::read_to_string(temp.path().join("sub/a.txt")).unwrap(),
            "alpha"
        );
    }

    #[test]
    fn test_summary_json() {
        let summary = RunSummary::Download(DownloadSummary {
            downloaded: vec![],
            skipped: vec!["proj/".to_string()],
        });
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({"action": "download", "downloaded": [], "skipped": ["proj/"]})
        );
    }
}
