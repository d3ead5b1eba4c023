//! Upload and download orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Local;
use futures::TryStreamExt;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncReadExt;

use super::audit_log::{AuditLog, LogEntry};
use super::error::Result;
use crate::config::Config;
use crate::file_tree::{ExtensionFilter, FileTree, FsFileTree, walk};
use crate::storage::{ObjectStore, list_all_keys};
use crate::util::hash_file;

// =============================================================================
// Configuration
// =============================================================================

/// Settings for one sync run. Built once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub bucket: String,
    /// Key prefix objects are uploaded under. May be empty.
    pub prefix: String,
    /// Key of the upload log object, relative to the bucket root.
    pub log_object_key: String,
    /// Operator recorded in the upload log.
    pub username: String,
    pub excluded: ExtensionFilter,
}

impl SyncConfig {
    /// Combine the loaded configuration with the values given for this run.
    pub fn from_config(
        config: &Config,
        username: impl Into<String>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            log_object_key: config.sync.log_object_key.clone(),
            username: username.into(),
            excluded: ExtensionFilter::new(&config.sync.excluded_extensions),
        }
    }
}

// =============================================================================
// Key Mapping
// =============================================================================

/// The object key for a file at `relative` (a `/`-separated path) under `prefix`.
pub fn object_key(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, relative)
    } else {
        format!("{}/{}", prefix, relative)
    }
}

/// The path segments of `key` below `prefix`.
///
/// Returns None for keys that should not become local files: directory
/// markers, the prefix itself, keys outside the prefix at a segment boundary,
/// and keys with empty, `.` or `..` segments.
fn relative_key_segments<'a>(key: &'a str, prefix: &str) -> Option<Vec<&'a str>> {
    let prefix = prefix.trim_end_matches('/');
    let relative = if prefix.is_empty() {
        key
    } else {
        key.strip_prefix(prefix)?.strip_prefix('/')?
    };

    let segments: Vec<&str> = relative.split('/').collect();
    if segments
        .iter()
        .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
    {
        return None;
    }
    Some(segments)
}

// =============================================================================
// Summaries
// =============================================================================

/// Outcome of [`SyncClient::upload_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// Keys uploaded, in walk order.
    pub uploaded_keys: Vec<String>,
    pub bytes_uploaded: u64,
    /// Whether the upload log object was written.
    pub log_written: bool,
}

/// Outcome of [`SyncClient::download_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    /// Local files written, in listing order.
    pub downloaded: Vec<PathBuf>,
    /// Keys that were listed but not downloaded.
    pub skipped: Vec<String>,
}

// =============================================================================
// SyncClient
// =============================================================================

/// Moves files between a local directory and an object store.
///
/// Every operation runs sequentially and stops at the first error.
pub struct SyncClient {
    config: SyncConfig,
    store: Arc<dyn ObjectStore>,
    tree: Arc<dyn FileTree>,
}

impl SyncClient {
    /// Create a client that uploads from the local filesystem.
    pub fn new(config: SyncConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_file_tree(config, store, Arc::new(FsFileTree::new()))
    }

    /// Create a client that walks and reads uploads through `tree`.
    pub fn with_file_tree(
        config: SyncConfig,
        store: Arc<dyn ObjectStore>,
        tree: Arc<dyn FileTree>,
    ) -> Self {
        Self {
            config,
            store,
            tree,
        }
    }

    /// Upload every non-excluded file under `local_root` to the configured
    /// bucket and prefix, then write the upload log.
    ///
    /// The log is written only if at least one file was uploaded.
    pub async fn upload_directory(&self, local_root: &Path) -> Result<UploadSummary> {
        let mut entries = walk(self.tree.as_ref(), local_root);
        let mut log = AuditLog::new();
        let mut summary = UploadSummary::default();

        while let Some(entry) = entries.try_next().await? {
            let file_name = entry.name_lossy().into_owned();
            if self.config.excluded.is_excluded(&file_name) {
                tracing::debug!("Skipping excluded file {}", entry.path.display());
                continue;
            }

            let key = object_key(&self.config.prefix, &entry.relative_slash_path());
            let digest = hash_file(self.tree.as_ref(), &entry.path).await?;

            tracing::info!("Uploading {} to {}", key, self.config.bucket);
            let size = self.put_entry(&key, &entry.path).await?;

            log.push(LogEntry {
                timestamp: Local::now(),
                username: self.config.username.clone(),
                file_name,
                local_path: entry.path,
                digest,
            });
            summary.uploaded_keys.push(key);
            summary.bytes_uploaded += size;
        }

        summary.log_written = log
            .write(
                self.store.as_ref(),
                &self.config.bucket,
                &self.config.log_object_key,
            )
            .await?;

        Ok(summary)
    }

    /// Put one walked file at `key`, returning its size.
    ///
    /// Files on the local filesystem are handed to the store by path; other
    /// trees are read into memory first.
    async fn put_entry(&self, key: &str, path: &Path) -> Result<u64> {
        let bucket = &self.config.bucket;
        match self.tree.local_path(path) {
            Some(local) => {
                let size = fs::metadata(&local).await?.len();
                self.store.put_file(bucket, key, &local).await?;
                Ok(size)
            }
            None => {
                let mut reader = self.tree.open(path).await?;
                let mut data = Vec::new();
                reader.read_to_end(&mut data).await?;
                let size = data.len() as u64;
                self.store.put_bytes(bucket, key, Bytes::from(data)).await?;
                Ok(size)
            }
        }
    }

    /// Download every object under `prefix` in `bucket` into `local_dir`,
    /// recreating the key hierarchy as directories.
    ///
    /// Existing files are overwritten. Keys that cannot be mapped safely
    /// below `local_dir` are skipped with a warning.
    pub async fn download_directory(
        &self,
        bucket: &str,
        prefix: &str,
        local_dir: &Path,
    ) -> Result<DownloadSummary> {
        let keys = list_all_keys(self.store.as_ref(), bucket, prefix).await?;
        let mut summary = DownloadSummary::default();

        for key in keys {
            let Some(segments) = relative_key_segments(&key, prefix) else {
                tracing::warn!("Skipping key {} under prefix {:?}", key, prefix);
                summary.skipped.push(key);
                continue;
            };

            let local_path = segments
                .iter()
                .fold(local_dir.to_path_buf(), |path, segment| path.join(segment));
            if let Some(parent) = local_path.parent() {
                fs::create_dir_all(parent).await?;
            }

            tracing::info!("Downloading {} to {}", key, local_path.display());
            self.store.get_to_file(bucket, &key, &local_path).await?;
            summary.downloaded.push(local_path);
        }

        Ok(summary)
    }
}

// =============================================================================
// Tests
// =============================================================================
