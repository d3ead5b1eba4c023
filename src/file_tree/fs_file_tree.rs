//! Filesystem-based FileTree implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{EntryKind, Error, FileReader, FileTree, Result, TreeEntry};

/// A FileTree backed by the local filesystem.
///
/// Paths are used as given, so a walk rooted at a relative path yields
/// relative paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileTree;

impl FsFileTree {
    pub fn new() -> Self {
        Self
    }

    /// Classify a directory entry. Links to files count as files; links to
    /// directories are neither listed nor followed.
    async fn entry_kind(entry: &fs::DirEntry) -> std::io::Result<EntryKind> {
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            return Ok(EntryKind::Directory);
        }
        if file_type.is_file() {
            return Ok(EntryKind::File);
        }
        if file_type.is_symlink() {
            return Ok(match fs::metadata(entry.path()).await {
                Ok(metadata) if metadata.is_file() => EntryKind::File,
                _ => EntryKind::Other,
            });
        }
        Ok(EntryKind::Other)
    }
}

fn map_not_found(path: &Path, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(path.to_string_lossy().into_owned())
    } else {
        Error::Io(e)
    }
}

#[async_trait]
impl FileTree for FsFileTree {
    async fn read_dir(&self, path: &Path) -> Result<Vec<TreeEntry>> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| map_not_found(path, e))?;
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(path.to_string_lossy().into_owned()));
        }

        let mut entries = fs::read_dir(path).await?;
        let mut result = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            result.push(TreeEntry {
                name: entry.file_name(),
                kind: Self::entry_kind(&entry).await?,
            });
        }
        Ok(result)
    }

    async fn open(&self, path: &Path) -> Result<FileReader> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| map_not_found(path, e))?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(path.to_string_lossy().into_owned()));
        }

        let file = fs::File::open(path).await?;
        Ok(Box::pin(file))
    }

    fn local_path(&self, path: &Path) -> Option<PathBuf> {
        Some(path.to_path_buf())
    }
}

// =============================================================================
// Tests
// =============================================================================
