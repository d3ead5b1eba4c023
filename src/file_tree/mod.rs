//! Read-only views of a directory tree.
//!
//! A [`FileTree`] lists directories and opens files. [`walk`] turns any tree
//! into a lazy depth-first stream of regular files, so the same walk runs
//! over the local filesystem ([`FsFileTree`]) and over an in-memory fake
//! ([`MemoryFileTree`]).

mod extension_filter;
mod fs_file_tree;
mod memory_file_tree;
mod walk;

pub use extension_filter::{ExtensionFilter, file_suffix};
pub use fs_file_tree::FsFileTree;
pub use memory_file_tree::{MemoryFileTree, MemoryFileTreeBuilder, MemoryFsEntry};
pub use walk::{WalkEntries, WalkEntry, walk};

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Result type for file tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a file tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Path is not a file: {0}")]
    NotAFile(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),
}

// =============================================================================
// Entry Types
// =============================================================================

/// What a directory entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file (or a link resolving to one).
    File,
    /// A directory the walk descends into.
    Directory,
    /// Anything else: sockets, links to directories, dangling links.
    Other,
}

/// A single entry returned by [`FileTree::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Base name of the entry, exactly as the tree reports it.
    pub name: OsString,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Async reader over a file's bytes.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

// =============================================================================
// FileTree Trait
// =============================================================================

/// A hierarchy of directories and files that can be listed and read.
#[async_trait]
pub trait FileTree: Send + Sync {
    /// List the entries of a directory, in no particular order.
    ///
    /// Returns an error if the path does not exist or is not a directory.
    async fn read_dir(&self, path: &Path) -> Result<Vec<TreeEntry>>;

    /// Open a file for streaming reads.
    ///
    /// Returns an error if the path does not exist or is not a file.
    async fn open(&self, path: &Path) -> Result<FileReader>;

    /// The on-disk location of `path`, for trees backed by the local
    /// filesystem. Stores can then upload the file without buffering it.
    fn local_path(&self, _path: &Path) -> Option<PathBuf> {
        None
    }
}
