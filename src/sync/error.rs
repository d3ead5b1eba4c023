//! Error types for sync operations.

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Object storage error.
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Error walking or reading the local tree.
    #[error("file tree error: {0}")]
    FileTree(#[from] crate::file_tree::Error),

    /// A notebook could not be sanitized.
    #[error("notebook error: {0}")]
    Notebook(#[from] crate::notebook::NotebookError),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
