//! artifact-sync - Sync a local directory with an S3 bucket prefix.

pub mod cli;
pub mod config;
pub mod file_tree;
pub mod notebook;
pub mod storage;
pub mod sync;
pub mod util;

pub use file_tree::{FileTree, FsFileTree, MemoryFileTree, MemoryFileTreeBuilder, MemoryFsEntry};
pub use notebook::{Notebook, NotebookError};
pub use storage::{MemoryObjectStore, ObjectStore, S3ObjectStore, S3ObjectStoreConfig, StorageError};
pub use sync::{DownloadSummary, SyncClient, SyncConfig, SyncError, UploadSummary};
