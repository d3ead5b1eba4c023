//! Upload and download between a local directory and an object store.
//!
//! # Key Types
//!
//! - [`SyncClient`] - Runs uploads and downloads against an injected [`ObjectStore`]
//! - [`SyncConfig`] - Per-run settings: bucket, prefix, operator, exclusions
//! - [`AuditLog`] - Record of the files an upload sent, written as one object
//!
//! [`ObjectStore`]: crate::storage::ObjectStore

mod audit_log;
mod error;
mod sync_client;

pub use audit_log::{AuditLog, LOG_TIMESTAMP_FORMAT, LogEntry};
pub use error::{Result, SyncError};
pub use sync_client::{DownloadSummary, SyncClient, SyncConfig, UploadSummary, object_key};
