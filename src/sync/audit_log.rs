//! Audit records for uploaded files.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Local};

use crate::storage::{self, ObjectStore};

/// Rendering of [`LogEntry::timestamp`]: local time with microseconds.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub username: String,
    /// Base name of the uploaded file.
    pub file_name: String,
    /// Path of the file on the uploading machine.
    pub local_path: PathBuf,
    /// Hex digest of the file contents.
    pub digest: String,
}

impl LogEntry {
    /// The entry as one line of the log object, newline included.
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.timestamp.format(LOG_TIMESTAMP_FORMAT),
            self.username,
            self.file_name,
            self.local_path.display(),
            self.digest
        )
    }
}

/// Entries collected during one upload, in the order files were sent.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<LogEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All entries, one line each.
    pub fn render(&self) -> String {
        self.entries.iter().map(LogEntry::to_line).collect()
    }

    /// Store the rendered log at `key`, replacing any previous log.
    ///
    /// An empty log is not written and leaves the object untouched. Returns
    /// whether a put was made.
    pub async fn write(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        key: &str,
    ) -> storage::Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }

        store
            .put_bytes(bucket, key, Bytes::from(self.render()))
            .await?;
        tracing::info!("Wrote upload log {} ({} entries)", key, self.len());
        Ok(true)
    }
}
