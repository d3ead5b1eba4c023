//! Configuration types for artifact-sync.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

/// [sync] section - what gets uploaded and where the audit log goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Object key the upload log is written to, relative to the bucket root.
    pub log_object_key: String,
    /// File extensions that are never uploaded, as written in the config.
    /// A missing leading dot is added when the filter is built.
    pub excluded_extensions: Vec<String>,
    /// Whether notebook outputs are cleared before uploading.
    pub clear_notebooks: bool,
}

/// [s3] section - S3 connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Settings {
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sync: SyncSettings,
    pub s3: S3Settings,
}
