//! Configuration module.

mod read_config;
mod types;

pub use read_config::{
    ConfigError, ConfigResult, ConfigSource, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_LOG_OBJECT_KEY,
    default_config, read_config,
};
pub use types::{Config, S3Settings, SyncSettings};
