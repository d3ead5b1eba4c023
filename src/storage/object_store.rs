use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

/// Error type for object storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The object was not found.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// An I/O error occurred reading or writing a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage service rejected or failed the request.
    #[error("storage request failed: {0}")]
    Sdk(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// One page of a key listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Keys in this page, in the order the store returned them.
    pub keys: Vec<String>,
    /// Token for the next page, or None if the listing is complete.
    pub next_continuation_token: Option<String>,
}

/// The bucket operations used by uploads and downloads.
///
/// Credentials, retries and timeouts are the implementation's concern.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file to `key`, replacing any existing object.
    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()>;

    /// Store `data` at `key`, replacing any existing object.
    async fn put_bytes(&self, bucket: &str, key: &str, data: Bytes) -> Result<()>;

    /// List one page of keys starting with `prefix`.
    ///
    /// Pass the previous page's `next_continuation_token` to continue.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage>;

    /// Download `key` into a local file, replacing the file if it exists.
    ///
    /// The parent directory must already exist.
    async fn get_to_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()>;
}

/// List every key under `prefix`, following continuation tokens.
pub async fn list_all_keys(store: &dyn ObjectStore, bucket: &str, prefix: &str) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut continuation_token = None;

    loop {
        let page = store
            .list_objects(bucket, prefix, continuation_token.take())
            .await?;
        tracing::debug!(
            "Listed {} keys under {}/{}",
            page.keys.len(),
            bucket,
            prefix
        );
        keys.extend(page.keys);

        match page.next_continuation_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }

    Ok(keys)
}
