use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use super::object_store::{ObjectPage, ObjectStore, Result, StorageError};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// A put request observed by a [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub bucket: String,
    pub key: String,
    pub size: usize,
}

/// An in-memory implementation of `ObjectStore`, intended primarily for testing.
///
/// Listings are lexicographic and paged like S3's. Keys registered with
/// [`fail_key`](Self::fail_key) fail every operation that touches them.
pub struct MemoryObjectStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, Bytes>>>,
    puts: RwLock<Vec<PutRecord>>,
    failing_keys: RwLock<BTreeSet<String>>,
    page_size: usize,
}

impl MemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
            puts: RwLock::new(Vec::new()),
            failing_keys: RwLock::new(BTreeSet::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the maximum number of keys per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store an object directly, without recording a put.
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        let mut buckets = self.buckets.write().unwrap();
        buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.into());
    }

    /// Fetch an object's contents, if present.
    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let buckets = self.buckets.read().unwrap();
        buckets.get(bucket).and_then(|objects| objects.get(key)).cloned()
    }

    /// All keys in a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let buckets = self.buckets.read().unwrap();
        buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every put made through the `ObjectStore` interface, in call order.
    pub fn puts(&self) -> Vec<PutRecord> {
        self.puts.read().unwrap().clone()
    }

    /// Make every later operation on `key` fail.
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.write().unwrap().insert(key.to_string());
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if self.failing_keys.read().unwrap().contains(key) {
            return Err(StorageError::Sdk(format!("injected failure for {}", key)));
        }
        Ok(())
    }

    fn store(&self, bucket: &str, key: &str, data: Bytes) {
        self.puts.write().unwrap().push(PutRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size: data.len(),
        });
        self.insert(bucket, key, data);
    }

    fn lookup(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.check_key(key)?;
        self.get(bucket, key).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        self.check_key(key)?;
        let data = tokio::fs::read(local_path).await?;
        self.store(bucket, key, Bytes::from(data));
        Ok(())
    }

    async fn put_bytes(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        self.check_key(key)?;
        self.store(bucket, key, data);
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        let buckets = self.buckets.read().unwrap();
        let Some(objects) = buckets.get(bucket) else {
            return Ok(ObjectPage::default());
        };

        let start = match &continuation_token {
            Some(token) => Bound::Excluded(token.as_str()),
            None => Bound::Included(prefix),
        };

        let mut matching = objects
            .range::<str, _>((start, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_continuation_token = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            next_continuation_token,
        })
    }

    async fn get_to_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let data = self.lookup(bucket, key)?;
        tokio::fs::write(local_path, &data).await?;
        Ok(())
    }
}
