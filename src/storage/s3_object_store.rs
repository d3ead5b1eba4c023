use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::object_store::{ObjectPage, ObjectStore, Result, StorageError};

/// Configuration for S3ObjectStore.
#[derive(Debug, Clone, Default)]
pub struct S3ObjectStoreConfig {
    /// Optional custom endpoint URL (for LocalStack/MinIO testing).
    pub endpoint_url: Option<String>,
    /// Optional region override.
    pub region: Option<String>,
}

/// An S3-based implementation of `ObjectStore`.
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a new S3 object store with the given configuration.
    ///
    /// Uses the standard AWS credential chain (env vars, ~/.aws, IAM roles, etc.).
    pub async fn new(config: S3ObjectStoreConfig) -> Self {
        let mut aws_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            aws_config_loader = aws_config_loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint_url) = &config.endpoint_url {
            aws_config_loader = aws_config_loader.endpoint_url(endpoint_url);
        }

        let aws_config = aws_config_loader.load().await;

        Self {
            client: Client::new(&aws_config),
        }
    }
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(e) if e.raw().status().as_u16() == 404)
}

fn map_sdk_error<E: std::fmt::Debug>(err: SdkError<E>) -> StorageError {
    StorageError::Sdk(format!("{:?}", err))
}

fn map_get_error<E: std::fmt::Debug>(err: SdkError<E>, bucket: &str, key: &str) -> StorageError {
    if is_not_found(&err) {
        StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    } else {
        map_sdk_error(err)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Other(format!("{}: {}", local_path.display(), e)))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn put_bytes(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        let mut request = self.client.list_objects_v2().bucket(bucket);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(map_sdk_error)?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|key| key.to_string()))
            .collect();

        let next_continuation_token = if response.is_truncated() == Some(true) {
            response.next_continuation_token().map(|s| s.to_string())
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            next_continuation_token,
        })
    }

    async fn get_to_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_get_error(err, bucket, key))?;

        let mut body = response.body;
        let mut file = fs::File::create(local_path).await?;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| StorageError::Other(e.to_string()))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}
