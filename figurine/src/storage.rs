//! Blob storage backends.
//!
//! Storage is abstracted behind [`BlobStore`] so handlers are independent of
//! the deployment target: production talks to S3-compatible object storage
//! via the AWS SDK, while tests and local development use a plain directory
//! tree. Which backend is built is decided by [`StorageConfig`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use thiserror::Error;

use crate::config::StorageConfig;

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from blob storage operations.
///
/// The flat split matters to the HTTP layer: `NotFound` becomes a 404 and
/// everything else a 500.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl StorageError {
    fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}

/// A single bucket of blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether a blob exists without downloading it.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Download a blob's full contents.
    async fn download(&self, key: &str) -> StorageResult<Bytes>;

    /// Upload a blob, replacing any existing object at the key. Uploaded
    /// objects are publicly readable.
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Bucket name, for logs and error messages.
    fn bucket(&self) -> &str;
}

/// Build a store for `bucket` from the configured backend.
pub async fn connect(storage: &StorageConfig, bucket: &str) -> anyhow::Result<Arc<dyn BlobStore>> {
    match storage {
        StorageConfig::S3 {
            endpoint_url,
            region,
            force_path_style,
        } => {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(aws_config::Region::new(region.clone()));
            }
            if let Some(endpoint) = endpoint_url {
                loader = loader.endpoint_url(endpoint);
            }
            let sdk_config = loader.load().await;

            let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
            if *force_path_style {
                builder = builder.force_path_style(true);
            }
            let client = aws_sdk_s3::Client::from_conf(builder.build());

            Ok(Arc::new(S3Store {
                client,
                bucket: bucket.to_owned(),
            }))
        }
        StorageConfig::Filesystem { root } => Ok(Arc::new(FsStore::new(root.join(bucket), bucket))),
    }
}

/// Poll for a blob to become visible, with a bounded retry budget.
///
/// Used to absorb eventual upload visibility: clients request processing as
/// soon as their upload call returns, which can race the object becoming
/// readable. This is a fixed linear poll, not a backoff scheme; after the
/// final attempt the blob is reported as not found.
pub async fn wait_for_blob(
    store: &dyn BlobStore,
    key: &str,
    attempts: u32,
    interval: Duration,
) -> StorageResult<()> {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        if store.exists(key).await? {
            return Ok(());
        }
        if attempt < attempts {
            tracing::debug!(
                bucket = store.bucket(),
                key,
                attempt,
                attempts,
                "blob not visible yet, waiting {:?} before retrying",
                interval
            );
            tokio::time::sleep(interval).await;
        }
    }

    Err(StorageError::NotFound {
        bucket: store.bucket().to_owned(),
        key: key.to_owned(),
    })
}

/// S3-compatible object storage.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

#[async_trait]
impl BlobStore for S3Store {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if let SdkError::ServiceError(ref service) = err
                    && service.err().is_not_found()
                {
                    return Ok(false);
                }
                Err(StorageError::backend(err))
            }
        }
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if let SdkError::ServiceError(ref service) = err
                    && service.err().is_no_such_key()
                {
                    return StorageError::NotFound {
                        bucket: self.bucket.clone(),
                        key: key.to_owned(),
                    };
                }
                StorageError::backend(err)
            })?;

        let data = object.body.collect().await.map_err(StorageError::backend)?;
        Ok(data.into_bytes())
    }

    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(StorageError::backend)?;
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Directory-tree storage for tests and local development.
///
/// Keys map directly to paths under the store root; key validation happens
/// at the API boundary, so keys reaching this store contain no traversal
/// segments.
pub struct FsStore {
    root: PathBuf,
    bucket: String,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>, bucket: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.to_owned(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .map_err(StorageError::backend)
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_owned(),
            }),
            Err(err) => Err(StorageError::backend(err)),
        }
    }

    async fn upload(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(StorageError::backend)?;
        }
        tokio::fs::write(&path, &data).await.map_err(StorageError::backend)?;
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
