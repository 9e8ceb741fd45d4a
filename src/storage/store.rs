//! Object storage adapter (S3, GCS, Azure, local, in-memory)

use super::rate_limit::RateLimiter;
use crate::config::{PipelineConfig, StorageConfig};
use crate::error::{Error, Result};
use crate::events::{EventPublisher, StorageEvent};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::borrow::Cow;
use std::sync::Arc;

/// Key/value blob store over a single bucket
///
/// Keys are plain strings such as `landing_zone/batch_1_0.dat`. Characters
/// the backend cannot store verbatim (`%`, `#`, ...) are percent-encoded on
/// the way in and decoded again by [`list`](Self::list), so a listed key can
/// always be passed back to `get`, `put` or `delete`.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Bucket (or container) name
    bucket: String,
    /// Backend scheme for logging
    scheme: String,
    /// Optional request limiter
    limiter: Option<RateLimiter>,
    /// Object-created notifications for keys under `watch_prefix`
    events: Option<EventPublisher>,
    watch_prefix: String,
}

impl ObjectStorage {
    /// Build the storage handle described by a pipeline config
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let bucket = config.bucket_name.as_str();
        let storage = match &config.storage {
            StorageConfig::S3 => Self::s3(bucket)?,
            StorageConfig::Gcs => Self::gcs(bucket)?,
            StorageConfig::Azure => Self::azure(bucket)?,
            StorageConfig::Local { root } => Self::local(root, bucket)?,
            StorageConfig::Memory => Self::in_memory(bucket),
        };

        Ok(match config.requests_per_second {
            Some(rps) => storage.with_rate_limit(rps),
            None => storage,
        })
    }

    /// AWS S3; credentials, region and endpoint come from the environment
    pub fn s3(bucket: &str) -> Result<Self> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create s3 client: {e}")))?;

        Ok(Self::new(Arc::new(store), bucket, "s3"))
    }

    /// Google Cloud Storage
    pub fn gcs(bucket: &str) -> Result<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self::new(Arc::new(store), bucket, "gs"))
    }

    /// Azure Blob Storage
    pub fn azure(container: &str) -> Result<Self> {
        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self::new(Arc::new(store), container, "az"))
    }

    /// Local directory; the bucket is a sub-directory of `root`
    pub fn local(root: &str, bucket: &str) -> Result<Self> {
        let root = root.strip_prefix("file://").unwrap_or(root);
        let path = std::path::Path::new(root).join(bucket);

        std::fs::create_dir_all(&path).map_err(|e| {
            Error::config(format!(
                "Failed to create directory {}: {e}",
                path.display()
            ))
        })?;

        let store = LocalFileSystem::new_with_prefix(&path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self::new(Arc::new(store), bucket, "file"))
    }

    /// Process-local store
    pub fn in_memory(bucket: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), bucket, "memory")
    }

    fn new(store: Arc<dyn ObjectStore>, bucket: &str, scheme: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            scheme: scheme.to_string(),
            limiter: None,
            events: None,
            watch_prefix: String::new(),
        }
    }

    /// Limit requests per second across every clone of this handle
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.limiter = Some(RateLimiter::per_second(requests_per_second));
        self
    }

    /// Publish an object-created event for every put under `watch_prefix`
    #[must_use]
    pub fn with_events(mut self, publisher: EventPublisher, watch_prefix: impl Into<String>) -> Self {
        self.events = Some(publisher);
        self.watch_prefix = watch_prefix.into();
        self
    }

    /// Bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Backend scheme (s3, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Whether this handle talks to a remote service
    pub fn is_cloud(&self) -> bool {
        !matches!(self.scheme.as_str(), "file" | "memory")
    }

    /// Full URL of a key, for logging
    pub fn url(&self, key: &str) -> String {
        format!("{}://{}/{key}", self.scheme, self.bucket)
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.wait().await;
        }
    }

    /// List every key under a zone prefix, sorted
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.throttle().await;
        let path = object_path(prefix);
        let objects: Vec<_> = self
            .store
            .list(Some(&path))
            .try_collect()
            .await
            .map_err(|e| Error::storage(prefix, format!("Failed to list: {e}")))?;

        let mut keys: Vec<String> = objects
            .into_iter()
            .map(|meta| plain_key(&meta.location))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Read an object's payload
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        self.throttle().await;
        let path = object_path(key);
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| Error::storage(key, format!("Failed to read: {e}")))?;

        result
            .bytes()
            .await
            .map_err(|e| Error::storage(key, format!("Failed to read body: {e}")))
    }

    /// Write an object, replacing any existing payload
    ///
    /// Keys under the watched prefix trigger an object-created event. A
    /// closed event channel is logged and does not fail the write.
    pub async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        self.throttle().await;
        let path = object_path(key);
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::storage(key, format!("Failed to write: {e}")))?;

        if let Some(events) = &self.events {
            if key.starts_with(&self.watch_prefix) {
                let event = StorageEvent::new(&self.bucket, key);
                if let Err(e) = events.publish(event) {
                    tracing::warn!(key, "Object-created notification dropped: {e}");
                }
            }
        }
        Ok(())
    }

    /// Delete an object
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.throttle().await;
        let path = object_path(key);
        self.store
            .delete(&path)
            .await
            .map_err(|e| Error::storage(key, format!("Failed to delete: {e}")))
    }

    /// Whether an object exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.throttle().await;
        let path = object_path(key);
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(Error::storage(key, format!("Failed to stat: {e}"))),
        }
    }
}

fn object_path(key: &str) -> ObjectPath {
    ObjectPath::from(key)
}

/// Inverse of [`object_path`]
fn plain_key(location: &ObjectPath) -> String {
    let encoded = location.to_string();
    let decoded = urlencoding::decode(&encoded).map(Cow::into_owned).ok();
    decoded.unwrap_or(encoded)
}
