use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::constants::DEFAULT_ASSET_PREFIX;

// Storage bridge between local assets and S3.
//
// Uploads land under `{asset_prefix}/{uuid}{ext}` so concurrent invocations
// never share a key. Downloads are whole-object reads parsed as JSON; an empty
// body is "no document" rather than an error.

/// Errors emitted by the storage bridge and its backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("object {uri} not found")]
    NotFound { uri: String },

    #[error("invalid storage uri `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: &'static str },

    #[error("storage request for {uri} failed: {message}")]
    Service { uri: String, message: String },

    #[error("object {uri} is not valid JSON: {source}")]
    Parse {
        uri: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Location of an object: `scheme://bucket/key`. Always rendered as `s3://`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Uri {
    bucket: String,
    key: String,
}

impl S3Uri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, StorageError> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() {
            return Err(StorageError::InvalidUri {
                uri: format!("s3://{bucket}/{key}"),
                reason: "bucket is empty",
            });
        }
        if key.is_empty() {
            return Err(StorageError::InvalidUri {
                uri: format!("s3://{bucket}/{key}"),
                reason: "key is empty",
            });
        }
        Ok(Self { bucket, key })
    }

    /// Split `scheme://bucket/key...` into bucket and key. The key keeps every
    /// remaining path segment, slashes included.
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let invalid = |reason| StorageError::InvalidUri {
            uri: uri.to_string(),
            reason,
        };

        let (scheme, rest) = uri.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
        if scheme.is_empty() {
            return Err(invalid("missing scheme"));
        }
        let (bucket, key) = rest.split_once('/').ok_or_else(|| invalid("missing key"))?;
        if bucket.is_empty() {
            return Err(invalid("bucket is empty"));
        }
        if key.is_empty() {
            return Err(invalid("key is empty"));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl FromStr for S3Uri {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whole-object blob backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `uri`, replacing any existing object.
    async fn put_object(&self, uri: &S3Uri, body: Bytes) -> Result<(), StorageError>;

    /// Read the full object at `uri` or `StorageError::NotFound`.
    async fn get_object(&self, uri: &S3Uri) -> Result<Bytes, StorageError>;
}

/// `ObjectStore` on top of the AWS S3 client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, uri: &S3Uri, body: Bytes) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(uri.bucket())
            .key(uri.key())
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StorageError::Service {
                uri: uri.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn get_object(&self, uri: &S3Uri) -> Result<Bytes, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(uri.bucket())
            .key(uri.key())
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    return Err(StorageError::NotFound {
                        uri: uri.to_string(),
                    });
                }
                return Err(StorageError::Service {
                    uri: uri.to_string(),
                    message: DisplayErrorContext(&err).to_string(),
                });
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::Service {
                uri: uri.to_string(),
                message: format!("failed to read object body: {err}"),
            })?;
        Ok(data.into_bytes())
    }
}

/// Uploads local assets into one bucket and reads JSON documents back.
#[derive(Clone, bon::Builder)]
pub struct StorageBridge {
    store: Arc<dyn ObjectStore>,
    #[builder(into)]
    bucket: String,
    #[builder(into, default = DEFAULT_ASSET_PREFIX.to_string())]
    asset_prefix: String,
}

impl StorageBridge {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Read `local_path` fully and store it under a fresh key.
    pub async fn upload(&self, local_path: &Path) -> Result<S3Uri, StorageError> {
        let contents = fs::read(local_path)
            .await
            .map_err(|source| StorageError::Io {
                path: local_path.to_path_buf(),
                source,
            })?;

        let uri = S3Uri::new(self.bucket.as_str(), self.asset_key(local_path))?;
        let size_bytes = contents.len();
        self.store.put_object(&uri, Bytes::from(contents)).await?;

        tracing::info!(path = %local_path.display(), %uri, size_bytes, "uploaded asset");
        Ok(uri)
    }

    /// Fetch the object at `uri` and parse it as JSON. Empty objects yield `None`.
    pub async fn download(&self, uri: &str) -> Result<Option<Value>, StorageError> {
        let uri = S3Uri::parse(uri)?;
        self.download_uri(&uri).await
    }

    pub async fn download_uri(&self, uri: &S3Uri) -> Result<Option<Value>, StorageError> {
        let body = self.store.get_object(uri).await?;
        if body.is_empty() {
            tracing::debug!(%uri, "object is empty");
            return Ok(None);
        }

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| StorageError::Parse {
                uri: uri.to_string(),
                source,
            })
    }

    /// `{prefix}/{uuid}{.ext}`; the extension is copied verbatim from the path.
    fn asset_key(&self, local_path: &Path) -> String {
        let extension = local_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let id = Uuid::new_v4();
        if self.asset_prefix.is_empty() {
            format!("{id}{extension}")
        } else {
            format!("{}/{id}{extension}", self.asset_prefix)
        }
    }
}
