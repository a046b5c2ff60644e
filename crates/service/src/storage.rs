/// Object storage for avatar images.
///
/// `ObjectStore` is the seam the avatar pipeline talks to; `S3ObjectStore` is
/// the production implementation built once from `StorageConfig`.
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to upload object {key}: {message}")]
    Upload { key: String, message: String },

    #[error("failed to delete object {key}: {message}")]
    Delete { key: String, message: String },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Single put of the full body. No retry, no multipart upload.
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Publicly reachable URL of `key`.
    fn public_url(&self, key: &str) -> String;
}

/// `user-<uuid v4>.jpeg`. The random token is the only thing keeping
/// concurrent uploads from colliding.
pub fn avatar_object_key() -> String {
    format!("user-{}.jpeg", Uuid::new_v4())
}

/// `https://<bucket>.s3.<region>.amazonaws.com/<key>`
pub fn public_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3ObjectStore {
    /// Builds the client from explicit credentials; the default AWS credential
    /// chain is never consulted.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_access_key,
            None,
            None,
            "profile_service_s3",
        );

        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.bucket_region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&shared_config);
        // S3-compatible stores (MinIO, localstack) expect path-style addressing
        if let Some(endpoint) = &config.s3_endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(s3_config.build()),
            bucket: config.bucket_name.clone(),
            region: config.bucket_region.clone(),
            endpoint: config.s3_endpoint.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!(bucket = %self.bucket, key, size, "Object uploaded");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!(bucket = %self.bucket, key, "Object deleted");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => public_object_url(&self.bucket, &self.region, key),
        }
    }
}
