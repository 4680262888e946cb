use super::storage_repository::StorageRepository;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl, Client as S3Client};
use std::sync::Arc;

/// S3 implementation of the storage repository.
///
/// Objects are written with the `public-read` canned ACL and addressed
/// path-style under `public_base_url`.
pub struct S3StorageRepository {
    s3_client: Arc<S3Client>,
    bucket: String,
    public_base_url: String,
}

impl S3StorageRepository {
    pub fn new(s3_client: Arc<S3Client>, bucket: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket,
            public_base_url,
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            self.bucket,
            key
        )
    }
}

#[async_trait]
impl StorageRepository for S3StorageRepository {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<String> {
        let size = data.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 put_object failed"
                );
                AppError::ExternalService(format!("S3 put_object error: {}", e))
            })?;

        tracing::info!(bucket = %self.bucket, key = %key, size_bytes = size, "Object uploaded");

        Ok(self.public_url(key))
    }
}
