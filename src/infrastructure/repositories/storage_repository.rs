use crate::error::AppResult;
use async_trait::async_trait;

/// Durable, publicly readable object storage
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    ///
    /// Takes ownership of the buffer. Returns the public URL of the object.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<String>;
}
