use crate::error::AppResult;
use async_trait::async_trait;

/// URL shortening service
#[async_trait]
pub trait ShortenerRepository: Send + Sync {
    /// Shorten a public URL. The returned URL always uses `https`.
    async fn shorten(&self, long_url: &str) -> AppResult<String>;
}
