use crate::domain::reply::ReplyMessage;
use crate::error::AppResult;
use async_trait::async_trait;

/// Sends replies back to the chat platform
#[async_trait]
pub trait ReplyRepository: Send + Sync {
    /// Reply to the event identified by the one-time `reply_token`
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> AppResult<()>;
}
