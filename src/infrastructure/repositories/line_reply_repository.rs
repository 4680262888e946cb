use super::reply_repository::ReplyRepository;
use crate::domain::reply::{ReplyMessage, ReplyRequest};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;

const LINE_REPLY_PATH: &str = "/v2/bot/message/reply";

/// LINE Messaging API reply client
pub struct LineReplyRepository {
    channel_token: String,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl LineReplyRepository {
    pub fn new(channel_token: String, api_base_url: String) -> Self {
        Self {
            channel_token,
            api_base_url,
            http_client: reqwest::Client::new(),
        }
    }

    fn reply_url(&self) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), LINE_REPLY_PATH)
    }
}

#[async_trait]
impl ReplyRepository for LineReplyRepository {
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> AppResult<()> {
        let kinds: Vec<&'static str> = messages.iter().map(ReplyMessage::kind).collect();
        let request = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let response = self
            .http_client
            .post(self.reply_url())
            .bearer_auth(&self.channel_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("LINE reply request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::info!(
            status = %status.as_u16(),
            kinds = ?kinds,
            response = %body,
            "LINE reply sent"
        );

        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "LINE reply returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}
