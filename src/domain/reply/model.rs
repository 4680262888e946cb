use serde::{Deserialize, Serialize};

/// Milliseconds of speech assumed per character of input text.
///
/// This is a rough estimate, not a measurement of the synthesized audio.
pub const MILLIS_PER_CHARACTER: u64 = 166;

/// Sent when the input text exceeds [`crate::domain::speech::MAX_TEXT_CHARS`]
pub const TEXT_TOO_LONG_MESSAGE: &str = "テキストが長すぎます。200文字以内でお願いします。";

/// Sent when any upstream stage of the speech pipeline fails
pub const SPEECH_FAILED_MESSAGE: &str =
    "音声の作成に失敗しました。しばらくしてからもう一度お試しください。";

/// A LINE message object used in a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text {
        text: String,
    },
    Audio {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        duration: u64,
    },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text { text: text.into() }
    }

    /// Audio reply whose duration is estimated from the source text length
    pub fn audio(url: impl Into<String>, char_count: usize) -> Self {
        ReplyMessage::Audio {
            original_content_url: url.into(),
            duration: estimate_duration_ms(char_count),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReplyMessage::Text { .. } => "text",
            ReplyMessage::Audio { .. } => "audio",
        }
    }
}

/// Request body of the LINE reply endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<ReplyMessage>,
}

pub fn estimate_duration_ms(char_count: usize) -> u64 {
    char_count as u64 * MILLIS_PER_CHARACTER
}
