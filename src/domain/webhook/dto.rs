use serde::{Deserialize, Serialize};

/// Body of a LINE webhook delivery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<InboundEvent>,
}

/// One event entry of a webhook delivery.
///
/// Non-message events (follow, unfollow, postback, ...) carry no `message`
/// and no reply token in some cases, so both are optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Audio,
    #[serde(other)]
    Unknown,
}

/// Envelope read before the entries are decoded one by one
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

impl WebhookPayload {
    /// Parse a verified webhook body. A body that is not a JSON object with an
    /// `events` array yields zero events.
    ///
    /// Entries are decoded independently; a malformed entry is skipped and the
    /// rest of the delivery is kept.
    pub fn parse(body: &[u8]) -> Self {
        let raw = match serde_json::from_slice::<RawPayload>(body) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, body_size = body.len(), "Unparsable webhook body");
                return Self::default();
            }
        };

        let events = raw
            .events
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<InboundEvent>(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(error = %e, index = index, "Skipping malformed webhook event");
                    None
                }
            })
            .collect();

        Self { events }
    }
}
