use super::dto::{InboundEvent, MessageType, WebhookPayload};
use super::signature::SignatureVerifier;
use crate::domain::speech::SpeechServiceApi;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// What happened to a webhook delivery. The HTTP response is the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Signature missing or wrong; nothing was done
    Untrusted,
    /// Signature valid; `events` entries were handled (or handed off)
    Accepted { events: usize },
}

pub struct WebhookService {
    verifier: SignatureVerifier,
    speech_service: Arc<dyn SpeechServiceApi>,
    async_processing: bool,
    background_tasks: TaskTracker,
}

impl WebhookService {
    pub fn new(
        verifier: SignatureVerifier,
        speech_service: Arc<dyn SpeechServiceApi>,
        async_processing: bool,
    ) -> Self {
        Self {
            verifier,
            speech_service,
            async_processing,
            background_tasks: TaskTracker::new(),
        }
    }

    /// Tracker of deliveries handed off to background tasks
    pub fn background_tasks(&self) -> TaskTracker {
        self.background_tasks.clone()
    }

    /// Verify and process one webhook delivery.
    ///
    /// Events are handled strictly in order. With async processing enabled they
    /// are handed to a background task and this returns right after parsing.
    pub async fn handle(&self, body: &[u8], signature: Option<&str>) -> WebhookOutcome {
        let trusted = signature
            .map(|s| self.verifier.verify(body, s))
            .unwrap_or(false);

        if !trusted {
            tracing::info!(
                has_signature = signature.is_some(),
                body_size = body.len(),
                "Ignoring webhook with invalid signature"
            );
            return WebhookOutcome::Untrusted;
        }

        let payload = WebhookPayload::parse(body);
        let events = payload.events.len();

        tracing::info!(events = events, async_processing = self.async_processing, "Webhook accepted");

        if self.async_processing {
            let speech_service = self.speech_service.clone();
            self.background_tasks.spawn(async move {
                process_events(speech_service.as_ref(), payload.events).await;
            });
        } else {
            process_events(self.speech_service.as_ref(), payload.events).await;
        }

        WebhookOutcome::Accepted { events }
    }
}

async fn process_events(speech_service: &dyn SpeechServiceApi, events: Vec<InboundEvent>) {
    for event in events {
        dispatch_event(speech_service, event).await;
    }
}

async fn dispatch_event(speech_service: &dyn SpeechServiceApi, event: InboundEvent) {
    let Some(message) = event.message else {
        tracing::debug!("Dropping non-message event");
        return;
    };

    match message.message_type {
        MessageType::Text => {
            let (Some(reply_token), Some(text)) = (event.reply_token, message.text) else {
                tracing::warn!(message_id = %message.id, "Text event without reply token or text");
                return;
            };
            speech_service
                .deliver(&reply_token, &message.id, &text)
                .await;
        }
        MessageType::Audio => {
            // Recognition is not supported
            tracing::debug!(message_id = %message.id, "Dropping audio message");
        }
        MessageType::Unknown => {
            tracing::debug!(message_id = %message.id, "Dropping unsupported message type");
        }
    }
}
