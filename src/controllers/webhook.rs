use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::webhook::{WebhookService, SIGNATURE_HEADER};

pub struct WebhookController {
    webhook_service: Arc<WebhookService>,
}

impl WebhookController {
    pub fn new(webhook_service: Arc<WebhookService>) -> Self {
        Self { webhook_service }
    }

    /// POST /webhook - Receive chat platform events
    ///
    /// Always acknowledges with 200 `{}`. Per-event failures only surface
    /// through the chat reply.
    pub async fn receive(
        State(controller): State<Arc<WebhookController>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, Json<Value>) {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());

        let outcome = controller.webhook_service.handle(&body, signature).await;
        tracing::debug!(outcome = ?outcome, "Webhook handled");

        (StatusCode::OK, Json(json!({})))
    }
}
