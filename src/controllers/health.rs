use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AppResult;
use crate::infrastructure::repositories::TranscoderRepository;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(
    State(transcoder): State<Arc<dyn TranscoderRepository>>,
) -> AppResult<Json<Value>> {
    transcoder.check().await?;

    Ok(Json(json!({
        "status": "ready",
        "transcoder": "available"
    })))
}
