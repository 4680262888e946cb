use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, webhook::WebhookController};
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;
use crate::infrastructure::repositories::TranscoderRepository;

/// Build the application router
pub fn build_router(
    webhook_controller: Arc<WebhookController>,
    transcoder_repo: Arc<dyn TranscoderRepository>,
) -> Router {
    // Webhook route (public - trust comes from the body signature)
    let webhook_routes = Router::new()
        .route("/webhook", axum::routing::post(WebhookController::receive))
        .with_state(webhook_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(transcoder_repo)
        .merge(webhook_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured.
///
/// On SIGINT/SIGTERM the server stops accepting requests, then waits for
/// deliveries still running in `background_tasks`.
pub async fn start_http_server(
    config: Arc<Config>,
    webhook_controller: Arc<WebhookController>,
    transcoder_repo: Arc<dyn TranscoderRepository>,
    background_tasks: TaskTracker,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(webhook_controller, transcoder_repo);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    background_tasks.close();
    if !background_tasks.is_empty() {
        tracing::info!(
            pending = background_tasks.len(),
            "Waiting for background deliveries to finish"
        );
    }
    background_tasks.wait().await;

    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
