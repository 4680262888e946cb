use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use line_speech_backend::controllers::webhook::WebhookController;
use line_speech_backend::domain::speech::SpeechService;
use line_speech_backend::domain::webhook::{SignatureVerifier, WebhookService};
use line_speech_backend::infrastructure::config::{Config, LogFormat};
use line_speech_backend::infrastructure::http::start_http_server;
use line_speech_backend::infrastructure::repositories::{
    BitlyShortenerRepository, FfmpegTranscoderRepository, LineReplyRepository,
    PollyTtsRepository, ReplyRepository, S3StorageRepository, ShortenerRepository,
    StorageRepository, TranscoderRepository, TtsRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting LINE speech backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        development = config.is_development(),
        async_processing = config.async_processing,
        pipeline_timeout_secs = config.pipeline_timeout_secs,
        bucket = %config.s3_bucket_name,
        voice_id = %config.polly_voice_id,
        "Pipeline configuration"
    );

    // Create AWS clients
    tracing::info!("Initializing AWS clients with region: {}", config.aws_region);

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    tracing::info!(
        region = ?aws_config.region(),
        "AWS configuration loaded"
    );

    let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (external capabilities)
    tracing::info!("Instantiating repositories...");
    let tts_repo: Arc<dyn TtsRepository> = Arc::new(PollyTtsRepository::new(
        polly_client,
        config.polly_voice_id.clone(),
    ));
    let transcoder_repo: Arc<dyn TranscoderRepository> =
        Arc::new(FfmpegTranscoderRepository::new(config.ffmpeg_path.clone()));
    let storage_repo: Arc<dyn StorageRepository> = Arc::new(S3StorageRepository::new(
        s3_client,
        config.s3_bucket_name.clone(),
        config.s3_public_base_url.clone(),
    ));
    let shortener_repo: Arc<dyn ShortenerRepository> = Arc::new(BitlyShortenerRepository::new(
        config.bitly_token.clone(),
        config.bitly_api_base_url.clone(),
    ));
    let reply_repo: Arc<dyn ReplyRepository> = Arc::new(LineReplyRepository::new(
        config.line_channel_token.clone(),
        config.line_api_base_url.clone(),
    ));

    if let Err(e) = transcoder_repo.check().await {
        tracing::warn!(error = %e, "Transcoder is not available; text events will fail");
    }

    // 2. Instantiate services (inject repositories)
    tracing::info!("Instantiating services...");
    let speech_service = Arc::new(SpeechService::new(
        tts_repo,
        transcoder_repo.clone(),
        storage_repo,
        shortener_repo,
        reply_repo,
        config.pipeline_timeout(),
    ));
    let webhook_service = Arc::new(WebhookService::new(
        SignatureVerifier::new(config.line_channel_secret.clone()),
        speech_service,
        config.async_processing,
    ));
    let background_tasks = webhook_service.background_tasks();

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let webhook_controller = Arc::new(WebhookController::new(webhook_service));

    // Start HTTP server with all routes
    start_http_server(config, webhook_controller, transcoder_repo, background_tasks).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "line_speech_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "line_speech_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
