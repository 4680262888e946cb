use anyhow::Result;
use line_speech_backend::{
    controllers::webhook::WebhookController,
    domain::{
        speech::SpeechService,
        webhook::{SignatureVerifier, WebhookService},
    },
    infrastructure::{
        http::build_router,
        repositories::TranscoderRepository,
    },
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;


use api_client::{ApiResponse, TestClient};
use fakes::{CallLog, FakeReply, FakeShortener, FakeStorage, FakeTranscoder, FakeTts, Failures};

pub const TEST_CHANNEL_SECRET: &str = "test-channel-secret";

/// How the app under test is wired
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub failures: Failures,
    pub async_processing: bool,
    pub pipeline_timeout: Duration,
    pub transcoder_available: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            failures: Failures::default(),
            async_processing: false,
            pipeline_timeout: Duration::from_secs(5),
            transcoder_available: true,
        }
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub calls: Arc<CallLog>,
    pub verifier: SignatureVerifier,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            TestContext::with_options(TestOptions::default())
                .await
                .expect("Failed to start test app")
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Server task ends with the test runtime
        }
    }
}

impl TestContext {
    pub async fn with_failures(failures: Failures) -> Result<Self> {
        Self::with_options(TestOptions {
            failures,
            ..TestOptions::default()
        })
        .await
    }

    pub async fn with_options(options: TestOptions) -> Result<Self> {
        let calls = Arc::new(CallLog::default());
        let verifier = SignatureVerifier::new(TEST_CHANNEL_SECRET.to_string());

        let transcoder_repo: Arc<dyn TranscoderRepository> = Arc::new(FakeTranscoder {
            log: calls.clone(),
            failures: options.failures.clone(),
            available: options.transcoder_available,
        });

        let speech_service = Arc::new(SpeechService::new(
            Arc::new(FakeTts {
                log: calls.clone(),
                failures: options.failures.clone(),
            }),
            transcoder_repo.clone(),
            Arc::new(FakeStorage {
                log: calls.clone(),
                failures: options.failures.clone(),
            }),
            Arc::new(FakeShortener {
                log: calls.clone(),
                failures: options.failures.clone(),
            }),
            Arc::new(FakeReply {
                log: calls.clone(),
                failures: options.failures.clone(),
            }),
            options.pipeline_timeout,
        ));
        let webhook_service = Arc::new(WebhookService::new(
            verifier.clone(),
            speech_service,
            options.async_processing,
        ));
        let webhook_controller = Arc::new(WebhookController::new(webhook_service));

        let app = build_router(webhook_controller, transcoder_repo);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            client: TestClient::new(&base_url),
            calls,
            verifier,
        })
    }

    /// POST a webhook body signed with the test channel secret
    pub async fn post_signed(&self, body: &Value) -> Result<ApiResponse> {
        let bytes = serde_json::to_vec(body)?;
        let signature = self
            .verifier
            .sign(&bytes)
            .expect("Failed to sign webhook body");
        self.client
            .post_raw("/webhook", bytes, &[("X-Line-Signature", signature.as_str())])
            .await
    }

    /// Wait until `count` replies have been recorded (for async processing)
    pub async fn wait_for_replies(&self, count: usize) {
        for _ in 0..50 {
            if self.calls.replies().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

pub fn text_event(reply_token: &str, message_id: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "source": {"type": "user", "userId": "U0000000000000000000000000000000"},
        "timestamp": 1_700_000_000_000u64,
        "message": {"id": message_id, "type": "text", "text": text}
    })
}

pub fn audio_event(reply_token: &str, message_id: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "message": {"id": message_id, "type": "audio", "duration": 1200}
    })
}

pub fn webhook_body(events: Vec<Value>) -> Value {
    json!({
        "destination": "U1111111111111111111111111111111",
        "events": events
    })
}
