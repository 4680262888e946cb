use super::tts_repository::TtsRepository;
use crate::domain::speech::{AudioFormat, SynthesisResult};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    voice_id: String,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>, voice_id: String) -> Self {
        Self {
            polly_client,
            voice_id,
        }
    }

    /// Call AWS Polly and buffer the whole audio stream
    async fn call_polly(&self, text: &str) -> AppResult<Vec<u8>> {
        let voice_id = VoiceId::from(self.voice_id.as_str());
        let engine = Engine::Standard;

        tracing::info!(
            voice_id = ?voice_id,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.chars().count(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .text_type(TextType::Text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice_id = %self.voice_id,
                    engine = ?engine,
                    "AWS Polly synthesize_speech failed"
                );
                AppError::ExternalService(format!("AWS Polly error: {}", e))
            })?;

        tracing::debug!("AWS Polly synthesize_speech successful, reading audio stream");

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            AppError::ExternalService(format!("Failed to read audio stream: {}", e))
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str) -> AppResult<SynthesisResult> {
        let start_time = std::time::Instant::now();

        let audio_data = self.call_polly(text).await?;

        tracing::info!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(SynthesisResult {
            audio_data,
            format: AudioFormat::Mp3,
        })
    }
}
