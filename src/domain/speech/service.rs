use super::audio::{AudioFormat, SynthesisResult, TranscodedAudio};
use super::error::SpeechServiceError;
use crate::domain::reply::{ReplyMessage, SPEECH_FAILED_MESSAGE, TEXT_TOO_LONG_MESSAGE};
use crate::infrastructure::repositories::{
    ReplyRepository, ShortenerRepository, StorageRepository, TranscoderRepository, TtsRepository,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest text, in characters, that will be synthesized
pub const MAX_TEXT_CHARS: usize = 200;

/// Container format the chat platform plays back
const TARGET_FORMAT: AudioFormat = AudioFormat::M4a;

/// Which reply a text event ended up with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Audio reply pointing at the shortened URL
    Delivered { url: String },
    /// Text was too long; the length error reply was sent
    Rejected,
    /// An upstream stage failed; the generic failure reply was sent
    Failed,
}

pub struct SpeechService {
    tts_repo: Arc<dyn TtsRepository>,
    transcoder_repo: Arc<dyn TranscoderRepository>,
    storage_repo: Arc<dyn StorageRepository>,
    shortener_repo: Arc<dyn ShortenerRepository>,
    reply_repo: Arc<dyn ReplyRepository>,
    deadline: Duration,
}

impl SpeechService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        transcoder_repo: Arc<dyn TranscoderRepository>,
        storage_repo: Arc<dyn StorageRepository>,
        shortener_repo: Arc<dyn ShortenerRepository>,
        reply_repo: Arc<dyn ReplyRepository>,
        deadline: Duration,
    ) -> Self {
        Self {
            tts_repo,
            transcoder_repo,
            storage_repo,
            shortener_repo,
            reply_repo,
            deadline,
        }
    }
}

#[async_trait]
pub trait SpeechServiceApi: Send + Sync {
    /// Turn the text of one inbound message into a spoken audio reply
    ///
    /// This operation:
    /// - Rejects text longer than [`MAX_TEXT_CHARS`] with a text reply
    /// - Synthesizes, transcodes, publishes and shortens the audio URL
    /// - Replies with the audio, or with a generic failure text
    ///
    /// Exactly one reply is dispatched per call.
    async fn deliver(&self, reply_token: &str, message_id: &str, text: &str) -> DeliveryOutcome;
}

#[async_trait]
impl SpeechServiceApi for SpeechService {
    async fn deliver(&self, reply_token: &str, message_id: &str, text: &str) -> DeliveryOutcome {
        let char_count = text.chars().count();

        tracing::info!(
            message_id = %message_id,
            char_count = char_count,
            "Speech delivery request"
        );

        // 1. Validate length
        if let Err(e) = validate_text(char_count) {
            tracing::info!(message_id = %message_id, error = %e, "Text rejected");
            self.send_reply(reply_token, ReplyMessage::text(TEXT_TOO_LONG_MESSAGE))
                .await;
            return DeliveryOutcome::Rejected;
        }

        // 2. Run the upstream stages under a deadline
        let start_time = Instant::now();
        let result = match tokio::time::timeout(
            self.deadline,
            self.produce_audio_url(message_id, text),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SpeechServiceError::Timeout(self.deadline.as_secs())),
        };

        // 3. Reply
        match result {
            Ok(url) => {
                tracing::info!(
                    message_id = %message_id,
                    url = %url,
                    latency_ms = start_time.elapsed().as_millis(),
                    "Speech audio published"
                );
                self.send_reply(reply_token, ReplyMessage::audio(url.clone(), char_count))
                    .await;
                DeliveryOutcome::Delivered { url }
            }
            Err(e) => {
                tracing::error!(
                    message_id = %message_id,
                    error = %e,
                    latency_ms = start_time.elapsed().as_millis(),
                    "Speech pipeline failed"
                );
                self.send_reply(reply_token, ReplyMessage::text(SPEECH_FAILED_MESSAGE))
                    .await;
                DeliveryOutcome::Failed
            }
        }
    }
}

impl SpeechService {
    /// Synthesize → transcode → publish → shorten
    async fn produce_audio_url(
        &self,
        message_id: &str,
        text: &str,
    ) -> Result<String, SpeechServiceError> {
        let synthesis = self.tts_repo.synthesize(text).await?;
        tracing::debug!(
            message_id = %message_id,
            audio_size = synthesis.audio_data.len(),
            format = %synthesis.format,
            "Speech synthesized"
        );

        let transcoded = self.transcode(message_id, synthesis).await?;

        // The buffer moves into the upload and is dropped with it
        let TranscodedAudio {
            audio_data,
            format,
            object_key,
        } = transcoded;
        let public_url = self
            .storage_repo
            .put_object(&object_key, audio_data, format.content_type())
            .await?;
        tracing::debug!(message_id = %message_id, public_url = %public_url, "Audio uploaded");

        let short_url = self.shortener_repo.shorten(&public_url).await?;

        Ok(short_url)
    }

    async fn transcode(
        &self,
        message_id: &str,
        synthesis: SynthesisResult,
    ) -> Result<TranscodedAudio, SpeechServiceError> {
        let audio_data = self
            .transcoder_repo
            .transcode(&synthesis.audio_data, synthesis.format, TARGET_FORMAT)
            .await?;

        if audio_data.is_empty() {
            return Err(SpeechServiceError::Dependency(
                "transcoder produced no audio".to_string(),
            ));
        }

        tracing::debug!(
            message_id = %message_id,
            input_size = synthesis.audio_data.len(),
            output_size = audio_data.len(),
            "Audio transcoded"
        );

        Ok(TranscodedAudio::new(message_id, audio_data, TARGET_FORMAT))
    }

    /// Dispatch a single reply. Delivery failures are logged, never retried.
    async fn send_reply(&self, reply_token: &str, message: ReplyMessage) {
        let kind = message.kind();
        if let Err(e) = self.reply_repo.reply(reply_token, vec![message]).await {
            tracing::error!(error = %e, kind = kind, "Failed to send reply");
        }
    }
}

fn validate_text(char_count: usize) -> Result<(), SpeechServiceError> {
    if char_count > MAX_TEXT_CHARS {
        return Err(SpeechServiceError::Invalid(format!(
            "text has {} characters, limit is {}",
            char_count, MAX_TEXT_CHARS
        )));
    }
    Ok(())
}
