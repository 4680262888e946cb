use crate::domain::speech::SynthesisResult;
use crate::error::AppResult;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly, test doubles, ...)
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize text to speech
    ///
    /// Returns the fully buffered audio along with its container format
    ///
    /// # Errors
    /// Returns error if synthesis fails or provider is unavailable
    async fn synthesize(&self, text: &str) -> AppResult<SynthesisResult>;
}
