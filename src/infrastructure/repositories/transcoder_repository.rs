use crate::domain::speech::AudioFormat;
use crate::error::AppResult;
use async_trait::async_trait;

/// Converts audio between container formats.
///
/// Implementations own any intermediate files and must remove them before
/// returning, whether or not the conversion succeeded.
#[async_trait]
pub trait TranscoderRepository: Send + Sync {
    /// Convert `audio` from `from` to `to`
    ///
    /// # Errors
    /// Returns error if the conversion fails or produces no output
    async fn transcode(&self, audio: &[u8], from: AudioFormat, to: AudioFormat)
        -> AppResult<Vec<u8>>;

    /// Check the transcoder can run at all (used by readiness checks)
    async fn check(&self) -> AppResult<()>;
}
