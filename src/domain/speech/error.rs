use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SpeechServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("pipeline timed out after {0}s")]
    Timeout(u64),
}

impl From<AppError> for SpeechServiceError {
    fn from(err: AppError) -> Self {
        SpeechServiceError::Dependency(err.to_string())
    }
}
