pub mod audio;
pub mod error;
pub mod service;

pub use audio::{object_key, AudioFormat, SynthesisResult, TranscodedAudio};
pub use error::SpeechServiceError;
pub use service::{DeliveryOutcome, SpeechService, SpeechServiceApi, MAX_TEXT_CHARS};
