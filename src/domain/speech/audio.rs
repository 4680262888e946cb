use serde::{Deserialize, Serialize};

/// Audio container formats handled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    M4a,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::M4a => "audio/mp4",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Fully buffered output of the speech synthesizer
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
}

/// Transcoded audio ready to be published under `object_key`
#[derive(Debug, Clone)]
pub struct TranscodedAudio {
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
    pub object_key: String,
}

impl TranscodedAudio {
    pub fn new(message_id: &str, audio_data: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            object_key: object_key(message_id, format),
            audio_data,
            format,
        }
    }
}

/// Storage key for the audio generated from a message: `{message_id}.{ext}`
pub fn object_key(message_id: &str, format: AudioFormat) -> String {
    format!("{}.{}", message_id, format.extension())
}
