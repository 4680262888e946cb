pub mod model;

pub use model::{
    estimate_duration_ms, ReplyMessage, ReplyRequest, SPEECH_FAILED_MESSAGE,
    TEXT_TOO_LONG_MESSAGE,
};
