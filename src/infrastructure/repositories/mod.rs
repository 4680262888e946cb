pub mod bitly_shortener_repository;
pub mod ffmpeg_transcoder_repository;
pub mod line_reply_repository;
pub mod polly_tts_repository;
pub mod reply_repository;
pub mod s3_storage_repository;
pub mod shortener_repository;
pub mod storage_repository;
pub mod transcoder_repository;
pub mod tts_repository;

pub use bitly_shortener_repository::BitlyShortenerRepository;
pub use ffmpeg_transcoder_repository::FfmpegTranscoderRepository;
pub use line_reply_repository::LineReplyRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use reply_repository::ReplyRepository;
pub use s3_storage_repository::S3StorageRepository;
pub use shortener_repository::ShortenerRepository;
pub use storage_repository::StorageRepository;
pub use transcoder_repository::TranscoderRepository;
pub use tts_repository::TtsRepository;
