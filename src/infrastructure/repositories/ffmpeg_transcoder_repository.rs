use super::transcoder_repository::TranscoderRepository;
use crate::domain::speech::AudioFormat;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Transcoder backed by an `ffmpeg` executable.
///
/// Input and output live in named temp files that are deleted when this
/// call returns or its future is dropped.
pub struct FfmpegTranscoderRepository {
    ffmpeg_path: String,
}

impl FfmpegTranscoderRepository {
    pub fn new(ffmpeg_path: String) -> Self {
        Self { ffmpeg_path }
    }
}

fn temp_audio_file(format: AudioFormat) -> AppResult<NamedTempFile> {
    tempfile::Builder::new()
        .prefix("speech-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()
        .map_err(|e| AppError::Internal(format!("failed to create temp audio file: {}", e)))
}

#[async_trait]
impl TranscoderRepository for FfmpegTranscoderRepository {
    async fn transcode(
        &self,
        audio: &[u8],
        from: AudioFormat,
        to: AudioFormat,
    ) -> AppResult<Vec<u8>> {
        let start_time = std::time::Instant::now();

        let input = temp_audio_file(from)?;
        let output = temp_audio_file(to)?;

        tokio::fs::write(input.path(), audio)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write audio to temp file: {}", e)))?;

        let result = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-i")
            .arg(input.path())
            .arg(output.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, ffmpeg_path = %self.ffmpeg_path, "Failed to execute ffmpeg");
                AppError::ExternalService(format!("failed to execute ffmpeg: {}", e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                status = ?result.status.code(),
                stderr = %stderr,
                "ffmpeg exited with failure"
            );
            return Err(AppError::ExternalService(format!(
                "ffmpeg failed ({}): {}",
                result.status,
                stderr.trim()
            )));
        }

        let transcoded = tokio::fs::read(output.path())
            .await
            .map_err(|e| AppError::Internal(format!("failed to read transcoded audio: {}", e)))?;

        if transcoded.is_empty() {
            return Err(AppError::ExternalService(
                "ffmpeg produced an empty file".to_string(),
            ));
        }

        tracing::info!(
            from = %from,
            to = %to,
            input_size = audio.len(),
            output_size = transcoded.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Transcoding completed"
        );

        Ok(transcoded)
    }

    async fn check(&self) -> AppResult<()> {
        let status = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("ffmpeg not runnable: {}", e)))?;

        if !status.success() {
            return Err(AppError::ServiceUnavailable(format!(
                "ffmpeg -version exited with {}",
                status
            )));
        }

        Ok(())
    }
}
