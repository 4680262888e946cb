use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // LINE Messaging API
    pub line_channel_token: String,
    pub line_channel_secret: String,
    pub line_api_base_url: String,
    // Bitly
    pub bitly_token: String,
    pub bitly_api_base_url: String,
    // S3
    pub s3_bucket_name: String,
    pub s3_public_base_url: String,
    // Speech pipeline
    pub polly_voice_id: String,
    pub ffmpeg_path: String,
    pub pipeline_timeout_secs: u64,
    pub async_processing: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

pub const DEFAULT_AWS_REGION: &str = "ap-northeast-1";
pub const DEFAULT_VOICE_ID: &str = "Mizuki";

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let aws_region = env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string());

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            line_channel_token: env::var("LINE_CHANNEL_TOKEN")?,
            line_channel_secret: env::var("LINE_CHANNEL_SECRET")?,
            line_api_base_url: env::var("LINE_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.line.me".to_string()),
            bitly_token: env::var("BITLY_TOKEN")?,
            bitly_api_base_url: env::var("BITLY_API_BASE_URL")
                .unwrap_or_else(|_| "https://api-ssl.bitly.com".to_string()),
            s3_bucket_name: env::var("S3_BUCKET_NAME")?,
            s3_public_base_url: env::var("S3_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| default_public_base_url(&aws_region)),
            polly_voice_id: env::var("POLLY_VOICE_ID")
                .unwrap_or_else(|_| DEFAULT_VOICE_ID.to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            pipeline_timeout_secs: parse_pipeline_timeout(
                &env::var("PIPELINE_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string()),
            )?,
            async_processing: env::var("WEBHOOK_ASYNC_PROCESSING")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            aws_region,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }
}

/// Per-event deadline in seconds; must be at least 1
fn parse_pipeline_timeout(raw: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let secs: u64 = raw.trim().parse()?;
    if secs == 0 {
        return Err("PIPELINE_TIMEOUT_SECS must be greater than zero".into());
    }
    Ok(secs)
}

/// Regional path-style S3 endpoint, e.g. `https://s3-ap-northeast-1.amazonaws.com`
pub fn default_public_base_url(region: &str) -> String {
    format!("https://s3-{}.amazonaws.com", region)
}
