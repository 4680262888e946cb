use super::shortener_repository::ShortenerRepository;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;

const BITLY_SHORTEN_PATH: &str = "/v3/shorten";

/// Bitly v3 response envelope. `data` is an empty array on errors.
#[derive(Debug, Deserialize)]
struct BitlyShortenResponse {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    status_txt: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

pub struct BitlyShortenerRepository {
    access_token: String,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl BitlyShortenerRepository {
    pub fn new(access_token: String, api_base_url: String) -> Self {
        Self {
            access_token,
            api_base_url,
            http_client: reqwest::Client::new(),
        }
    }

    fn shorten_url(&self, long_url: &str) -> String {
        format!(
            "{}{}?access_token={}&longUrl={}",
            self.api_base_url.trim_end_matches('/'),
            BITLY_SHORTEN_PATH,
            urlencoding::encode(&self.access_token),
            urlencoding::encode(long_url)
        )
    }
}

/// Force the `https` scheme on a shortened URL
fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

#[async_trait]
impl ShortenerRepository for BitlyShortenerRepository {
    async fn shorten(&self, long_url: &str) -> AppResult<String> {
        let response = self
            .http_client
            .get(self.shorten_url(long_url))
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the access token
                AppError::ExternalService(format!("Bitly request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalService(format!(
                "Bitly returned {}: {}",
                status, error_text
            )));
        }

        let body: BitlyShortenResponse = response
            .json()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!(
                    "Failed to parse Bitly response: {}",
                    e.without_url()
                ))
            })?;

        if let Some(code) = body.status_code {
            if code != 200 {
                return Err(AppError::ExternalService(format!(
                    "Bitly error {}: {}",
                    code,
                    body.status_txt.as_deref().unwrap_or("unknown")
                )));
            }
        }

        let short_url = body
            .data
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::ExternalService("Bitly response has no data.url".to_string())
            })?;

        let short_url = force_https(short_url);
        tracing::info!(long_url = %long_url, short_url = %short_url, "URL shortened");

        Ok(short_url)
    }
}
