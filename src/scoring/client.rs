//! Direct calls to the completion API, for previewing a score locally.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::ScoringConfig;
use crate::scoring::request::{extract_score, CompletionRequest, ScoringError};

/// Client for the scored-text completion API.
pub struct ScoringClient {
    http: Client,
    config: ScoringConfig,
    api_key: String,
}

impl ScoringClient {
    /// Create a client authenticating with `api_key`.
    pub fn new(config: ScoringConfig, api_key: String) -> Result<Self, ScoringError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScoringError::Http(e.to_string()))?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Score `text` (0–100, likelihood of being machine-generated).
    pub async fn score(&self, text: &str) -> Result<u64, ScoringError> {
        let body = CompletionRequest::for_text(text, &self.config.model);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| ScoringError::Http("API key is not a valid header value".into()))?,
        );

        tracing::info!(url = %self.config.api_url, model = %self.config.model, "HTTP POST to completion API");

        let res = self
            .http
            .post(&self.config.api_url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoringError::Http(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ScoringError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = res
            .json()
            .await
            .map_err(|e| ScoringError::Http(format!("No data returned by API: {}", e)))?;
        extract_score(&data)
    }
}
