//! Gist hosting for encrypted inline secrets.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::secrets::types::SecretsError;

/// Header listing the scopes of a classic token.
const SCOPES_HEADER: &str = "x-oauth-scopes";

#[derive(Debug, Deserialize)]
struct CreatedGist {
    html_url: String,
}

/// Client for creating and deleting private gists.
#[derive(Clone)]
pub struct GistClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GistClient {
    /// Create a client against `api_url` (e.g. `https://api.github.com`).
    pub fn new(http: Client, api_url: &str, token: String) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn headers(&self, scheme: &str) -> Result<HeaderMap, SecretsError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("{} {}", scheme, self.token))
            .map_err(|_| SecretsError::MissingCredential("gist token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Check the token may only read and write gists.
    ///
    /// Fine-grained tokens carry no scopes header and are accepted as is.
    pub async fn check_token_scope(&self) -> Result<(), SecretsError> {
        let res = self
            .http
            .get(format!("{}/user", self.api_url))
            .headers(self.headers("Bearer")?)
            .send()
            .await
            .map_err(|e| SecretsError::Gist(format!("Failed to get user data: {}", e)))?;

        if res.status() != StatusCode::OK {
            return Err(SecretsError::Gist(format!(
                "Failed to get user data: {}",
                res.status()
            )));
        }

        let scopes: Option<Vec<String>> = res
            .headers()
            .get(SCOPES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect());

        if let Some(scopes) = scopes {
            if scopes.first().map(String::as_str) != Some("gist") {
                return Err(SecretsError::GistScope(scopes.join(", ")));
            }
            if scopes.len() > 1 {
                tracing::warn!(
                    scopes = %scopes.join(", "),
                    "The provided Github API token has additional permissions beyond reading and writing to Gists"
                );
            }
        }
        Ok(())
    }

    /// Upload `content` as a private single-file gist and return its page URL.
    pub async fn create(&self, content: &serde_json::Value) -> Result<String, SecretsError> {
        self.check_token_scope().await?;

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let file_name = format!("encrypted-functions-request-data-{}.json", now_ms);
        let body = json!({
            "public": false,
            "files": {
                file_name: { "content": serde_json::to_string(content)? }
            }
        });

        let res = self
            .http
            .post(format!("{}/gists", self.api_url))
            .headers(self.headers("token")?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SecretsError::Gist(format!("Failed to create Gist: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(SecretsError::Gist(format!("Failed to create Gist: {}", status)));
        }

        let created: CreatedGist = res
            .json()
            .await
            .map_err(|e| SecretsError::Gist(format!("Failed to create Gist: {}", e)))?;

        tracing::info!(gist_url = %created.html_url, "Created encrypted secrets Gist");
        Ok(created.html_url)
    }

    /// Delete the gist at `gist_url`.
    pub async fn delete(&self, gist_url: &str) -> Result<(), SecretsError> {
        let id = gist_id(gist_url)
            .ok_or_else(|| SecretsError::Gist(format!("Cannot extract Gist id from {}", gist_url)))?;

        let res = self
            .http
            .delete(format!("{}/gists/{}", self.api_url, id))
            .headers(self.headers("Bearer")?)
            .send()
            .await
            .map_err(|e| SecretsError::Gist(format!("Error deleting Gist {}: {}", gist_url, e)))?;

        if res.status() != StatusCode::NO_CONTENT {
            return Err(SecretsError::Gist(format!(
                "Failed to delete Gist {}: {}",
                gist_url,
                res.status()
            )));
        }

        tracing::info!(gist_url = %gist_url, "Off-chain secrets Gist deleted");
        Ok(())
    }
}

/// Extract the hexadecimal gist id that ends a gist URL.
pub fn gist_id(gist_url: &str) -> Option<&str> {
    let (_, id) = gist_url.trim_end_matches('/').rsplit_once('/')?;
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(id)
    } else {
        None
    }
}
