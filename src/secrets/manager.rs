//! Secrets preparation for a request.
//!
//! # Flow
//! ```text
//! Inline { apiKey }                      Remote [url, ...]
//!   → sign keccak256(json) (deployer)      → fetch + compare documents
//!   → encrypt {message, signature}         → check node coverage
//!   → {"0x0": base64} → private gist       → encrypt(urls.join(" "))
//!   → encrypt("<gist>/raw")
//! ```

use alloy::hex;
use alloy::primitives::{keccak256, Address, Bytes};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::blockchain::contracts::FunctionsOracle;
use crate::blockchain::{BlockchainClient, Wallet};
use crate::config::env::{self, GITHUB_API_TOKEN};
use crate::config::SecretsConfig;
use crate::observability::metrics;
use crate::secrets::cipher::{self, DonPublicKey};
use crate::secrets::gist::GistClient;
use crate::secrets::remote::{self, DEFAULT_NODE_KEY};
use crate::secrets::types::{EncryptedSecrets, Secrets, SecretsError, SignedPayload};

/// Prepares encrypted secrets references.
#[derive(Clone)]
pub struct SecretsManager {
    http: Client,
    config: SecretsConfig,
}

impl SecretsManager {
    /// Create a manager with an HTTP client bounded by the fetch timeout.
    pub fn new(config: SecretsConfig) -> Result<Self, SecretsError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .user_agent(concat!("functions-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SecretsError::Gist(format!("HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// Gist client using `GITHUB_API_TOKEN`.
    pub fn gist_client(&self) -> Result<GistClient, SecretsError> {
        let token = env::require(GITHUB_API_TOKEN)
            .map_err(|e| SecretsError::MissingCredential(e.to_string()))?;
        Ok(GistClient::new(self.http.clone(), &self.config.gist_api_url, token))
    }

    /// Encrypt `secrets`, reading the DON key and node list from the oracle.
    ///
    /// `wallet` is required only for inline secrets.
    pub async fn prepare(
        &self,
        secrets: &Secrets,
        client: &BlockchainClient,
        oracle: Address,
        wallet: Option<&Wallet>,
    ) -> Result<EncryptedSecrets, crate::Error> {
        if secrets.is_empty() {
            tracing::info!("No secrets to encrypt");
            return Ok(EncryptedSecrets::default());
        }

        let key_bytes = client
            .call(oracle, FunctionsOracle::getDONPublicKeyCall {})
            .await?;
        let don_key = DonPublicKey::from_bytes(&key_bytes)?;

        let encrypted = match secrets {
            Secrets::None => EncryptedSecrets::default(),
            Secrets::Inline(map) => {
                let wallet = wallet.ok_or_else(|| {
                    SecretsError::MissingCredential(
                        "signer private key is required to encrypt inline secrets".into(),
                    )
                })?;
                let gist = self.gist_client()?;
                self.prepare_inline(map, &don_key, wallet, &gist).await?
            }
            Secrets::Remote(urls) => {
                let nodes = client
                    .call(oracle, FunctionsOracle::getAllNodePublicKeysCall {})
                    .await?
                    .nodes;
                self.prepare_remote(urls, &don_key, &nodes).await?
            }
        };

        metrics::record_secrets(secrets.mode());
        Ok(encrypted)
    }

    /// Sign, encrypt and upload inline secrets.
    pub async fn prepare_inline(
        &self,
        secrets: &Map<String, Value>,
        don_key: &DonPublicKey,
        wallet: &Wallet,
        gist: &GistClient,
    ) -> Result<EncryptedSecrets, SecretsError> {
        let message = serde_json::to_string(secrets)?;
        let payload = encrypt_with_signature(wallet, don_key, message).await?;

        let offchain = json!({ DEFAULT_NODE_KEY: BASE64.encode(payload) });
        let gist_url = gist.create(&offchain).await?;

        let reference = cipher::encrypt(don_key, format!("{}/raw", gist_url).as_bytes())?;
        Ok(EncryptedSecrets {
            bytes: Bytes::from(reference),
            gist_url: Some(gist_url),
        })
    }

    /// Verify user-hosted secrets and encrypt their URL list.
    pub async fn prepare_remote(
        &self,
        urls: &[String],
        don_key: &DonPublicKey,
        nodes: &[Address],
    ) -> Result<EncryptedSecrets, SecretsError> {
        remote::verify_remote_secrets(&self.http, urls, nodes, self.config.max_content_length)
            .await?;

        let reference = cipher::encrypt(don_key, urls.join(" ").as_bytes())?;
        Ok(EncryptedSecrets {
            bytes: Bytes::from(reference),
            gist_url: None,
        })
    }

    /// Verify user-hosted secrets against the oracle's node list without encrypting.
    pub async fn verify_remote(
        &self,
        urls: &[String],
        client: &BlockchainClient,
        oracle: Address,
    ) -> Result<(), crate::Error> {
        let nodes = client
            .call(oracle, FunctionsOracle::getAllNodePublicKeysCall {})
            .await?
            .nodes;
        remote::verify_remote_secrets(&self.http, urls, &nodes, self.config.max_content_length)
            .await?;
        Ok(())
    }
}

/// Sign `message` with the deployer key and encrypt `{message, signature}`.
pub async fn encrypt_with_signature(
    wallet: &Wallet,
    don_key: &DonPublicKey,
    message: String,
) -> Result<Vec<u8>, SecretsError> {
    let signature = wallet
        .sign_hash(keccak256(message.as_bytes()))
        .await
        .map_err(|e| SecretsError::Signing(e.to_string()))?;

    let payload = SignedPayload {
        message,
        signature: hex::encode_prefixed(signature.as_bytes()),
    };
    cipher::encrypt(don_key, serde_json::to_string(&payload)?.as_bytes())
}
