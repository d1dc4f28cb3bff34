//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.
//! Credentials never live here; they are read from the environment (see
//! [`crate::config::env`]).

use serde::{Deserialize, Serialize};

/// Root configuration for the functions client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Blockchain connection settings.
    pub blockchain: BlockchainConfig,

    /// Oracle/consumer contract addresses and request parameters.
    pub functions: FunctionsConfig,

    /// Fulfillment wait settings.
    pub rendezvous: RendezvousConfig,

    /// Secrets handling.
    pub secrets: SecretsConfig,

    /// Scored-text completion API.
    pub scoring: ScoringConfig,

    /// Subscription funding.
    pub subscription: SubscriptionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL. May contain an `{api_key}` placeholder that is
    /// filled from the RPC key environment variable.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (11155111 for Sepolia, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations to wait for the request transaction.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for a transaction to be confirmed, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://alien-wild-friday.ethereum-sepolia.discover.quiknode.pro/{api_key}"
                .to_string(),
            failover_urls: Vec::new(),
            chain_id: 11_155_111,
            rpc_timeout_secs: 10,
            confirmation_blocks: 2,
            confirmation_timeout_secs: 180,
            max_gas_price_gwei: 500,
        }
    }
}

/// Oracle request configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FunctionsConfig {
    /// Address of the oracle contract (DON key, node list, callback error events).
    pub oracle_address: String,

    /// Address of the consumer contract that issues requests.
    pub consumer_address: String,

    /// Subscription paying for requests.
    pub subscription_id: u64,

    /// Gas limit for the on-chain fulfillment callback.
    pub callback_gas_limit: u32,

    /// Gas limit override for the request transaction itself.
    pub request_gas_limit: u64,

    /// Path to the JavaScript source executed by the oracle network.
    pub source_path: String,

    /// Subject (restaurant) identifier passed to the consumer.
    pub subject_id: u64,

    /// Free-text payload stored alongside the request.
    pub review_text: String,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            oracle_address: "0x649a2C205BE7A3d5e99206CEEFF30c794f0E31EC".to_string(),
            consumer_address: String::new(),
            subscription_id: 0,
            callback_gas_limit: 300_000,
            request_gas_limit: 5_500_000,
            source_path: "sources/ai-review-request.js".to_string(),
            subject_id: 1,
            review_text: "Some review text".to_string(),
        }
    }
}

/// Fulfillment rendezvous configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RendezvousConfig {
    /// Maximum time to wait for fulfillment, in seconds.
    pub timeout_secs: u64,

    /// How often the pending store is checked, in milliseconds.
    pub poll_interval_ms: u64,

    /// How often the event listener queries logs, in milliseconds.
    pub listener_interval_ms: u64,
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            poll_interval_ms: 1000,
            listener_interval_ms: 2000,
        }
    }
}

/// Where request secrets come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsMode {
    /// No secrets; the request carries empty bytes.
    None,
    /// Inline secrets encrypted and uploaded to a private gist.
    Inline,
    /// Remote secrets hosted by the user at `urls`.
    Remote,
}

/// Secrets configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Secrets source.
    pub mode: SecretsMode,

    /// Remote secrets URLs (used in `remote` mode).
    pub urls: Vec<String>,

    /// Gist API base URL.
    pub gist_api_url: String,

    /// Delete the uploaded gist once the request finishes.
    pub cleanup_gist: bool,

    /// Timeout for fetching remote secrets, in milliseconds.
    pub fetch_timeout_ms: u64,

    /// Maximum accepted size of a remote secrets document, in bytes.
    pub max_content_length: usize,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            mode: SecretsMode::Inline,
            urls: Vec::new(),
            gist_api_url: "https://api.github.com".to_string(),
            cleanup_gist: true,
            fetch_timeout_ms: 3000,
            max_content_length: 1_000_000,
        }
    }
}

/// Scored-text completion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Completions endpoint.
    pub api_url: String,

    /// Classifier model name.
    pub model: String,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/completions".to_string(),
            model: "model-detect-v2".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Subscription funding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// LINK token contract.
    pub link_token_address: String,

    /// Functions billing registry proxy.
    pub registry_address: String,

    /// Amount of LINK to fund, as a decimal string.
    pub link_amount: String,

    /// Transfer LINK to the subscription before authorizing the consumer.
    pub fund: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            link_token_address: "0x779877A7B0D9E8603169DdbD7836e478b4624789".to_string(),
            registry_address: "0x3c79f56407DCB9dc9b852D139a317246f43750Cc".to_string(),
            link_amount: "1".to_string(),
            fund: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.rendezvous.timeout_secs, 300);
        assert_eq!(config.rendezvous.poll_interval_ms, 1000);
        assert_eq!(config.functions.request_gas_limit, 5_500_000);
        assert_eq!(config.blockchain.confirmation_blocks, 2);
        assert_eq!(config.secrets.mode, SecretsMode::Inline);
        assert_eq!(config.scoring.model, "model-detect-v2");
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            [functions]
            consumer_address = "0x0000000000000000000000000000000000000001"
            subscription_id = 42

            [secrets]
            mode = "remote"
            urls = ["https://example.com/a.json"]
            "#,
        )
        .unwrap();
        assert_eq!(config.functions.subscription_id, 42);
        assert_eq!(config.secrets.mode, SecretsMode::Remote);
        assert_eq!(config.secrets.urls.len(), 1);
        // untouched sections keep defaults
        assert_eq!(config.rendezvous.timeout_secs, 300);
        assert_eq!(config.secrets.fetch_timeout_ms, 3000);
    }
}
