//! Environment-provided credentials.
//!
//! Secrets are never part of the config file. Each lookup happens at the point
//! of first use so commands that do not need a credential do not require it.

use crate::config::loader::ConfigError;

/// API key for the scored-text completion service.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Deployer private key used to sign transactions and inline secrets.
pub const DEPLOYER_PRIVATE_KEY: &str = "DEPLOYER_PRIVATE_KEY";

/// Token for gist create/delete.
pub const GITHUB_API_TOKEN: &str = "GITHUB_API_TOKEN";

/// RPC endpoint key substituted into `blockchain.rpc_url`.
pub const RPC_API_KEY: &str = "QUICKNODE_API_KEY";

/// Placeholder in the RPC URL replaced by the RPC key.
pub const RPC_KEY_PLACEHOLDER: &str = "{api_key}";

/// Read a required environment variable; empty values count as missing.
pub fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

/// Fill the `{api_key}` placeholder of an RPC URL.
///
/// URLs without the placeholder are returned unchanged and do not require the
/// environment variable.
pub fn resolve_rpc_url(template: &str) -> Result<String, ConfigError> {
    if !template.contains(RPC_KEY_PLACEHOLDER) {
        return Ok(template.to_string());
    }
    let key = require(RPC_API_KEY)?;
    Ok(template.replace(RPC_KEY_PLACEHOLDER, &key))
}
