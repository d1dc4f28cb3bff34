//! Secrets types and errors.

use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from secrets preparation.
#[derive(Debug, Error)]
pub enum SecretsError {
    /// A credential needed for this secrets mode is missing.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Encryption or decryption failed.
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// A key could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signing the inline payload failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Gist API call failed.
    #[error("Gist error: {0}")]
    Gist(String),

    /// The gist token carries the wrong scopes.
    #[error("The provided Github API token does not have permissions to read and write Gists (scopes: {0})")]
    GistScope(String),

    /// A remote secrets URL could not be fetched or parsed.
    #[error("Failed to fetch off-chain secrets from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Remote secrets URLs disagree.
    #[error(
        "Off-chain secrets URLs {url} and {first_url} do not contain the same JSON object. \
         All secrets URLs must have an identical JSON object."
    )]
    Mismatch { url: String, first_url: String },

    /// A DON node has no secrets entry and there is no default.
    #[error("No secrets specified for node {node} and no default secrets found.")]
    MissingNodeSecrets { node: String },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SecretsError {
    /// Whether the error is a failed check of user-supplied data, as opposed
    /// to a failing remote service or missing credential.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SecretsError::Mismatch { .. }
                | SecretsError::MissingNodeSecrets { .. }
                | SecretsError::InvalidKey(_)
        )
    }
}

/// Secrets attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Secrets {
    /// No secrets; the request carries empty bytes.
    None,
    /// Secrets object encrypted by this client and hosted in a private gist.
    Inline(Map<String, Value>),
    /// URLs of secrets documents hosted by the user.
    Remote(Vec<String>),
}

impl Secrets {
    /// Label used in logs and metrics.
    pub fn mode(&self) -> &'static str {
        match self {
            Secrets::None => "none",
            Secrets::Inline(_) => "inline",
            Secrets::Remote(_) => "remote",
        }
    }

    /// Whether anything needs encrypting.
    pub fn is_empty(&self) -> bool {
        match self {
            Secrets::None => true,
            Secrets::Inline(map) => map.is_empty(),
            Secrets::Remote(urls) => urls.is_empty(),
        }
    }
}

/// Encrypted secrets reference ready to be passed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncryptedSecrets {
    /// Ciphertext for the request (`0x` when there are no secrets).
    pub bytes: Bytes,
    /// Gist holding inline secrets, to be deleted after the request.
    pub gist_url: Option<String>,
}

/// Signed inline payload encrypted under the default `"0x0"` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedPayload {
    /// JSON-encoded secrets object.
    pub message: String,
    /// `0x`-prefixed 65-byte signature over `keccak256(message)`.
    pub signature: String,
}
