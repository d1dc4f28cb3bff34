//! Top-level error taxonomy.
//!
//! Subsystem errors fold into five categories. A timeout ("the oracle never
//! answered") is kept apart from a callback error ("the oracle answered but
//! the consumer's handler failed").

use alloy::primitives::Bytes;
use std::fmt;
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::{ConfigError, ValidationError};
use crate::fulfillment::FulfillmentError;
use crate::scoring::ScoringError;
use crate::secrets::SecretsError;

/// Failure of the consumer contract's fulfillment handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// Reverted with a reason string.
    Formatted(String),
    /// Reverted with raw data.
    Raw(Bytes),
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackError::Formatted(reason) => write!(
                f,
                "error encountered when calling fulfillRequest in the consumer contract: {}. \
                 Ensure the fulfillment handler is correct and the callback gas limit is sufficient",
                reason
            ),
            CallbackError::Raw(data) => write!(
                f,
                "raw error in contract request fulfillment: {}",
                String::from_utf8_lossy(data)
            ),
        }
    }
}

/// Errors surfaced by client commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration or credentials.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Data failed a check (score, secrets documents, amounts).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An RPC endpoint, HTTP API or the ledger rejected a call.
    #[error("Remote error: {0}")]
    Remote(String),

    /// No fulfillment within the wait window.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The consumer's fulfillment handler failed.
    #[error("Callback error: {0}")]
    Callback(CallbackError),

    /// Interrupted by the operator.
    #[error("Interrupted")]
    Interrupted,
}

impl Error {
    /// Category label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Validation(_) => "validation",
            Error::Remote(_) => "remote",
            Error::Timeout(_) => "timeout",
            Error::Callback(_) => "callback",
            Error::Interrupted => "interrupted",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type for client commands.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Configuration(e.to_string())
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Configuration(e.to_string())
    }
}

impl From<BlockchainError> for Error {
    fn from(e: BlockchainError) -> Self {
        match e {
            BlockchainError::Wallet(_) | BlockchainError::ChainMismatch { .. } => {
                Error::Configuration(e.to_string())
            }
            BlockchainError::Abi(_) => Error::Validation(e.to_string()),
            BlockchainError::ConfirmationTimeout(_) => Error::Timeout(e.to_string()),
            _ => Error::Remote(e.to_string()),
        }
    }
}

impl From<SecretsError> for Error {
    fn from(e: SecretsError) -> Self {
        match e {
            SecretsError::MissingCredential(_) => Error::Configuration(e.to_string()),
            ref err if err.is_validation() => Error::Validation(e.to_string()),
            _ => Error::Remote(e.to_string()),
        }
    }
}

impl From<ScoringError> for Error {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::MissingField(_) | ScoringError::NotInteger(_) => {
                Error::Validation(e.to_string())
            }
            _ => Error::Remote(e.to_string()),
        }
    }
}

impl From<FulfillmentError> for Error {
    fn from(e: FulfillmentError) -> Self {
        match e {
            FulfillmentError::TimedOut { .. } => Error::Timeout(e.to_string()),
            FulfillmentError::AlreadyResolved { .. } => Error::Validation(e.to_string()),
        }
    }
}
