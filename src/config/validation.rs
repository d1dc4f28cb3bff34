//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll interval below deadline)
//! - Check that configured contract addresses parse
//!
//! Returns all validation errors, not just the first. Addresses left empty are
//! accepted here and rejected by the command that needs them.

use std::fmt;

use alloy::primitives::Address;

use crate::config::schema::{ClientConfig, SecretsMode};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.blockchain.rpc_url.trim().is_empty() {
        errors.push(ValidationError::new("blockchain.rpc_url", "must not be empty"));
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.blockchain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }

    check_address(&mut errors, "functions.oracle_address", &config.functions.oracle_address);
    check_address(&mut errors, "functions.consumer_address", &config.functions.consumer_address);
    check_address(
        &mut errors,
        "subscription.link_token_address",
        &config.subscription.link_token_address,
    );
    check_address(
        &mut errors,
        "subscription.registry_address",
        &config.subscription.registry_address,
    );

    if config.functions.callback_gas_limit == 0 {
        errors.push(ValidationError::new("functions.callback_gas_limit", "must be greater than 0"));
    }

    let rendezvous = &config.rendezvous;
    if rendezvous.timeout_secs == 0 {
        errors.push(ValidationError::new("rendezvous.timeout_secs", "must be greater than 0"));
    }
    if rendezvous.poll_interval_ms == 0 {
        errors.push(ValidationError::new("rendezvous.poll_interval_ms", "must be greater than 0"));
    } else if rendezvous.poll_interval_ms > rendezvous.timeout_secs.saturating_mul(1000) {
        errors.push(ValidationError::new(
            "rendezvous.poll_interval_ms",
            "must not exceed rendezvous.timeout_secs",
        ));
    }
    if rendezvous.listener_interval_ms == 0 {
        errors.push(ValidationError::new(
            "rendezvous.listener_interval_ms",
            "must be greater than 0",
        ));
    }

    if config.secrets.mode == SecretsMode::Remote && config.secrets.urls.is_empty() {
        errors.push(ValidationError::new(
            "secrets.urls",
            "remote secrets mode requires at least one URL",
        ));
    }
    for url in &config.secrets.urls {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new("secrets.urls", format!("invalid URL '{}'", url)));
        }
    }
    if config.secrets.gist_api_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("secrets.gist_api_url", "invalid URL"));
    }
    if config.scoring.api_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("scoring.api_url", "invalid URL"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse an address a command cannot run without.
pub fn required_address(field: &'static str, value: &str) -> Result<Address, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must be set"));
    }
    value
        .parse::<Address>()
        .map_err(|_| ValidationError::new(field, format!("invalid address '{}'", value)))
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.is_empty() && value.parse::<Address>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid address '{}'", value)));
    }
}
