//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!
//! credentials
//!     → env.rs (read on first use, never logged)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    BlockchainConfig, ClientConfig, FunctionsConfig, ObservabilityConfig, RendezvousConfig,
    ScoringConfig, SecretsConfig, SecretsMode, SubscriptionConfig,
};
pub use validation::{required_address, validate_config, ValidationError};
