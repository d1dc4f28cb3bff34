//! Request secrets subsystem.
//!
//! # Responsibilities
//! - Encrypt secrets to the DON public key (cipher.rs)
//! - Host encrypted inline secrets in a private gist and clean it up (gist.rs)
//! - Verify user-hosted secrets documents (remote.rs)
//! - Tie the steps together per secrets mode (manager.rs)
//!
//! Any verification failure aborts the submission; there is no degraded mode.

pub mod cipher;
pub mod gist;
pub mod manager;
pub mod remote;
pub mod types;

pub use cipher::DonPublicKey;
pub use gist::GistClient;
pub use manager::SecretsManager;
pub use types::{EncryptedSecrets, Secrets, SecretsError};
