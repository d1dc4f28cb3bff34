//! Client for an oracle "Functions" network.
//!
//! Submits scored-text requests through a consumer contract, prepares and
//! hosts request secrets, waits for the oracle's fulfillment, and funds the
//! billing subscription.

// Core subsystems
pub mod blockchain;
pub mod fulfillment;
pub mod request;

// Request inputs
pub mod scoring;
pub mod secrets;
pub mod subscription;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fulfillment::{FulfillmentResult, Rendezvous, RequestId};
pub use request::RequestRunner;
