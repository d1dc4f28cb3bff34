//! Review request subsystem.
//!
//! # Data Flow
//! ```text
//! RequestRunner
//!     → SecretsManager (encrypted secrets, optional gist)
//!     → EventListener (anchored) + Rendezvous
//!     → RequestSubmitter (addReview → RequestSent → request id)
//!     → Fulfillment | Error
//! ```

pub mod runner;
pub mod submitter;

pub use runner::{describe_outcome, Fulfillment, RequestRunner};
pub use submitter::{RequestSubmitter, ReviewRequest};
