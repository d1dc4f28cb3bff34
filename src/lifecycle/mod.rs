//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve RPC URL → Connect client → Load wallet → Build signer
//!
//! Shutdown (shutdown.rs):
//!     Request finished → Stop listener → Clean up gist → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → End fulfillment wait, run cleanup
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
