//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! Request ids and transaction hashes are logged as structured fields; keys,
//! tokens and keyed RPC URLs never are.

pub mod logging;
pub mod metrics;
