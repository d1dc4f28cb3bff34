//! Scored-text request builder.
//!
//! The oracle network executes `sources/ai-review-request.js`; this module
//! reproduces the same request shape and score derivation so a text can be
//! scored locally before paying for an on-chain request.

pub mod client;
pub mod request;

pub use client::ScoringClient;
pub use request::{extract_score, score_from_logprob, CompletionRequest, ScoringError};
