//! Metrics collection.
//!
//! # Metrics
//! - `functions_requests_total` (counter): finished sessions by outcome
//! - `functions_fulfillment_seconds` (histogram): wait time until resolution
//! - `functions_events_total` (counter): delivered events by kind and disposition
//! - `functions_secrets_total` (counter): secrets preparations by mode
//!
//! Without an installed recorder every call is a no-op.

use std::time::Duration;

/// Record the end of a rendezvous session.
pub fn record_request_outcome(outcome: &'static str, waited: Duration) {
    metrics::counter!("functions_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("functions_fulfillment_seconds").record(waited.as_secs_f64());
}

/// Record an event delivered by the listener.
pub fn record_event(kind: &'static str, disposition: &'static str) {
    metrics::counter!(
        "functions_events_total",
        "kind" => kind,
        "disposition" => disposition
    )
    .increment(1);
}

/// Record a secrets preparation.
pub fn record_secrets(mode: &'static str) {
    metrics::counter!("functions_secrets_total", "mode" => mode).increment(1);
}
