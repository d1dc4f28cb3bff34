//! Request/fulfillment rendezvous.
//!
//! A session waits for exactly one of: a recorded result for its request id,
//! or the deadline. Polling and the deadline are two timers raced in one
//! `select!`; whichever completes first ends the loop and both are dropped.
//!
//! ```text
//! listener ──record──▶ PendingStore ◀──take── poll tick ─┐
//!                                                         ├─▶ resolve once
//!                          deadline ──take_or_close───────┘
//! ```

use std::time::Duration;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use crate::config::RendezvousConfig;
use crate::fulfillment::store::PendingStore;
use crate::fulfillment::types::{
    FulfillmentError, FulfillmentResult, Request, RequestStatus,
};
use crate::observability::metrics;

/// Default maximum wait for a fulfillment.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default interval between store checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits for fulfillments of submitted requests.
///
/// Owns a fresh [`PendingStore`] per instance; hand a clone of
/// [`store`](Self::store) to whatever delivers events.
#[derive(Debug, Clone)]
pub struct Rendezvous {
    store: PendingStore,
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl Rendezvous {
    /// Create a rendezvous with its own empty store.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            store: PendingStore::new(),
            timeout,
            poll_interval,
        }
    }

    /// Create a rendezvous from configuration.
    pub fn from_config(config: &RendezvousConfig) -> Self {
        Self::new(
            Duration::from_secs(config.timeout_secs),
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    /// Store fed by event delivery.
    pub fn store(&self) -> &PendingStore {
        &self.store
    }

    /// Wait for the request's fulfillment.
    ///
    /// On return `request` holds its terminal status. A request that is already
    /// terminal is rejected without touching the store.
    pub async fn wait(&self, request: &mut Request) -> Result<FulfillmentResult, FulfillmentError> {
        if request.status().is_terminal() {
            return Err(FulfillmentError::AlreadyResolved {
                request_id: request.id,
                status: request.status(),
            });
        }

        let started = Instant::now();
        let deadline = sleep(self.timeout);
        tokio::pin!(deadline);

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            request_id = %request.id,
            timeout_secs = self.timeout.as_secs(),
            "Waiting for fulfillment"
        );

        let resolved = loop {
            tokio::select! {
                biased;
                _ = &mut deadline => {
                    // an event recorded before the deadline still wins
                    break self.store.take_or_close(&request.id);
                }
                _ = ticker.tick() => {
                    if let Some(result) = self.store.take(&request.id) {
                        break Some(result);
                    }
                }
            }
        };

        let waited = started.elapsed();
        match resolved {
            Some(result) => {
                request.resolve(result.outcome.status());
                metrics::record_request_outcome(result.outcome.kind(), waited);
                tracing::info!(
                    request_id = %request.id,
                    outcome = result.outcome.kind(),
                    waited_ms = waited.as_millis() as u64,
                    since_submitted_secs = request.since_submitted().as_secs(),
                    "Request fulfilled"
                );
                Ok(result)
            }
            None => {
                request.resolve(RequestStatus::TimedOut);
                metrics::record_request_outcome("timed_out", waited);
                tracing::warn!(
                    request_id = %request.id,
                    since_submitted_secs = request.since_submitted().as_secs(),
                    "Fulfillment wait timed out"
                );
                Err(FulfillmentError::TimedOut {
                    request_id: request.id,
                    waited: self.timeout,
                })
            }
        }
    }
}
