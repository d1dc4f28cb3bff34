//! Fulfillment event listener.
//!
//! Polls `eth_getLogs` for the oracle's callback-error events and the
//! consumer's response event, and records every decoded result into the
//! [`PendingStore`]. The listener must be anchored before the request
//! transaction is sent so that no fulfillment falls outside its block range.

use alloy::primitives::Address;
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::blockchain::contracts::{FunctionsOracle, ReviewConsumer};
use crate::blockchain::{BlockchainClient, BlockchainResult};
use crate::fulfillment::store::{PendingStore, RecordOutcome};
use crate::fulfillment::types::{FulfillmentOutcome, FulfillmentResult, RequestId};
use crate::observability::metrics;

/// Service feeding fulfillment events into a pending store.
pub struct EventListener {
    client: BlockchainClient,
    oracle: Address,
    consumer: Address,
    store: PendingStore,
    interval: Duration,
    /// Last block already scanned; `None` until anchored.
    last_block: Option<u64>,
}

impl EventListener {
    /// Create a new listener.
    pub fn new(
        client: BlockchainClient,
        oracle: Address,
        consumer: Address,
        store: PendingStore,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            oracle,
            consumer,
            store,
            interval,
            last_block: None,
        }
    }

    /// Fix the first block to scan at the current chain head.
    ///
    /// Call before submitting the request.
    pub async fn anchor(&mut self) -> BlockchainResult<u64> {
        let block = self.client.get_block_number().await?;
        self.last_block = Some(block.saturating_sub(1));
        tracing::info!(block, "Fulfillment listener anchored");
        Ok(block)
    }

    /// Run the listener loop until shutdown.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        if self.last_block.is_none() {
            if let Err(e) = self.anchor().await {
                tracing::error!(error = %e, "Failed to anchor fulfillment listener");
            }
        }

        tracing::info!(
            oracle = %self.oracle,
            consumer = %self.consumer,
            "Fulfillment listener started"
        );

        loop {
            if let Err(e) = self.poll_events().await {
                tracing::error!(error = %e, "Error polling fulfillment events");
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Fulfillment listener received shutdown signal, exiting loop");
                    return;
                }
            }
        }
    }

    async fn poll_events(&mut self) -> BlockchainResult<()> {
        let current_block = self.client.get_block_number().await?;
        let last_block = match self.last_block {
            Some(block) => block,
            None => {
                self.last_block = Some(current_block);
                return Ok(());
            }
        };

        if current_block <= last_block {
            return Ok(());
        }

        let filter = Filter::new()
            .address(vec![self.oracle, self.consumer])
            .from_block(last_block + 1)
            .to_block(current_block)
            .event_signature(vec![
                FunctionsOracle::UserCallbackError::SIGNATURE_HASH,
                FunctionsOracle::UserCallbackRawError::SIGNATURE_HASH,
                ReviewConsumer::AIReviewResponse::SIGNATURE_HASH,
            ]);

        let logs = self.client.get_logs(&filter).await?;
        for log in &logs {
            if let Some(result) = decode_log(log, self.oracle, self.consumer) {
                deliver(&self.store, result);
            }
        }

        self.last_block = Some(current_block);
        Ok(())
    }
}

/// Record one result and count it.
pub fn deliver(store: &PendingStore, result: FulfillmentResult) -> RecordOutcome {
    let kind = result.outcome.kind();
    let outcome = store.record(result);
    let disposition = match outcome {
        RecordOutcome::Recorded => "recorded",
        RecordOutcome::Duplicate => "duplicate",
        RecordOutcome::Late => "late",
    };
    metrics::record_event(kind, disposition);
    outcome
}

/// Decode a fulfillment-related log.
///
/// Callback-error events are accepted only from `oracle`, responses only from
/// `consumer`. Anything else yields `None`.
pub fn decode_log(log: &Log, oracle: Address, consumer: Address) -> Option<FulfillmentResult> {
    let emitter = log.address();

    if emitter == oracle {
        if let Ok(decoded) = log.log_decode::<FunctionsOracle::UserCallbackError>() {
            let event = decoded.inner.data;
            return Some(FulfillmentResult::new(
                RequestId(event.requestId),
                FulfillmentOutcome::UserCallbackError(event.reason),
            ));
        }
        if let Ok(decoded) = log.log_decode::<FunctionsOracle::UserCallbackRawError>() {
            let event = decoded.inner.data;
            return Some(FulfillmentResult::new(
                RequestId(event.requestId),
                FulfillmentOutcome::UserCallbackRawError(event.lowLevelData),
            ));
        }
    }

    if emitter == consumer {
        if let Ok(decoded) = log.log_decode::<ReviewConsumer::AIReviewResponse>() {
            let event = decoded.inner.data;
            return Some(FulfillmentResult::from_consumer_response(
                RequestId(event.requestId),
                event.result,
                event.err,
            ));
        }
    }

    tracing::debug!(address = %emitter, "Ignoring unrelated log");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, B256};

    fn oracle() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn consumer() -> Address {
        Address::repeat_byte(0xbb)
    }

    fn rpc_log<E: SolEvent>(address: Address, event: &E) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_user_callback_error() {
        let id = B256::repeat_byte(1);
        let log = rpc_log(
            oracle(),
            &FunctionsOracle::UserCallbackError {
                requestId: id,
                reason: "out of gas".into(),
            },
        );

        let result = decode_log(&log, oracle(), consumer()).unwrap();
        assert_eq!(result.request_id, RequestId(id));
        assert_eq!(result.outcome, FulfillmentOutcome::UserCallbackError("out of gas".into()));
    }

    #[test]
    fn test_decode_raw_error() {
        let id = B256::repeat_byte(2);
        let log = rpc_log(
            oracle(),
            &FunctionsOracle::UserCallbackRawError {
                requestId: id,
                lowLevelData: Bytes::from(b"revert".to_vec()),
            },
        );

        let result = decode_log(&log, oracle(), consumer()).unwrap();
        assert_eq!(
            result.outcome,
            FulfillmentOutcome::UserCallbackRawError(Bytes::from(b"revert".to_vec()))
        );
    }

    #[test]
    fn test_decode_consumer_response() {
        let id = B256::repeat_byte(3);
        let log = rpc_log(
            consumer(),
            &ReviewConsumer::AIReviewResponse {
                requestId: id,
                result: Bytes::from(vec![0x49]),
                err: Bytes::new(),
            },
        );

        let result = decode_log(&log, oracle(), consumer()).unwrap();
        assert_eq!(result.outcome, FulfillmentOutcome::Response(Bytes::from(vec![0x49])));
    }

    #[test]
    fn test_rejects_wrong_emitter() {
        let log = rpc_log(
            consumer(),
            &FunctionsOracle::UserCallbackError {
                requestId: B256::repeat_byte(4),
                reason: "spoofed".into(),
            },
        );
        assert!(decode_log(&log, oracle(), consumer()).is_none());
    }

    #[test]
    fn test_deliver_reports_duplicates() {
        let store = PendingStore::new();
        let result = FulfillmentResult::new(
            RequestId(B256::repeat_byte(5)),
            FulfillmentOutcome::Response(Bytes::new()),
        );
        assert_eq!(deliver(&store, result.clone()), RecordOutcome::Recorded);
        assert_eq!(deliver(&store, result), RecordOutcome::Duplicate);
    }
}
