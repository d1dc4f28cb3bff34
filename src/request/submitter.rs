//! Consumer request submission.
//!
//! Sends `addReview` on the consumer contract, waits for confirmations and
//! reads the request id from the `RequestSent` log of the receipt. Nothing is
//! retried.

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

use crate::blockchain::contracts::ReviewConsumer;
use crate::blockchain::{BlockchainError, BlockchainResult, TxBuilder};
use crate::fulfillment::RequestId;

/// Payload of one review request.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub subject_id: u64,
    pub review_text: String,
    /// JavaScript executed by the oracle network.
    pub source: String,
    /// Encrypted secrets reference, empty when the request carries none.
    pub secrets: Bytes,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
}

impl ReviewRequest {
    fn to_call(&self) -> ReviewConsumer::addReviewCall {
        ReviewConsumer::addReviewCall {
            restaurantId: U256::from(self.subject_id),
            reviewText: self.review_text.clone(),
            source: self.source.clone(),
            secrets: self.secrets.clone(),
            subscriptionId: self.subscription_id,
            gasLimit: self.callback_gas_limit,
        }
    }
}

/// Submits requests through the consumer contract.
pub struct RequestSubmitter {
    tx: TxBuilder,
    consumer: Address,
}

impl RequestSubmitter {
    pub fn new(tx: TxBuilder, consumer: Address) -> Self {
        Self { tx, consumer }
    }

    /// Send the request and return its id once `confirmations` blocks deep.
    ///
    /// `gas_limit` bounds the submission transaction itself, not the callback.
    pub async fn submit(
        &self,
        request: &ReviewRequest,
        gas_limit: u64,
        confirmations: u32,
    ) -> BlockchainResult<RequestId> {
        let call = request.to_call();
        let tx_hash = self.tx.send(self.consumer, &call, Some(gas_limit)).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            confirmations,
            "Waiting for request transaction to be confirmed"
        );
        let receipt = self.tx.wait_for_receipt(tx_hash, confirmations).await?;

        let request_id = request_id_from_logs(receipt.inner.logs(), self.consumer).ok_or(
            BlockchainError::MissingEvent {
                event: "RequestSent",
                tx_hash: tx_hash.to_string(),
            },
        )?;

        tracing::info!(request_id = %request_id, "Request initiated");
        Ok(request_id)
    }
}

/// Find the first `RequestSent` emitted by `consumer`.
pub fn request_id_from_logs(logs: &[Log], consumer: Address) -> Option<RequestId> {
    logs.iter()
        .filter(|log| log.address() == consumer)
        .find_map(|log| log.log_decode::<ReviewConsumer::RequestSent>().ok())
        .map(|decoded| RequestId(decoded.inner.data.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, B256};

    const CONSUMER: Address = address!("00000000000000000000000000000000000000c0");

    fn log_from<E: SolEvent>(emitter: Address, event: &E) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: emitter,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_request_id_from_receipt_logs() {
        let id = B256::repeat_byte(0x42);
        let logs = vec![
            log_from(
                CONSUMER,
                &ReviewConsumer::AIReviewResponse {
                    requestId: B256::repeat_byte(0x01),
                    result: Bytes::new(),
                    err: Bytes::new(),
                },
            ),
            log_from(CONSUMER, &ReviewConsumer::RequestSent { id }),
        ];

        assert_eq!(request_id_from_logs(&logs, CONSUMER), Some(RequestId(id)));
    }

    #[test]
    fn test_request_sent_from_other_contract_ignored() {
        let other = address!("00000000000000000000000000000000000000c1");
        let logs = vec![log_from(
            other,
            &ReviewConsumer::RequestSent {
                id: B256::repeat_byte(0x42),
            },
        )];

        assert_eq!(request_id_from_logs(&logs, CONSUMER), None);
    }

    #[test]
    fn test_no_logs() {
        assert_eq!(request_id_from_logs(&[], CONSUMER), None);
    }

    #[test]
    fn test_call_encoding_carries_payload() {
        let request = ReviewRequest {
            subject_id: 1,
            review_text: "Some review text".into(),
            source: "return 1;".into(),
            secrets: Bytes::new(),
            subscription_id: 7,
            callback_gas_limit: 300_000,
        };
        let call = request.to_call();
        assert_eq!(call.restaurantId, U256::from(1));
        assert_eq!(call.subscriptionId, 7);
        assert_eq!(call.gasLimit, 300_000);
        assert!(call.secrets.is_empty());
    }
}
