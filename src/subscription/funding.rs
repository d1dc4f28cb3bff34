//! Subscription funding and consumer authorization.
//!
//! 1 LINK = 10^18 Juels. Funding goes through the token's ERC-677
//! `transferAndCall` into the billing registry with the subscription id as
//! call data; authorization is `addConsumer` on the registry. Each transaction
//! waits for one confirmation.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolValue;

use crate::blockchain::contracts::{FunctionsBillingRegistry, LinkToken};
use crate::blockchain::{BlockchainError, TxBuilder};
use crate::error::Error;

const FUNDING_CONFIRMATIONS: u32 = 1;

/// Parse a decimal LINK amount into Juels.
pub fn parse_link_amount(amount: &str) -> crate::Result<U256> {
    let juels = parse_ether(amount.trim())
        .map_err(|e| Error::Validation(format!("Invalid LINK amount '{}': {}", amount, e)))?;
    if juels.is_zero() {
        return Err(Error::Validation("LINK amount must be greater than 0".into()));
    }
    Ok(juels)
}

/// `abi.encode(uint64 subscriptionId)`, the data `transferAndCall` forwards.
pub fn encode_subscription_id(subscription_id: u64) -> Bytes {
    Bytes::from(subscription_id.abi_encode())
}

/// Funds a subscription and authorizes consumers on it.
pub struct SubscriptionManager {
    tx: TxBuilder,
    link_token: Address,
    registry: Address,
}

impl SubscriptionManager {
    pub fn new(tx: TxBuilder, link_token: Address, registry: Address) -> Self {
        Self {
            tx,
            link_token,
            registry,
        }
    }

    /// LINK balance of the signer, in Juels.
    pub async fn balance(&self) -> crate::Result<U256> {
        let balance = self
            .tx
            .client()
            .call(
                self.link_token,
                LinkToken::balanceOfCall {
                    owner: self.tx.address(),
                },
            )
            .await?;
        Ok(balance)
    }

    /// Check the balance, optionally fund, then authorize `consumer`.
    ///
    /// The balance must cover `juels` even when funding is skipped.
    pub async fn fund_and_authorize(
        &self,
        subscription_id: u64,
        consumer: Address,
        juels: U256,
        fund: bool,
    ) -> crate::Result<()> {
        let balance = self.balance().await?;
        if juels > balance {
            return Err(BlockchainError::InsufficientBalance {
                token: "LINK",
                balance: format_ether(balance),
                required: format_ether(juels),
            }
            .into());
        }

        if fund {
            tracing::info!(
                subscription_id,
                juels = %juels,
                "Funding subscription"
            );
            let call = LinkToken::transferAndCallCall {
                to: self.registry,
                value: juels,
                data: encode_subscription_id(subscription_id),
            };
            self.tx
                .send_and_confirm(self.link_token, &call, None, FUNDING_CONFIRMATIONS)
                .await?;
            tracing::info!(subscription_id, juels = %juels, "Subscription funded");
        }

        tracing::info!(subscription_id, consumer = %consumer, "Adding consumer to subscription");
        let call = FunctionsBillingRegistry::addConsumerCall {
            subscriptionId: subscription_id,
            consumer,
        };
        self.tx
            .send_and_confirm(self.registry, &call, None, FUNDING_CONFIRMATIONS)
            .await?;
        tracing::info!(consumer = %consumer, "Consumer authorized");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_amount() {
        assert_eq!(
            parse_link_amount("1").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            parse_link_amount("0.5").unwrap(),
            U256::from(500_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_parse_link_amount_rejects_bad_input() {
        assert_eq!(parse_link_amount("abc").unwrap_err().kind(), "validation");
        assert_eq!(parse_link_amount("0").unwrap_err().kind(), "validation");
    }

    #[test]
    fn test_encode_subscription_id() {
        let data = encode_subscription_id(1234);
        assert_eq!(data.len(), 32);
        assert_eq!(&data[30..], &[0x04, 0xd2]);
        assert!(data[..30].iter().all(|b| *b == 0));
    }
}
