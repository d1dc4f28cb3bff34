//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Guard against gas price spikes
//! - Sign and broadcast contract calls through a wallet-backed provider
//! - Monitor confirmations until the requested depth
//!
//! Failed broadcasts and reverts are surfaced immediately; nothing is retried.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol_types::SolCall;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

/// Interval between receipt polls while waiting for confirmations.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Transaction sender for contract calls.
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
    /// Provider that fills nonce, fees and chain id, and signs with `wallet`.
    signer_provider: Arc<dyn Provider + Send + Sync>,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: BlockchainClient, wallet: Wallet) -> BlockchainResult<Self> {
        let url: url::Url = client
            .config()
            .rpc_url
            .parse()
            .map_err(|e| BlockchainError::Rpc(format!("Invalid RPC URL: {}", e)))?;

        let signer_provider = Arc::new(
            ProviderBuilder::new()
                .wallet(wallet.ethereum_wallet())
                .connect_http(url),
        ) as Arc<dyn Provider + Send + Sync>;

        Ok(Self {
            client,
            wallet,
            signer_provider,
        })
    }

    /// Reject sending while the network gas price is above the configured ceiling.
    pub async fn check_gas_price(&self) -> BlockchainResult<()> {
        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        let max_gwei = self.client.config().max_gas_price_gwei;
        if gas_price_gwei > max_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei,
            });
        }
        Ok(())
    }

    /// Sign and broadcast a contract call.
    ///
    /// # Arguments
    /// * `to` - Contract address
    /// * `call` - ABI call to encode as input
    /// * `gas_limit` - Explicit gas limit; estimated by the provider when `None`
    pub async fn send<C: SolCall>(
        &self,
        to: Address,
        call: &C,
        gas_limit: Option<u64>,
    ) -> BlockchainResult<TxHash> {
        self.check_gas_price().await?;

        let mut tx = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(to)
            .with_input(Bytes::from(call.abi_encode()));
        if let Some(gas_limit) = gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let pending = self
            .signer_provider
            .send_transaction(tx)
            .await
            .map_err(|e| BlockchainError::Rpc(format!("{} rejected: {}", C::SIGNATURE, e)))?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(tx_hash = %tx_hash, call = C::SIGNATURE, "Transaction broadcast");
        Ok(tx_hash)
    }

    /// Wait for a transaction to reach `required_confirmations` blocks.
    ///
    /// The block that includes the transaction counts as the first confirmation.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        required_confirmations: u32,
    ) -> BlockchainResult<TransactionReceipt> {
        let timeout_secs = self.client.config().confirmation_timeout_secs;
        let timeout_duration = Duration::from_secs(timeout_secs);

        tracing::info!(
            tx_hash = %tx_hash,
            confirmations = required_confirmations,
            "Waiting for transaction to be confirmed"
        );

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(RECEIPT_POLL_INTERVAL);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Err(BlockchainError::Reverted(tx_hash.to_string()));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block) as u32 + 1;

                if confirmations >= required_confirmations {
                    tracing::info!(tx_hash = %tx_hash, block_number = tx_block, "Transaction confirmed");
                    return Ok(receipt);
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(timeout_secs)),
        }
    }

    /// Send a contract call and wait for its confirmations.
    pub async fn send_and_confirm<C: SolCall>(
        &self,
        to: Address,
        call: &C,
        gas_limit: Option<u64>,
        required_confirmations: u32,
    ) -> BlockchainResult<TransactionReceipt> {
        let tx_hash = self.send(to, call, gas_limit).await?;
        self.wait_for_receipt(tx_hash, required_confirmations).await
    }

    /// Read-only client backing this builder.
    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}
