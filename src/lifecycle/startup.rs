//! Startup orchestration.
//!
//! Ordered connection to the chain: resolve the RPC URL from the environment,
//! connect the read client, load the deployer wallet, build the signer.
//! Any step failing is fatal.

use crate::blockchain::{BlockchainClient, TxBuilder, Wallet};
use crate::config::{env, BlockchainConfig};

/// Connect a read-only client.
pub async fn connect_client(config: &BlockchainConfig) -> crate::Result<BlockchainClient> {
    let mut resolved = config.clone();
    resolved.rpc_url = env::resolve_rpc_url(&config.rpc_url)?;
    Ok(BlockchainClient::new(resolved).await?)
}

/// Connect a client and a signer backed by the deployer wallet.
pub async fn connect_signer(config: &BlockchainConfig) -> crate::Result<(TxBuilder, Wallet)> {
    let client = connect_client(config).await?;
    let wallet = Wallet::from_env(config.chain_id)?;
    let tx = TxBuilder::new(client, wallet.clone())?;
    tracing::info!(address = %tx.address(), "Signer ready");
    Ok((tx, wallet))
}
