//! Trait definitions for the chain client
//!
//! The gateway only ever needs a handful of node capabilities; everything it
//! does on chain is phrased in terms of this trait so that the node can be
//! swapped for a stub in tests

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use common::types::intent::MinedReceipt;

use crate::errors::ChainClientError;

/// A shared handle to a chain client
pub type SharedChainClient = Arc<dyn ChainClient>;

/// The node capabilities the gateway consumes
///
/// Implementations hold no per-session state, so one handle may serve any
/// number of concurrent requests
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The chain id reported by the node
    async fn chain_id(&self) -> Result<u64, ChainClientError>;

    /// The account nonce of `address`, counting transactions still pending
    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainClientError>;

    /// The node's suggested legacy gas price, in wei
    async fn suggest_gas_price(&self) -> Result<u128, ChainClientError>;

    /// The code deployed at `address`, empty for externally owned accounts
    async fn code_at(&self, address: Address) -> Result<Bytes, ChainClientError>;

    /// Execute a view call against `to` at the latest block
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainClientError>;

    /// Broadcast a signed, encoded transaction, returning its hash once the
    /// node accepts it
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainClientError>;

    /// The receipt of a transaction, if it has been mined
    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<MinedReceipt>, ChainClientError>;

    /// Block until a transaction is mined, polling at the given interval
    ///
    /// This never gives up on its own, callers bound it with a timeout
    async fn wait_mined(
        &self,
        tx_hash: B256,
        poll_interval: Duration,
    ) -> Result<MinedReceipt, ChainClientError> {
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}
