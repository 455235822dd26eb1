//! Submits signed transactions and waits for their inclusion
//!
//! Failures are never retried: a rejected broadcast or a reverted execution is
//! returned to the caller as is

use std::time::Duration;

use alloy_primitives::B256;
use common::types::intent::{MinedReceipt, TransactIntent};
use tracing::{info, instrument, warn};

use crate::{
    context::ChainContext, errors::ChainClientError, traits::SharedChainClient,
    transactor::TransactorContext,
};

/// Submits transactions through a chain client
#[derive(Clone)]
pub struct TransactionSubmitter {
    /// The client transactions are broadcast through
    client: SharedChainClient,
    /// The maximum time to wait for a transaction to be mined
    receipt_timeout: Duration,
    /// The interval at which to poll for a receipt
    poll_interval: Duration,
}

impl TransactionSubmitter {
    /// Constructor
    pub fn new(chain: &ChainContext, receipt_timeout: Duration, poll_interval: Duration) -> Self {
        Self { client: chain.shared_client(), receipt_timeout, poll_interval }
    }

    /// Sign an intent and broadcast it, returning once the node accepts it
    #[instrument(skip_all, err, fields(to = %intent.to, nonce = intent.nonce))]
    pub async fn submit(
        &self,
        transactor: &TransactorContext,
        intent: &TransactIntent,
    ) -> Result<B256, ChainClientError> {
        let signed = transactor.sign(intent)?;
        let tx_hash = self.client.send_raw_transaction(signed.raw).await?;
        if tx_hash != signed.hash {
            warn!("node reported hash {tx_hash:#x}, expected {:#x}", signed.hash);
        }

        info!("Pending tx hash: {tx_hash:#x}");
        Ok(tx_hash)
    }

    /// Wait for a transaction to be mined, failing if it is not mined within
    /// the timeout or if it reverts
    #[instrument(skip_all, err, fields(tx_hash = %tx_hash))]
    pub async fn await_mined(&self, tx_hash: B256) -> Result<MinedReceipt, ChainClientError> {
        let wait = self.client.wait_mined(tx_hash, self.poll_interval);
        let receipt = tokio::time::timeout(self.receipt_timeout, wait).await.map_err(|_| {
            ChainClientError::Timeout { tx_hash, timeout_ms: self.receipt_timeout.as_millis() as u64 }
        })??;

        if !receipt.status {
            return Err(ChainClientError::ExecutionReverted { tx_hash });
        }

        info!("tx {tx_hash:#x} mined in block {:?}", receipt.block_number);
        Ok(receipt)
    }

    /// Submit an intent and wait for it to be mined
    pub async fn submit_and_wait(
        &self,
        transactor: &TransactorContext,
        intent: &TransactIntent,
    ) -> Result<MinedReceipt, ChainClientError> {
        let tx_hash = self.submit(transactor, intent).await?;
        self.await_mined(tx_hash).await
    }
}
