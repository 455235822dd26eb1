//! The RPC backed chain client, which holds the configuration details along
//! with a lower-level provider handle

use std::time::Duration;

use alloy::{
    network::TransactionBuilder,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportError, http::reqwest::Url},
};
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use common::types::intent::MinedReceipt;
use tracing::instrument;
use util::err_str;

use crate::{errors::ChainClientError, traits::ChainClient};

pub mod erc20;

/// A type alias for the RPC provider, a type erased alloy provider connected
/// to the node over HTTP
///
/// The provider holds no wallet; transactions are signed by the gateway and
/// broadcast raw
pub type GatewayProvider = DynProvider;

/// A configuration struct for the chain client
#[derive(Clone, Debug)]
pub struct ChainClientConfig {
    /// HTTP-addressable RPC endpoint for the client to connect to
    pub rpc_url: String,
    /// The interval at which to poll for pending transactions
    pub block_polling_interval: Duration,
}

impl ChainClientConfig {
    /// Constructs an RPC provider from the configuration
    fn get_provider(&self) -> Result<GatewayProvider, ChainClientError> {
        let url = Url::parse(&self.rpc_url).map_err(err_str!(ChainClientError::Config))?;
        let provider = ProviderBuilder::new().disable_recommended_fillers().connect_http(url);
        provider.client().set_poll_interval(self.block_polling_interval);

        Ok(DynProvider::new(provider))
    }
}

/// Classify a transport level failure of a read
///
/// A failure to reach the node is distinguished from the node answering with
/// an error
fn read_error(e: TransportError) -> ChainClientError {
    match e {
        RpcError::Transport(kind) => ChainClientError::unavailable(kind),
        other => ChainClientError::query(other),
    }
}

/// Classify a failure to broadcast a transaction
///
/// Rejections by the node are surfaced verbatim
fn send_error(e: TransportError) -> ChainClientError {
    match e {
        RpcError::Transport(kind) => ChainClientError::unavailable(kind),
        RpcError::ErrorResp(payload) => ChainClientError::submission(payload.message),
        other => ChainClientError::submission(other),
    }
}

/// The chain client backed by a JSON-RPC node
#[derive(Clone)]
pub struct RpcChainClient {
    /// The underlying provider
    provider: GatewayProvider,
}

impl RpcChainClient {
    /// Constructs a new chain client from the given configuration
    pub fn new(config: &ChainClientConfig) -> Result<Self, ChainClientError> {
        let provider = config.get_provider()?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    #[instrument(skip_all, err)]
    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        self.provider.get_chain_id().await.map_err(read_error)
    }

    #[instrument(skip_all, err, fields(address = %address))]
    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainClientError> {
        self.provider.get_transaction_count(address).pending().await.map_err(read_error)
    }

    #[instrument(skip_all, err)]
    async fn suggest_gas_price(&self) -> Result<u128, ChainClientError> {
        self.provider.get_gas_price().await.map_err(read_error)
    }

    #[instrument(skip_all, err, fields(address = %address))]
    async fn code_at(&self, address: Address) -> Result<Bytes, ChainClientError> {
        self.provider.get_code_at(address).await.map_err(read_error)
    }

    #[instrument(skip_all, err, fields(to = %to))]
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainClientError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(tx).await.map_err(read_error)
    }

    #[instrument(skip_all, err)]
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainClientError> {
        let pending = self.provider.send_raw_transaction(&raw).await.map_err(send_error)?;
        Ok(*pending.tx_hash())
    }

    #[instrument(skip_all, err, fields(tx_hash = %tx_hash))]
    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<MinedReceipt>, ChainClientError> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await.map_err(read_error)?;
        Ok(receipt.map(|r| MinedReceipt {
            tx_hash: r.transaction_hash,
            status: r.status(),
            block_number: r.block_number,
            gas_used: r.gas_used,
        }))
    }
}
