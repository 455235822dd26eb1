//! The process wide chain context, built once at startup and passed down

use std::sync::Arc;

use tracing::info;

use crate::{
    encoder::CallEncoder,
    errors::ChainClientError,
    traits::{ChainClient, SharedChainClient},
};

/// The chain a gateway is connected to, along with the client used to reach
/// it and the interfaces of the contracts it calls
///
/// Immutable once built; cloning shares the underlying client
#[derive(Clone)]
pub struct ChainContext {
    /// The chain id reported by the node at startup
    chain_id: u64,
    /// The client used for every chain interaction
    client: SharedChainClient,
    /// The call encoder for the known contract interfaces
    encoder: Arc<CallEncoder>,
}

impl ChainContext {
    /// Build a context, querying the node for its chain id
    pub async fn new(client: SharedChainClient) -> Result<Self, ChainClientError> {
        let chain_id = client.chain_id().await.map_err(ChainClientError::into_unavailable)?;
        let encoder = Arc::new(CallEncoder::new()?);
        info!("connected to chain {chain_id}");

        Ok(Self { chain_id, client, encoder })
    }

    /// The chain id of the connected chain
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The chain client
    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    /// A shared handle to the chain client
    pub fn shared_client(&self) -> SharedChainClient {
        self.client.clone()
    }

    /// The call encoder
    pub fn encoder(&self) -> &CallEncoder {
        &self.encoder
    }
}
