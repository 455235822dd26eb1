//! Shared setup for the task driver tests

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chain_client::{
    context::ChainContext,
    mocks::{DEV_KEY, MockChainClient},
};
use eyre::Result;
use gateway_crypto::keys::SigningKey;
use task_driver::{TaskContext, TaskDriver};
use test_helpers::mock_chain::{contract_addresses, mock_chain};

/// The seed of the key that signs permits in tests
pub const PERMIT_SIGNER_SEED: &str = "alice";

/// Build a task driver over the given mock
pub async fn driver_for(mock: Arc<MockChainClient>) -> Result<TaskDriver> {
    let chain = ChainContext::new(mock).await?;
    let ctx = TaskContext {
        chain,
        gateway_key: SigningKey::from_hex(DEV_KEY)?,
        permit_signer: SigningKey::from_seed(PERMIT_SIGNER_SEED)?,
        contracts: contract_addresses(),
        receipt_timeout: Duration::from_millis(200),
        receipt_poll_interval: Duration::from_millis(10),
    };

    Ok(TaskDriver::new(ctx))
}

/// Build a mock chain with the contracts deployed and a driver over it
pub async fn setup() -> Result<(Arc<MockChainClient>, TaskDriver)> {
    let mock = mock_chain();
    let driver = driver_for(mock.clone()).await?;
    Ok((mock, driver))
}
