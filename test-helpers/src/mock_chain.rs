//! A mock chain with a pool manager, its routers, and two permit tokens
//! deployed at fixed addresses

use std::sync::Arc;

use alloy_primitives::{Address, U256, address};
use chain_client::mocks::MockChainClient;
use common::types::{chain::ContractAddresses, pool::PoolKey};

/// The chain id of the mock chain
pub const CHAIN_ID: u64 = 31337;
/// The first currency of the test pool
pub const TOKEN0: Address = address!("0x1000000000000000000000000000000000000001");
/// The second currency of the test pool
pub const TOKEN1: Address = address!("0x2000000000000000000000000000000000000002");
/// The pool manager
pub const POOL_MANAGER: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
/// The swap router
pub const SWAP_ROUTER: Address = address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512");
/// The liquidity router
pub const LP_ROUTER: Address = address!("0x9fE46736679d2D9a65F0992F32574D2f9E0f1B5F");

/// The addresses of the mock deployment
pub fn contract_addresses() -> ContractAddresses {
    ContractAddresses { pool_manager: POOL_MANAGER, swap_router: SWAP_ROUTER, lp_router: LP_ROUTER }
}

/// The key of the test pool, with the default fee and tick spacing
pub fn pool_key() -> PoolKey {
    PoolKey::with_defaults(TOKEN0, TOKEN1).expect("test pool key is valid")
}

/// Build a mock chain with the contracts deployed
pub fn mock_chain() -> Arc<MockChainClient> {
    let mock = MockChainClient::new(CHAIN_ID);
    mock.add_contract(POOL_MANAGER);
    mock.add_contract(SWAP_ROUTER);
    mock.add_contract(LP_ROUTER);
    mock.add_token(TOKEN0, "Token0");
    mock.add_token(TOKEN1, "Token1");

    Arc::new(mock)
}

/// Fund `owner` with `amount` of both test currencies
pub fn fund(mock: &MockChainClient, owner: Address, amount: U256) {
    mock.set_balance(TOKEN0, owner, amount);
    mock.set_balance(TOKEN1, owner, amount);
}
