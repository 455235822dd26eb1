//! Types describing the contracts the gateway transacts against

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// The addresses of the deployed contracts the gateway calls
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    /// The pool manager
    pub pool_manager: Address,
    /// The swap router
    pub swap_router: Address,
    /// The liquidity router
    pub lp_router: Address,
}

impl ContractAddresses {
    /// The routers an ERC20 approval must be granted to
    pub fn routers(&self) -> [Address; 2] {
        [self.swap_router, self.lp_router]
    }
}
