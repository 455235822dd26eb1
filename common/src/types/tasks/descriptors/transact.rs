//! Descriptor for the transact task, covering every pool operation

use alloy_primitives::{Bytes, U160, U256};
use constants::{EXTENDED_GAS_LIMIT, STANDARD_GAS_LIMIT};
use util::get_current_time_seconds;

use crate::types::pool::{ModifyLiquidityParams, PoolKey, SwapParams, TestSettings};

/// The operation a transact task performs against a pool
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoolOperation {
    /// Initialize the pool at a starting price
    Initialize {
        /// The starting sqrt price of the pool
        sqrt_price_x96: U160,
    },
    /// Add liquidity to the pool
    AddLiquidity {
        /// The liquidity modification
        params: ModifyLiquidityParams,
    },
    /// Swap against the pool
    Swap {
        /// The swap parameters
        params: SwapParams,
        /// The router's settlement options
        settings: TestSettings,
    },
}

impl PoolOperation {
    /// A short name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            PoolOperation::Initialize { .. } => "Initialize",
            PoolOperation::AddLiquidity { .. } => "Add Liquidity",
            PoolOperation::Swap { .. } => "Swap",
        }
    }

    /// The gas limit of the operation's transaction
    pub fn gas_limit(&self, with_permit: bool) -> u64 {
        match self {
            PoolOperation::Initialize { .. } => STANDARD_GAS_LIMIT,
            PoolOperation::AddLiquidity { .. } if !with_permit => STANDARD_GAS_LIMIT,
            PoolOperation::AddLiquidity { .. } | PoolOperation::Swap { .. } => EXTENDED_GAS_LIMIT,
        }
    }

    /// Whether the operation moves tokens, and therefore has balances worth
    /// reconciling
    pub fn moves_balances(&self) -> bool {
        !matches!(self, PoolOperation::Initialize { .. })
    }
}

/// The task descriptor containing only the parameterization of the `Transact`
/// task
#[derive(Clone, Debug)]
pub struct TransactTaskDescriptor {
    /// The pool being transacted against
    pub pool_key: PoolKey,
    /// The operation to perform
    pub operation: PoolOperation,
    /// The data passed through to the pool's hooks
    pub hook_data: Bytes,
    /// The deadline of the permits authorizing the operation, if the
    /// operation is permit based
    pub permit_deadline: Option<U256>,
}

impl TransactTaskDescriptor {
    /// Constructor for an operation paid for by the gateway's own approvals
    pub fn new(pool_key: PoolKey, operation: PoolOperation) -> Self {
        Self { pool_key, operation, hook_data: Bytes::new(), permit_deadline: None }
    }

    /// Constructor for an operation authorized by signed permits
    pub fn new_with_permit(
        pool_key: PoolKey,
        operation: PoolOperation,
        deadline: u64,
    ) -> Result<Self, String> {
        if matches!(operation, PoolOperation::Initialize { .. }) {
            return Err("pool initialization does not accept a permit".to_string());
        }

        let now = get_current_time_seconds();
        if deadline <= now {
            return Err(format!("permit deadline {deadline} is not after the current time {now}"));
        }

        Ok(Self {
            pool_key,
            operation,
            hook_data: Bytes::new(),
            permit_deadline: Some(U256::from(deadline)),
        })
    }

    /// Whether the operation is permit based
    pub fn uses_permit(&self) -> bool {
        self.permit_deadline.is_some()
    }

    /// The gas limit of the operation's transaction
    pub fn gas_limit(&self) -> u64 {
        self.operation.gas_limit(self.uses_permit())
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::{Address, address};
    use constants::SQRT_PRICE_1_1;

    use super::*;

    /// A valid test pool key
    fn pool_key() -> PoolKey {
        let token0: Address = address!("0x1000000000000000000000000000000000000001");
        let token1: Address = address!("0x2000000000000000000000000000000000000002");
        PoolKey::with_defaults(token0, token1).unwrap()
    }

    /// Tests the gas limits of each operation
    #[test]
    fn test_gas_limits() {
        let init = PoolOperation::Initialize { sqrt_price_x96: SQRT_PRICE_1_1 };
        let params = ModifyLiquidityParams::add_full_range(U256::from(1u64)).unwrap();
        let add = PoolOperation::AddLiquidity { params };

        assert_eq!(TransactTaskDescriptor::new(pool_key(), init).gas_limit(), 500_000);
        assert_eq!(TransactTaskDescriptor::new(pool_key(), add).gas_limit(), 500_000);

        let deadline = get_current_time_seconds() + 3600;
        let desc = TransactTaskDescriptor::new_with_permit(pool_key(), add, deadline).unwrap();
        assert_eq!(desc.gas_limit(), 1_000_000);
    }

    /// Tests that permit descriptors are validated
    #[test]
    fn test_permit_validation() {
        let init = PoolOperation::Initialize { sqrt_price_x96: SQRT_PRICE_1_1 };
        let deadline = get_current_time_seconds() + 3600;
        assert!(TransactTaskDescriptor::new_with_permit(pool_key(), init, deadline).is_err());

        let params = SwapParams::exact_input(true, U256::from(10u64)).unwrap();
        let swap = PoolOperation::Swap { params, settings: TestSettings::default() };
        assert!(TransactTaskDescriptor::new_with_permit(pool_key(), swap, 1).is_err());
    }
}
