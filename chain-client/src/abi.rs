//! Solidity definitions of the contracts the gateway calls
//!
//! The typed bindings are used for ERC20 reads; the human readable signatures
//! back the dynamic call encoder so that pool calls are built by name

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy_sol_types::sol;

sol! {
    struct PoolKey {
        address currency0;
        address currency1;
        uint24 fee;
        int24 tickSpacing;
        address hooks;
    }

    struct SwapParams {
        bool zeroForOne;
        int256 amountSpecified;
        uint160 sqrtPriceLimitX96;
    }

    struct ModifyLiquidityParams {
        int24 tickLower;
        int24 tickUpper;
        int256 liquidityDelta;
        bytes32 salt;
    }

    struct TestSettings {
        bool takeClaims;
        bool settleUsingBurn;
    }

    interface IPoolManager {
        function initialize(PoolKey memory key, uint160 sqrtPriceX96, bytes calldata hookData) external returns (int24 tick);
    }

    interface IPoolSwapTest {
        function swap(PoolKey memory key, SwapParams memory params, TestSettings memory testSettings, bytes memory hookData) external payable returns (int256 delta);
        function swapWithPermit(address user, PoolKey memory key, SwapParams memory params, TestSettings memory testSettings, bytes memory hookData, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external payable returns (int256 delta);
    }

    interface IPoolModifyLiquidityTest {
        function modifyLiquidity(PoolKey memory key, ModifyLiquidityParams memory params, bytes memory hookData) external payable returns (int256 delta);
        function modifyLiquidityWithPermit(address user, PoolKey memory key, ModifyLiquidityParams memory params, bytes memory hookData, bool settleUsingBurn, bool takeClaims, uint256 deadline, uint8 v0, bytes32 r0, bytes32 s0, uint8 v1, bytes32 r1, bytes32 s1) external payable returns (int256 delta);
    }

    interface IERC20Permit {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
        function nonces(address owner) external view returns (uint256);
        function DOMAIN_SEPARATOR() external view returns (bytes32);
    }
}

/// The tuple type of a pool key
const POOL_KEY: &str = "(address,address,uint24,int24,address)";
/// The tuple type of swap parameters
const SWAP_PARAMS: &str = "(bool,int256,uint160)";
/// The tuple type of liquidity modification parameters
const MODIFY_LIQUIDITY_PARAMS: &str = "(int24,int24,int256,bytes32)";
/// The tuple type of the swap router's settlement options
const TEST_SETTINGS: &str = "(bool,bool)";

/// The functions of the pool manager the gateway calls
pub fn pool_manager_signatures() -> Vec<String> {
    vec![format!(
        "function initialize({POOL_KEY} key, uint160 sqrtPriceX96, bytes hookData) returns (int24 tick)"
    )]
}

/// The functions of the swap router the gateway calls
pub fn swap_router_signatures() -> Vec<String> {
    vec![
        format!(
            "function swap({POOL_KEY} key, {SWAP_PARAMS} params, {TEST_SETTINGS} testSettings, bytes hookData) payable returns (int256 delta)"
        ),
        format!(
            "function swapWithPermit(address user, {POOL_KEY} key, {SWAP_PARAMS} params, {TEST_SETTINGS} testSettings, bytes hookData, uint256 deadline, uint8 v, bytes32 r, bytes32 s) payable returns (int256 delta)"
        ),
    ]
}

/// The functions of the liquidity router the gateway calls
///
/// `modifyLiquidity` is overloaded with settlement flags
pub fn lp_router_signatures() -> Vec<String> {
    vec![
        format!(
            "function modifyLiquidity({POOL_KEY} key, {MODIFY_LIQUIDITY_PARAMS} params, bytes hookData) payable returns (int256 delta)"
        ),
        format!(
            "function modifyLiquidity({POOL_KEY} key, {MODIFY_LIQUIDITY_PARAMS} params, bytes hookData, bool settleUsingBurn, bool takeClaims) payable returns (int256 delta)"
        ),
        format!(
            "function modifyLiquidityWithPermit(address user, {POOL_KEY} key, {MODIFY_LIQUIDITY_PARAMS} params, bytes hookData, bool settleUsingBurn, bool takeClaims, uint256 deadline, uint8 v0, bytes32 r0, bytes32 s0, uint8 v1, bytes32 r1, bytes32 s1) payable returns (int256 delta)"
        ),
    ]
}

/// The functions of an ERC20 token with permit support
pub fn erc20_signatures() -> Vec<String> {
    [
        "function balanceOf(address account) view returns (uint256)",
        "function allowance(address owner, address spender) view returns (uint256)",
        "function approve(address spender, uint256 amount) returns (bool)",
        "function permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s)",
        "function nonces(address owner) view returns (uint256)",
        "function DOMAIN_SEPARATOR() view returns (bytes32)",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
