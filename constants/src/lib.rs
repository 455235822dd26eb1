//! Defines system-wide constants for gateway execution

#![deny(unsafe_code)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(missing_docs)]

use alloy_primitives::{U160, uint};

// ------------------
// | Pool Constants |
// ------------------

/// The default fee tier for pools created through the gateway, in hundredths
/// of a bip
pub const DEFAULT_FEE: u32 = 3000;

/// The default tick spacing for pools created through the gateway
pub const DEFAULT_TICK_SPACING: i32 = 60;

/// The maximum fee a pool may be configured with (100%)
pub const MAX_FEE: u32 = 1_000_000;

/// The lowest usable tick for a full range position at a tick spacing of 60
pub const FULL_RANGE_TICK_LOWER: i32 = -887_220;

/// The highest usable tick for a full range position at a tick spacing of 60
pub const FULL_RANGE_TICK_UPPER: i32 = 887_220;

/// The default liquidity amount added when a request does not specify one,
/// 100 units at 18 decimals
pub const DEFAULT_LIQUIDITY_AMOUNT: u128 = 100_000_000_000_000_000_000;

/// The default swap amount when a request does not specify one
pub const DEFAULT_SWAP_AMOUNT: u128 = 10_000_000;

/// The sqrt price (Q64.96) of a 1:1 pool
pub const SQRT_PRICE_1_1: U160 = uint!(79228162514264337593543950336_U160);

/// The minimum sqrt price limit usable for a `zeroForOne` swap
/// (`MIN_SQRT_PRICE + 1`)
pub const MIN_SQRT_PRICE_LIMIT: U160 = uint!(4295128740_U160);

/// The maximum sqrt price limit usable for a `oneForZero` swap
/// (`MAX_SQRT_PRICE - 1`)
pub const MAX_SQRT_PRICE_LIMIT: U160 =
    uint!(1461446703485210103287273052203988822378723970341_U160);

// -------------------------
// | Transaction Constants |
// -------------------------

/// The gas limit used for pool initialization and unpermitted liquidity
/// provision
pub const STANDARD_GAS_LIMIT: u64 = 500_000;

/// The gas limit used for swaps and permitted liquidity provision
pub const EXTENDED_GAS_LIMIT: u64 = 1_000_000;

/// The gas limit used for an ERC20 approval
pub const APPROVE_GAS_LIMIT: u64 = 100_000;

/// The default time to wait for a transaction to be mined, in milliseconds
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 60_000;

/// The default interval at which to poll for a receipt, in milliseconds
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 500;

// --------------------
// | Permit Constants |
// --------------------

/// The EIP-712 type string of an ERC20 permit
pub const PERMIT_TYPE_STRING: &str =
    "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// The prefix prepended to a 32-byte hash when signing a raw message
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// The EIP-191 prefix prepended to typed data digests
pub const EIP712_DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// The default number of seconds a permit remains valid for
pub const DEFAULT_PERMIT_DEADLINE_SECS: u64 = 3600;

/// The numerator of the slippage multiplier applied to a swap permit's value
pub const PERMIT_SLIPPAGE_NUMERATOR: u64 = 11;

/// The denominator of the slippage multiplier applied to a swap permit's value
pub const PERMIT_SLIPPAGE_DENOMINATOR: u64 = 10;

/// The default seed from which the permit signing key is derived
pub const DEFAULT_PERMIT_SIGNER_SEED: &str = "alice";

// ------------------
// | HTTP Constants |
// ------------------

/// The default port the HTTP server listens on
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// The default RPC url of the chain node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The first prefunded account of a local development node
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
