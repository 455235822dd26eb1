//! Groups API type definitions for pool operations

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U160, U256};
use constants::{DEFAULT_LIQUIDITY_AMOUNT, DEFAULT_SWAP_AMOUNT, SQRT_PRICE_1_1};
use serde::{Deserialize, Serialize};
use util::hex::u256_from_dec_string;

use crate::{
    error::ApiTypeError,
    types::{ApiBalanceReport, ApiCurrencies},
};

// ---------------
// | HTTP Routes |
// ---------------

/// Approve both pool currencies to both routers
pub const APPROVE_TOKENS_ROUTE: &str = "/approve";
/// Initialize a pool at the 1:1 price
pub const INITIALIZE_POOL_ROUTE: &str = "/initialize";
/// Add full range liquidity to a pool
pub const ADD_LIQUIDITY_ROUTE: &str = "/addLiquidity";
/// Add full range liquidity to a pool, paid for by signed permits
pub const ADD_LIQUIDITY_PERMIT_ROUTE: &str = "/addLiquidityPermit";
/// Swap against a pool
pub const SWAP_ROUTE: &str = "/performSwap";
/// Swap against a pool, paid for by a signed permit
pub const SWAP_WITH_PERMIT_ROUTE: &str = "/performSwapWithPermit";

// --------------------
// | Status Messages |
// --------------------

/// Reported for each approved currency
pub const TOKEN_APPROVED_MESSAGE: &str = "Token approved successfully";
/// Reported when a pool is initialized
pub const POOL_INITIALIZED_STATUS: &str = "Pool initialized successfully";
/// Reported when liquidity is added
pub const LIQUIDITY_ADDED_STATUS: &str = "Liquidity added successfully";
/// Reported when liquidity is added by permit
pub const LIQUIDITY_PERMIT_MESSAGE: &str = "Add liquidity with permit initiated successfully";
/// Reported when a swap settles
pub const SWAP_STATUS: &str = "Swap executed successfully";
/// Reported when a swap settles by permit
pub const SWAP_PERMIT_MESSAGE: &str = "Swap with permit initiated successfully";

// -----------
// | Helpers |
// -----------

/// Parse an optional positive decimal amount, falling back to a default
fn parse_positive_amount(
    field: &str,
    value: Option<&String>,
    default: U256,
) -> Result<U256, ApiTypeError> {
    let amount = match value {
        Some(v) => u256_from_dec_string(v).map_err(|e| ApiTypeError::parsing(format!("{field}: {e}")))?,
        None => default,
    };

    if amount.is_zero() {
        return Err(ApiTypeError::invalid(format!("{field} must be positive")));
    }
    Ok(amount)
}

// ------------------
// | Approval Types |
// ------------------

/// The request type to approve a pair of tokens to the routers
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApproveTokensRequest {
    /// The currencies to approve
    #[serde(flatten)]
    pub currencies: ApiCurrencies,
}

/// The outcome of approving a single currency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiApprovalResult {
    /// A human readable status
    pub message: String,
    /// The gateway account's balance of the currency, in decimal
    pub balance: String,
}

/// The response to an approval, keyed by the checksummed currency address
pub type ApproveTokensResponse = BTreeMap<String, ApiApprovalResult>;

// ------------------------
// | Initialization Types |
// ------------------------

/// The request type to initialize a pool
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePoolRequest {
    /// The currencies of the pool
    #[serde(flatten)]
    pub currencies: ApiCurrencies,
    /// The starting sqrt price in Q64.96 as a decimal string, 1:1 if omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqrt_price_x96: Option<String>,
}

impl InitializePoolRequest {
    /// The starting sqrt price of the pool
    pub fn sqrt_price(&self) -> Result<U160, ApiTypeError> {
        let Some(price) = self.sqrt_price_x96.as_ref() else {
            return Ok(SQRT_PRICE_1_1);
        };

        if price.is_empty() || !price.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ApiTypeError::parsing(format!("sqrtPriceX96: not a decimal integer: {price}")));
        }
        let price = U160::from_str_radix(price, 10)
            .map_err(|e| ApiTypeError::parsing(format!("sqrtPriceX96: {e}")))?;
        if price.is_zero() {
            return Err(ApiTypeError::invalid("sqrtPriceX96 must be positive"));
        }

        Ok(price)
    }
}

/// The response to a pool initialization
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePoolResponse {
    /// The hash of the initialization transaction
    pub initialize_tx_hash: B256,
    /// A human readable status
    pub status: String,
}

// -------------------
// | Liquidity Types |
// -------------------

/// The request type to add liquidity, with or without permits
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityRequest {
    /// The currencies of the pool
    #[serde(flatten)]
    pub currencies: ApiCurrencies,
    /// The liquidity to add as a decimal string, a default amount if omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<String>,
}

impl AddLiquidityRequest {
    /// The liquidity to add
    pub fn liquidity(&self) -> Result<U256, ApiTypeError> {
        parse_positive_amount(
            "liquidity",
            self.liquidity.as_ref(),
            U256::from(DEFAULT_LIQUIDITY_AMOUNT),
        )
    }
}

/// The parameters a liquidity addition was made with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLiquidityParams {
    /// The lower currency of the pool
    pub currency0: Address,
    /// The higher currency of the pool
    pub currency1: Address,
    /// The fee tier of the pool
    pub fee: String,
    /// The tick spacing of the pool
    pub tick_spacing: String,
    /// The liquidity added
    pub liquidity_amount: String,
}

/// The response to a liquidity addition
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityResponse {
    /// The hash of the liquidity transaction
    pub tx_hash: B256,
    /// A human readable status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// A human readable message, set on permit based additions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The balances of the liquidity provider
    #[serde(flatten)]
    pub balances: ApiBalanceReport,
    /// The parameters of the addition
    pub params: ApiLiquidityParams,
}

// --------------
// | Swap Types |
// --------------

/// The request type to swap, with or without a permit
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// The currencies of the pool
    #[serde(flatten)]
    pub currencies: ApiCurrencies,
    /// The exact input amount as a decimal string, a default amount if omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Whether currency0 is sold for currency1, true if omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_for_one: Option<bool>,
}

impl SwapRequest {
    /// The exact input amount of the swap
    pub fn amount(&self) -> Result<U256, ApiTypeError> {
        parse_positive_amount("amount", self.amount.as_ref(), U256::from(DEFAULT_SWAP_AMOUNT))
    }

    /// The direction of the swap
    pub fn zero_for_one(&self) -> bool {
        self.zero_for_one.unwrap_or(true)
    }
}

/// The response to a swap
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// The hash of the swap transaction
    pub tx_hash: B256,
    /// A human readable status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// A human readable message, set on permit based swaps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The balances of the swapper
    #[serde(flatten)]
    pub balances: ApiBalanceReport,
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests that an empty swap request takes the defaults
    #[test]
    fn test_swap_defaults() {
        let req: SwapRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.amount().unwrap(), U256::from(DEFAULT_SWAP_AMOUNT));
        assert!(req.zero_for_one());
        assert_eq!(req.currencies, ApiCurrencies::default());
    }

    /// Tests parsing a fully specified swap request
    #[test]
    fn test_swap_request() {
        let req: SwapRequest = serde_json::from_str(
            r#"{
                "currency0": "0x1000000000000000000000000000000000000001",
                "currency1": "0x2000000000000000000000000000000000000002",
                "amount": "2500",
                "zeroForOne": false
            }"#,
        )
        .unwrap();

        assert_eq!(req.amount().unwrap(), U256::from(2500u64));
        assert!(!req.zero_for_one());
        assert!(req.currencies.currency1.is_some());
    }

    /// Tests that malformed and non-positive amounts are rejected
    #[test]
    fn test_invalid_amounts() {
        let zero = AddLiquidityRequest { liquidity: Some("0".to_string()), ..Default::default() };
        assert!(matches!(zero.liquidity(), Err(ApiTypeError::Invalid(_))));

        let negative = SwapRequest { amount: Some("-5".to_string()), ..Default::default() };
        assert!(matches!(negative.amount(), Err(ApiTypeError::Parsing(_))));

        let hex = InitializePoolRequest { sqrt_price_x96: Some("0x10".to_string()), ..Default::default() };
        assert!(hex.sqrt_price().is_err());
    }

    /// Tests the initialization price defaults to 1:1
    #[test]
    fn test_initialize_price() {
        let req = InitializePoolRequest::default();
        assert_eq!(req.sqrt_price().unwrap(), SQRT_PRICE_1_1);

        let req = InitializePoolRequest { sqrt_price_x96: Some("4295128740".to_string()), ..Default::default() };
        assert_eq!(req.sqrt_price().unwrap(), U160::from(4295128740u64));
    }
}
