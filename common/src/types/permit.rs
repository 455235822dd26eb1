//! The permit authorization type

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A signed permit authorizing `spender` to move `value` of `token` on behalf
/// of `owner`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitAuthorization {
    /// The token the permit is for
    pub token: Address,
    /// The owner of the tokens
    pub owner: Address,
    /// The account allowed to spend the tokens
    pub spender: Address,
    /// The allowance granted
    pub value: U256,
    /// The token's permit nonce for the owner at signing time
    pub nonce: U256,
    /// The timestamp after which the permit is invalid
    pub deadline: U256,
    /// The recovery id, 27 or 28
    pub v: u8,
    /// The `r` component of the signature
    pub r: B256,
    /// The `s` component of the signature
    pub s: B256,
}
