//! API types shared between several routes

use std::fmt::Display;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ApiTypeError;

/// The currencies of a pool
///
/// Either may be omitted to fall back to the gateway's configured default
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCurrencies {
    /// The lower currency of the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency0: Option<Address>,
    /// The higher currency of the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency1: Option<Address>,
}

impl ApiCurrencies {
    /// Constructor
    pub fn new(currency0: Address, currency1: Address) -> Self {
        Self { currency0: Some(currency0), currency1: Some(currency1) }
    }

    /// Resolve the currencies against the gateway's defaults
    pub fn resolve(
        &self,
        default0: Option<Address>,
        default1: Option<Address>,
    ) -> Result<(Address, Address), ApiTypeError> {
        let currency0 = self
            .currency0
            .or(default0)
            .ok_or_else(|| ApiTypeError::Missing("currency0".to_string()))?;
        let currency1 = self
            .currency1
            .or(default1)
            .ok_or_else(|| ApiTypeError::Missing("currency1".to_string()))?;

        Ok((currency0, currency1))
    }
}

/// A pair of amounts, one per pool currency, as decimal strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBalances {
    /// The amount of currency0
    pub currency0: String,
    /// The amount of currency1
    pub currency1: String,
}

impl ApiBalances {
    /// Build the pair from two displayable amounts
    pub fn new<T: Display>(amount0: T, amount1: T) -> Self {
        Self { currency0: amount0.to_string(), currency1: amount1.to_string() }
    }

    /// Build the pair from a list of exactly two amounts
    pub fn from_amounts<T: Display>(amounts: &[T]) -> Result<Self, ApiTypeError> {
        match amounts {
            [amount0, amount1] => Ok(Self::new(amount0, amount1)),
            _ => Err(ApiTypeError::invalid(format!("expected 2 amounts, got {}", amounts.len()))),
        }
    }
}

/// The balances of the acting account around a pool operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBalanceReport {
    /// The balances before the operation
    pub balances_before: ApiBalances,
    /// The balances after the operation
    pub balances_after: ApiBalances,
    /// The signed change of each balance
    pub delta_balances: ApiBalances,
}

#[cfg(test)]
mod test {
    use alloy_primitives::{U256, address};
    use common::types::balances::SignedAmount;

    use super::*;

    /// Tests resolving currencies against defaults
    #[test]
    fn test_resolve_currencies() {
        let a = address!("0x1000000000000000000000000000000000000001");
        let b = address!("0x2000000000000000000000000000000000000002");

        let partial = ApiCurrencies { currency0: Some(a), currency1: None };
        assert_eq!(partial.resolve(None, Some(b)).unwrap(), (a, b));
        assert_eq!(
            partial.resolve(None, None).unwrap_err(),
            ApiTypeError::Missing("currency1".to_string())
        );
    }

    /// Tests the wire format of a balance report
    #[test]
    fn test_balance_report_format() {
        let deltas = [SignedAmount::negative(U256::from(10u64)), SignedAmount::positive(U256::from(7u64))];
        let report = ApiBalanceReport {
            balances_before: ApiBalances::new(U256::from(20u64), U256::ZERO),
            balances_after: ApiBalances::new(U256::from(10u64), U256::from(7u64)),
            delta_balances: ApiBalances::from_amounts(&deltas).unwrap(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["deltaBalances"]["currency0"], "-10");
        assert_eq!(json["deltaBalances"]["currency1"], "7");
        assert_eq!(json["balancesBefore"]["currency0"], "20");
        assert!(ApiBalances::from_amounts(&deltas[..1]).is_err());
    }
}
