//! Balance snapshots and the signed deltas between them

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use alloy_primitives::{Address, U256};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as DeError};
use util::hex::u256_from_dec_string;

/// An unbounded signed amount, serialized as a base-10 string
///
/// Balances span the full `uint256` range so their difference does not fit an
/// `int256`; the magnitude is kept unsigned alongside a sign bit instead
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedAmount {
    /// Whether the amount is below zero, always false for zero
    negative: bool,
    /// The absolute value of the amount
    magnitude: U256,
}

impl SignedAmount {
    /// A non-negative amount
    pub fn positive(magnitude: U256) -> Self {
        Self { negative: false, magnitude }
    }

    /// A non-positive amount
    pub fn negative(magnitude: U256) -> Self {
        Self { negative: !magnitude.is_zero(), magnitude }
    }

    /// The amount `after - before`
    pub fn difference(before: U256, after: U256) -> Self {
        if after >= before {
            Self::positive(after - before)
        } else {
            Self::negative(before - after)
        }
    }

    /// Whether the amount is strictly below zero
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whether the amount is strictly above zero
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }

    /// The absolute value of the amount
    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }
}

impl Display for SignedAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

impl FromStr for SignedAmount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('-') {
            Some(rest) => u256_from_dec_string(rest).map(Self::negative),
            None => u256_from_dec_string(s).map(Self::positive),
        }
    }
}

impl Serialize for SignedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SignedAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// The balances of an owner in a set of currencies at a point in time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// The account whose balances were read
    pub owner: Address,
    /// The balance of each currency, in the order they were read
    pub balances: Vec<(Address, U256)>,
}

impl BalanceSnapshot {
    /// The balance of a given currency, if it was read
    pub fn balance_of(&self, currency: &Address) -> Option<U256> {
        self.balances.iter().find(|(c, _)| c == currency).map(|(_, amount)| *amount)
    }

    /// The balances in read order, without their currencies
    pub fn amounts(&self) -> Vec<U256> {
        self.balances.iter().map(|(_, amount)| *amount).collect()
    }
}

/// The signed change in an owner's balances between two snapshots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The change in each currency, in snapshot order
    pub deltas: Vec<(Address, SignedAmount)>,
}

impl BalanceDelta {
    /// Compute `after - before` for each currency
    ///
    /// Both snapshots must cover the same owner and the same currencies
    pub fn between(before: &BalanceSnapshot, after: &BalanceSnapshot) -> Result<Self, String> {
        if before.owner != after.owner {
            return Err(format!(
                "snapshots are of different owners: {:#x} and {:#x}",
                before.owner, after.owner
            ));
        }

        let deltas = before
            .balances
            .iter()
            .map(|(currency, pre)| {
                after
                    .balance_of(currency)
                    .map(|post| (*currency, SignedAmount::difference(*pre, post)))
                    .ok_or_else(|| format!("currency {currency:#x} missing from later snapshot"))
            })
            .try_collect()?;

        Ok(Self { deltas })
    }

    /// The change in a given currency
    pub fn delta_of(&self, currency: &Address) -> Option<SignedAmount> {
        self.deltas.iter().find(|(c, _)| c == currency).map(|(_, delta)| *delta)
    }

    /// The changes in snapshot order, without their currencies
    pub fn amounts(&self) -> Vec<SignedAmount> {
        self.deltas.iter().map(|(_, delta)| *delta).collect()
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::address;

    use super::*;

    /// The first test currency
    const TOKEN0: Address = address!("0x1000000000000000000000000000000000000001");
    /// The second test currency
    const TOKEN1: Address = address!("0x2000000000000000000000000000000000000002");
    /// The test owner
    const OWNER: Address = address!("0x3000000000000000000000000000000000000003");

    /// Build a snapshot of the two test currencies
    fn snapshot(amount0: u64, amount1: u64) -> BalanceSnapshot {
        BalanceSnapshot {
            owner: OWNER,
            balances: vec![(TOKEN0, U256::from(amount0)), (TOKEN1, U256::from(amount1))],
        }
    }

    /// Tests the display and parsing of signed amounts
    #[test]
    fn test_signed_amount_display() {
        let amt = SignedAmount::difference(U256::from(10_000_000u64), U256::ZERO);
        assert_eq!(amt.to_string(), "-10000000");
        assert_eq!("-10000000".parse::<SignedAmount>().unwrap(), amt);

        // Zero is never negative
        let zero = SignedAmount::negative(U256::ZERO);
        assert_eq!(zero.to_string(), "0");
        assert!(!zero.is_negative() && !zero.is_positive());
        assert_eq!("-0".parse::<SignedAmount>().unwrap(), SignedAmount::default());
    }

    /// Tests that the full unsigned range is representable
    #[test]
    fn test_full_range_difference() {
        let amt = SignedAmount::difference(U256::MAX, U256::ZERO);
        assert!(amt.is_negative());
        assert_eq!(amt.magnitude(), U256::MAX);
    }

    /// Tests the delta between two snapshots
    #[test]
    fn test_delta_between() {
        let before = snapshot(20_000_000, 0);
        let after = snapshot(10_000_000, 9_000_000);
        let delta = BalanceDelta::between(&before, &after).unwrap();

        assert_eq!(delta.delta_of(&TOKEN0).unwrap().to_string(), "-10000000");
        assert!(delta.delta_of(&TOKEN1).unwrap().is_positive());
        assert_eq!(serde_json::to_string(&delta.amounts()).unwrap(), r#"["-10000000","9000000"]"#);
    }

    /// Tests that mismatched snapshots are rejected
    #[test]
    fn test_mismatched_snapshots() {
        let before = snapshot(1, 1);
        let mut after = snapshot(1, 1);
        after.balances.pop();
        assert!(BalanceDelta::between(&before, &after).is_err());

        let mut other_owner = snapshot(1, 1);
        other_owner.owner = TOKEN0;
        assert!(BalanceDelta::between(&before, &other_owner).is_err());
    }
}
