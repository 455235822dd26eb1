//! Types describing a pool and the parameters of calls against it

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy_primitives::{Address, B256, I256, U160, U256};
use constants::{
    DEFAULT_FEE, DEFAULT_TICK_SPACING, FULL_RANGE_TICK_LOWER, FULL_RANGE_TICK_UPPER, MAX_FEE,
    MAX_SQRT_PRICE_LIMIT, MIN_SQRT_PRICE_LIMIT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error returned when a pool key violates the pool manager's invariants
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidPoolKey {
    /// The currencies are not strictly ascending
    #[error("currency0 ({currency0:#x}) must be less than currency1 ({currency1:#x})")]
    Unordered {
        /// The first currency given
        currency0: Address,
        /// The second currency given
        currency1: Address,
    },
    /// The fee is above the maximum
    #[error("fee {0} exceeds the maximum of {MAX_FEE}")]
    FeeTooLarge(u32),
    /// The tick spacing is non-positive or out of range
    #[error("invalid tick spacing: {0}")]
    TickSpacing(i32),
}

/// The key identifying a pool
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolKey {
    /// The lower currency of the pool, by address
    pub currency0: Address,
    /// The higher currency of the pool, by address
    pub currency1: Address,
    /// The pool's fee in hundredths of a bip
    pub fee: u32,
    /// The spacing between usable ticks
    pub tick_spacing: i32,
    /// The hooks contract of the pool
    pub hooks: Address,
}

impl PoolKey {
    /// The maximum tick spacing accepted by the pool manager
    pub const MAX_TICK_SPACING: i32 = i16::MAX as i32;

    /// Construct a pool key, failing if the currencies are not strictly
    /// ascending
    ///
    /// Currencies are never reordered, a caller passing them inverted has
    /// most likely inverted the trade direction as well
    pub fn new(
        currency0: Address,
        currency1: Address,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
    ) -> Result<Self, InvalidPoolKey> {
        if currency0 >= currency1 {
            return Err(InvalidPoolKey::Unordered { currency0, currency1 });
        }
        if fee > MAX_FEE {
            return Err(InvalidPoolKey::FeeTooLarge(fee));
        }
        if tick_spacing <= 0 || tick_spacing > Self::MAX_TICK_SPACING {
            return Err(InvalidPoolKey::TickSpacing(tick_spacing));
        }

        Ok(Self { currency0, currency1, fee, tick_spacing, hooks })
    }

    /// Construct a pool key with the default fee and tick spacing and no hooks
    pub fn with_defaults(currency0: Address, currency1: Address) -> Result<Self, InvalidPoolKey> {
        Self::new(currency0, currency1, DEFAULT_FEE, DEFAULT_TICK_SPACING, Address::ZERO)
    }

    /// The pair of currencies in the pool
    pub fn currencies(&self) -> [Address; 2] {
        [self.currency0, self.currency1]
    }

    /// The currency a swap in the given direction pays into the pool
    pub fn input_currency(&self, zero_for_one: bool) -> Address {
        if zero_for_one { self.currency0 } else { self.currency1 }
    }
}

impl Display for PoolKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{:#x}/{:#x} (fee: {}, spacing: {})",
            self.currency0, self.currency1, self.fee, self.tick_spacing
        )
    }
}

/// The parameters of a swap
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Whether the swap sells currency0 for currency1
    pub zero_for_one: bool,
    /// The amount to swap, negative for exact input
    pub amount_specified: I256,
    /// The price limit beyond which the swap halts
    pub sqrt_price_limit_x96: U160,
}

impl SwapParams {
    /// An exact input swap of `amount` in the given direction, with the price
    /// limit at the edge of the range for that direction
    pub fn exact_input(zero_for_one: bool, amount: U256) -> Result<Self, String> {
        let amount = I256::try_from(amount).map_err(|e| format!("swap amount too large: {e}"))?;
        let sqrt_price_limit_x96 =
            if zero_for_one { MIN_SQRT_PRICE_LIMIT } else { MAX_SQRT_PRICE_LIMIT };

        Ok(Self { zero_for_one, amount_specified: -amount, sqrt_price_limit_x96 })
    }

    /// The absolute amount being swapped
    pub fn amount(&self) -> U256 {
        self.amount_specified.unsigned_abs()
    }
}

/// The parameters of a liquidity modification
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModifyLiquidityParams {
    /// The lower tick of the position
    pub tick_lower: i32,
    /// The upper tick of the position
    pub tick_upper: i32,
    /// The change in liquidity, positive to add
    pub liquidity_delta: I256,
    /// A salt distinguishing positions with the same owner and range
    pub salt: B256,
}

impl ModifyLiquidityParams {
    /// Add `liquidity` to the full range position
    pub fn add_full_range(liquidity: U256) -> Result<Self, String> {
        if liquidity.is_zero() {
            return Err("liquidity must be positive".to_string());
        }
        let liquidity_delta =
            I256::try_from(liquidity).map_err(|e| format!("liquidity too large: {e}"))?;

        Ok(Self {
            tick_lower: FULL_RANGE_TICK_LOWER,
            tick_upper: FULL_RANGE_TICK_UPPER,
            liquidity_delta,
            salt: B256::ZERO,
        })
    }

    /// The amount of liquidity being added
    pub fn liquidity(&self) -> U256 {
        self.liquidity_delta.unsigned_abs()
    }
}

/// Settlement options of the swap test router
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSettings {
    /// Whether to take output as ERC6909 claims
    pub take_claims: bool,
    /// Whether to settle input by burning ERC6909 claims
    pub settle_using_burn: bool,
}

#[cfg(test)]
mod test {
    use alloy_primitives::address;

    use super::*;

    /// The lower of two test currencies
    const LOW: Address = address!("0x1000000000000000000000000000000000000001");
    /// The higher of two test currencies
    const HIGH: Address = address!("0x2000000000000000000000000000000000000002");

    /// Tests that an inverted pool key is rejected
    #[test]
    fn test_unordered_key() {
        let err = PoolKey::with_defaults(HIGH, LOW).unwrap_err();
        assert_eq!(err, InvalidPoolKey::Unordered { currency0: HIGH, currency1: LOW });

        let err = PoolKey::with_defaults(LOW, LOW).unwrap_err();
        assert!(matches!(err, InvalidPoolKey::Unordered { .. }));

        let key = PoolKey::with_defaults(LOW, HIGH).unwrap();
        assert_eq!(key.currencies(), [LOW, HIGH]);
    }

    /// Tests fee and tick spacing bounds
    #[test]
    fn test_key_bounds() {
        assert_eq!(
            PoolKey::new(LOW, HIGH, MAX_FEE + 1, 60, Address::ZERO),
            Err(InvalidPoolKey::FeeTooLarge(MAX_FEE + 1))
        );
        assert_eq!(
            PoolKey::new(LOW, HIGH, 3000, 0, Address::ZERO),
            Err(InvalidPoolKey::TickSpacing(0))
        );
    }

    /// Tests the direction dependent fields of a swap
    #[test]
    fn test_swap_direction() {
        let amount = U256::from(10_000_000u64);
        let params = SwapParams::exact_input(true /* zero_for_one */, amount).unwrap();
        assert_eq!(params.amount_specified, I256::try_from(-10_000_000i64).unwrap());
        assert_eq!(params.sqrt_price_limit_x96, MIN_SQRT_PRICE_LIMIT);
        assert_eq!(params.amount(), amount);

        let params = SwapParams::exact_input(false /* zero_for_one */, amount).unwrap();
        assert_eq!(params.sqrt_price_limit_x96, MAX_SQRT_PRICE_LIMIT);

        let key = PoolKey::with_defaults(LOW, HIGH).unwrap();
        assert_eq!(key.input_currency(true), LOW);
        assert_eq!(key.input_currency(false), HIGH);
    }

    /// Tests that zero liquidity is rejected
    #[test]
    fn test_zero_liquidity() {
        assert!(ModifyLiquidityParams::add_full_range(U256::ZERO).is_err());
        let params = ModifyLiquidityParams::add_full_range(U256::from(100u64)).unwrap();
        assert_eq!(params.tick_lower, -887_220);
        assert_eq!(params.liquidity(), U256::from(100u64));
    }
}
