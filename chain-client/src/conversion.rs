//! Conversions from gateway types to contract call arguments

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, I256, U160, U256};
use common::types::{
    permit::PermitAuthorization,
    pool::{ModifyLiquidityParams, PoolKey, SwapParams, TestSettings},
};

/// The bit width of a pool's fee
const FEE_BITS: usize = 24;
/// The bit width of a tick or tick spacing
const TICK_BITS: usize = 24;
/// The bit width of a sqrt price
const SQRT_PRICE_BITS: usize = 160;
/// The bit width of a full word integer
const WORD_BITS: usize = 256;
/// The bit width of a recovery id
const RECOVERY_ID_BITS: usize = 8;

/// Convert an address argument
pub fn address_value(addr: Address) -> DynSolValue {
    DynSolValue::Address(addr)
}

/// Convert a `uint256` argument
pub fn uint256_value(val: U256) -> DynSolValue {
    DynSolValue::Uint(val, WORD_BITS)
}

/// Convert a `bytes` argument
pub fn bytes_value(data: &Bytes) -> DynSolValue {
    DynSolValue::Bytes(data.to_vec())
}

/// Convert a `uint160` sqrt price argument
pub fn sqrt_price_value(price: U160) -> DynSolValue {
    DynSolValue::Uint(U256::from(price), SQRT_PRICE_BITS)
}

/// Convert an `int24` tick argument
fn tick_value(tick: i32) -> DynSolValue {
    // Every `i32` fits in an `int256`
    DynSolValue::Int(I256::try_from(tick).unwrap_or_default(), TICK_BITS)
}

/// Convert a pool key to its tuple
pub fn pool_key_value(key: &PoolKey) -> DynSolValue {
    DynSolValue::Tuple(vec![
        address_value(key.currency0),
        address_value(key.currency1),
        DynSolValue::Uint(U256::from(key.fee), FEE_BITS),
        tick_value(key.tick_spacing),
        address_value(key.hooks),
    ])
}

/// Convert swap parameters to their tuple
pub fn swap_params_value(params: &SwapParams) -> DynSolValue {
    DynSolValue::Tuple(vec![
        DynSolValue::Bool(params.zero_for_one),
        DynSolValue::Int(params.amount_specified, WORD_BITS),
        sqrt_price_value(params.sqrt_price_limit_x96),
    ])
}

/// Convert liquidity modification parameters to their tuple
pub fn modify_liquidity_params_value(params: &ModifyLiquidityParams) -> DynSolValue {
    DynSolValue::Tuple(vec![
        tick_value(params.tick_lower),
        tick_value(params.tick_upper),
        DynSolValue::Int(params.liquidity_delta, WORD_BITS),
        DynSolValue::FixedBytes(params.salt, 32),
    ])
}

/// Convert the swap router's settlement options to their tuple
pub fn test_settings_value(settings: &TestSettings) -> DynSolValue {
    DynSolValue::Tuple(vec![
        DynSolValue::Bool(settings.take_claims),
        DynSolValue::Bool(settings.settle_using_burn),
    ])
}

/// Convert a permit's signature to its `(v, r, s)` arguments
pub fn permit_signature_values(permit: &PermitAuthorization) -> [DynSolValue; 3] {
    [
        DynSolValue::Uint(U256::from(permit.v), RECOVERY_ID_BITS),
        DynSolValue::FixedBytes(permit.r, 32),
        DynSolValue::FixedBytes(permit.s, 32),
    ]
}

#[cfg(test)]
mod test {
    use alloy::dyn_abi::DynSolType;
    use alloy_primitives::{B256, address};
    use alloy_sol_types::SolValue;
    use constants::SQRT_PRICE_1_1;

    use super::*;
    use crate::abi;

    /// Build a test pool key
    fn pool_key() -> PoolKey {
        PoolKey::new(
            address!("0x1000000000000000000000000000000000000001"),
            address!("0x2000000000000000000000000000000000000002"),
            500,
            10,
            address!("0x3000000000000000000000000000000000000003"),
        )
        .unwrap()
    }

    /// Tests that the pool key tuple encodes like the typed struct
    #[test]
    fn test_pool_key_encoding() {
        let key = pool_key();
        let typed = abi::PoolKey {
            currency0: key.currency0,
            currency1: key.currency1,
            fee: alloy_primitives::aliases::U24::from(500u32),
            tickSpacing: alloy_primitives::aliases::I24::try_from(10i32).unwrap(),
            hooks: key.hooks,
        };

        assert_eq!(pool_key_value(&key).abi_encode(), typed.abi_encode());
    }

    /// Tests that negative ticks and amounts survive conversion
    #[test]
    fn test_signed_fields() {
        let params = ModifyLiquidityParams::add_full_range(U256::from(5u64)).unwrap();
        let value = modify_liquidity_params_value(&params);

        let ty: DynSolType = "(int24,int24,int256,bytes32)".parse().unwrap();
        assert!(ty.matches(&value));
        let decoded = ty.abi_decode(&value.abi_encode()).unwrap();
        assert_eq!(decoded, value);

        let swap = SwapParams::exact_input(false, U256::from(7u64)).unwrap();
        let DynSolValue::Tuple(fields) = swap_params_value(&swap) else { panic!("not a tuple") };
        assert_eq!(fields[1], DynSolValue::Int(I256::try_from(-7i64).unwrap(), 256));
    }

    /// Tests the signature argument widths
    #[test]
    fn test_permit_signature_values() {
        let permit = PermitAuthorization {
            token: Address::ZERO,
            owner: Address::ZERO,
            spender: Address::ZERO,
            value: U256::ZERO,
            nonce: U256::ZERO,
            deadline: U256::ZERO,
            v: 28,
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
        };
        let [v, r, s] = permit_signature_values(&permit);
        assert_eq!(v, DynSolValue::Uint(U256::from(28u8), 8));
        assert_eq!(r.as_fixed_bytes(), Some((B256::repeat_byte(1).as_slice(), 32)));
        assert_eq!(s.as_fixed_bytes(), Some((B256::repeat_byte(2).as_slice(), 32)));

        // Prices are within their declared width
        let price = DynSolValue::Uint(U256::from(SQRT_PRICE_1_1), 160);
        assert!(DynSolType::Uint(160).matches(&price));
    }
}
