//! Helpers for converting values to and from hex and decimal strings

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};

/// Convert a byte array to a hex string
pub fn bytes_to_hex_string(bytes: &[u8]) -> String {
    let encoded = hex::encode(bytes);
    format!("0x{encoded}")
}

/// Convert a hex string to a byte array, the `0x` prefix is optional
pub fn bytes_from_hex_string(hex: &str) -> Result<Vec<u8>, String> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    hex::decode(hex).map_err(|e| format!("error deserializing bytes from hex string: {e}"))
}

/// Convert a hex string to a 32-byte word
pub fn b256_from_hex_string(hex: &str) -> Result<B256, String> {
    let bytes = bytes_from_hex_string(hex)?;
    if bytes.len() != B256::len_bytes() {
        return Err(format!("expected 32 bytes, got {}", bytes.len()));
    }

    Ok(B256::from_slice(&bytes))
}

/// Convert an address to a hex string
pub fn address_to_hex_string(addr: &Address) -> String {
    format!("{addr:#x}")
}

/// Convert a hex string to an address
pub fn address_from_hex_string(hex: &str) -> Result<Address, String> {
    Address::from_str(hex).map_err(|e| format!("error deserializing address from hex string: {e}"))
}

/// Parse a base-10 integer string into a `U256`
///
/// Signs, hex prefixes, and empty strings are rejected
pub fn u256_from_dec_string(val: &str) -> Result<U256, String> {
    if val.is_empty() || !val.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid decimal integer: {val:?}"));
    }

    U256::from_str_radix(val, 10 /* radix */)
        .map_err(|e| format!("error parsing decimal integer {val}: {e}"))
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests that the `0x` prefix is optional when parsing bytes
    #[test]
    fn test_bytes_prefix_optional() {
        let a = bytes_from_hex_string("0xdeadbeef").unwrap();
        let b = bytes_from_hex_string("deadbeef").unwrap();
        assert_eq!(a, b);
        assert_eq!(bytes_to_hex_string(&a), "0xdeadbeef");
    }

    /// Tests parsing a word of the wrong length
    #[test]
    fn test_b256_wrong_length() {
        assert!(b256_from_hex_string("0x1234").is_err());
        assert!(b256_from_hex_string(&"ab".repeat(32)).is_ok());
    }

    /// Tests decimal parsing edge cases
    #[test]
    fn test_dec_string() {
        assert_eq!(u256_from_dec_string("10000000").unwrap(), U256::from(10_000_000u64));
        assert!(u256_from_dec_string("").is_err());
        assert!(u256_from_dec_string("-1").is_err());
        assert!(u256_from_dec_string("0x10").is_err());
        assert!(u256_from_dec_string("1e18").is_err());

        // One past the max value overflows
        let max = U256::MAX.to_string();
        assert_eq!(u256_from_dec_string(&max).unwrap(), U256::MAX);
        let overflow = format!("{max}0");
        assert!(u256_from_dec_string(&overflow).is_err());
    }

    /// Tests that addresses are emitted in lowercase
    #[test]
    fn test_address_lowercase() {
        let addr = address_from_hex_string("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(address_to_hex_string(&addr), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }
}
