//! Signing keys and their derived addresses

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    str::FromStr,
};

use alloy::{
    primitives::{Address, B256, keccak256},
    signers::local::PrivateKeySigner,
};

use crate::error::CryptoError;

/// The byte length of a secp256k1 private key
pub const PRIVATE_KEY_BYTES: usize = 32;

/// A secp256k1 private key along with the address it controls
#[derive(Clone)]
pub struct SigningKey {
    /// The underlying signer
    signer: PrivateKeySigner,
}

impl SigningKey {
    /// Parse a key from exactly 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PRIVATE_KEY_BYTES {
            return Err(CryptoError::InvalidKey(format!(
                "expected {PRIVATE_KEY_BYTES} bytes, got {}",
                bytes.len()
            )));
        }

        let signer = PrivateKeySigner::from_bytes(&B256::from_slice(bytes))
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Parse a key from a hex string, with or without a `0x` prefix
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let stripped = hex.strip_prefix("0x").unwrap_or(hex);
        if stripped.len() != PRIVATE_KEY_BYTES * 2 {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                PRIVATE_KEY_BYTES * 2,
                stripped.len()
            )));
        }

        let signer =
            PrivateKeySigner::from_str(stripped).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Derive a key deterministically from a seed string as `keccak256(seed)`
    ///
    /// Only suitable for test accounts, the key is as guessable as the seed
    pub fn from_seed(seed: &str) -> Result<Self, CryptoError> {
        let hash = keccak256(seed.as_bytes());
        Self::from_bytes(hash.as_slice())
    }

    /// The address controlled by the key
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying signer
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SigningKey").field("address", &self.address()).finish_non_exhaustive()
    }
}
