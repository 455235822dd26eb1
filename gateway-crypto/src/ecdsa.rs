//! ECDSA over secp256k1 with Ethereum's recovery id conventions
//!
//! Signatures are produced deterministically (RFC 6979) so that the same
//! digest and key always yield the same `(v, r, s)`

use alloy::{
    primitives::{Address, B256, Signature, U256, keccak256},
    signers::SignerSync,
};
use constants::ETH_SIGNED_MESSAGE_PREFIX;
use tracing::debug;

use crate::{error::CryptoError, keys::SigningKey};

/// The offset added to a raw recovery id to form Ethereum's `v`
pub const RECOVERY_ID_OFFSET: u8 = 27;
/// The byte length of a signature with its recovery byte
pub const SIGNATURE_BYTES: usize = 65;
/// The byte length of a compact (EIP-2098) signature
pub const COMPACT_SIGNATURE_BYTES: usize = 64;

/// A signature in Ethereum's `(v, r, s)` form
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// The recovery id, 27 or 28
    pub v: u8,
    /// The `r` component
    pub r: B256,
    /// The `s` component
    pub s: B256,
}

impl RecoverableSignature {
    /// Build from the components of a signature
    pub fn from_signature(sig: &Signature) -> Self {
        Self {
            v: RECOVERY_ID_OFFSET + sig.v() as u8,
            r: B256::from(sig.r().to_be_bytes::<32>()),
            s: B256::from(sig.s().to_be_bytes::<32>()),
        }
    }

    /// Convert to a signature, validating the recovery id
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let parity = parity_from_v(self.v)?;
        Ok(Signature::new(U256::from_be_bytes(self.r.0), U256::from_be_bytes(self.s.0), parity))
    }

    /// The 65-byte `r || s || v` encoding
    pub fn to_bytes(&self) -> [u8; SIGNATURE_BYTES] {
        let mut bytes = [0u8; SIGNATURE_BYTES];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }
}

/// Map a recovery byte in either the raw (0/1) or Ethereum (27/28) convention
/// to a y-parity
fn parity_from_v(v: u8) -> Result<bool, CryptoError> {
    match v {
        0 | 27 => Ok(false),
        1 | 28 => Ok(true),
        _ => Err(CryptoError::InvalidSignature(format!("invalid recovery id: {v}"))),
    }
}

/// Sign a 32-byte digest, returning `v` in `{27, 28}`
pub fn sign_digest(digest: &B256, key: &SigningKey) -> Result<RecoverableSignature, CryptoError> {
    let sig = key.signer().sign_hash_sync(digest).map_err(|e| CryptoError::Signing(e.to_string()))?;
    Ok(RecoverableSignature::from_signature(&sig))
}

/// Recover the signer of a digest from its `(v, r, s)` signature
pub fn recover(digest: &B256, sig: &RecoverableSignature) -> Result<Address, CryptoError> {
    sig.to_signature()?
        .recover_address_from_prehash(digest)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

/// Recover the signer of a digest from an encoded signature
///
/// Accepts the 65-byte `r || s || v` form (with `v` in either convention) and
/// the 64-byte EIP-2098 compact form
pub fn recover_from_bytes(digest: &B256, signature: &[u8]) -> Result<Address, CryptoError> {
    let sig = match signature.len() {
        SIGNATURE_BYTES => {
            let parity = parity_from_v(signature[64])?;
            Signature::from_bytes_and_parity(&signature[..64], parity)
        },
        COMPACT_SIGNATURE_BYTES => Signature::from_erc2098(signature),
        len => {
            return Err(CryptoError::InvalidSignature(format!(
                "expected {SIGNATURE_BYTES} or {COMPACT_SIGNATURE_BYTES} bytes, got {len}"
            )));
        },
    };

    sig.recover_address_from_prehash(digest).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

/// The hash a wallet signs for a raw message:
/// `keccak256("\x19Ethereum Signed Message:\n32" || keccak256(message))`
pub fn signed_message_hash(message: &[u8]) -> B256 {
    let inner = keccak256(message);
    let mut buf = Vec::with_capacity(ETH_SIGNED_MESSAGE_PREFIX.len() + inner.len());
    buf.extend_from_slice(ETH_SIGNED_MESSAGE_PREFIX);
    buf.extend_from_slice(inner.as_slice());
    keccak256(buf)
}

/// Sign a raw message the way a wallet's `personal_sign` would
pub fn sign_message(message: &[u8], key: &SigningKey) -> Result<RecoverableSignature, CryptoError> {
    sign_digest(&signed_message_hash(message), key)
}

/// Verify that `signature` over a raw message was produced by `expected`
///
/// A trailing 65th recovery byte is stripped and both parities are tried
/// over the remaining `r || s`. A 64 byte input is read as EIP-2098, with the
/// top bit of `s` carrying the parity, so that bit is cleared before
/// recovery. Any malformed input or recovery failure yields `false`, never a
/// partial match
pub fn verify_signed_message(message: &[u8], signature: &[u8], expected: Address) -> bool {
    let rs = match signature.len() {
        SIGNATURE_BYTES => signature[..COMPACT_SIGNATURE_BYTES].to_vec(),
        COMPACT_SIGNATURE_BYTES => {
            let mut rs = signature.to_vec();
            rs[32] &= 0x7f;
            rs
        },
        len => {
            debug!("rejecting signature of length {len}");
            return false;
        },
    };

    let hash = signed_message_hash(message);
    [false, true].into_iter().any(|parity| {
        Signature::from_bytes_and_parity(&rs, parity)
            .recover_address_from_prehash(&hash)
            .is_ok_and(|addr| addr == expected)
    })
}

#[cfg(test)]
mod test {
    use rand::{RngCore, thread_rng};

    use super::*;

    /// Generate a random key
    fn random_key() -> SigningKey {
        let mut bytes = [0u8; 32];
        thread_rng().fill_bytes(&mut bytes);
        SigningKey::from_bytes(&bytes).unwrap()
    }

    /// Generate a random digest
    fn random_digest() -> B256 {
        let mut bytes = [0u8; 32];
        thread_rng().fill_bytes(&mut bytes);
        B256::from(bytes)
    }

    /// Tests that recovery inverts signing over random keys and digests
    #[test]
    fn test_sign_recover_roundtrip() {
        const N: usize = 25;
        for _ in 0..N {
            let key = random_key();
            let digest = random_digest();
            let sig = sign_digest(&digest, &key).unwrap();

            assert!(sig.v == 27 || sig.v == 28);
            assert_eq!(recover(&digest, &sig).unwrap(), key.address());
            assert_eq!(recover_from_bytes(&digest, &sig.to_bytes()).unwrap(), key.address());
        }
    }

    /// Tests that signing is deterministic
    #[test]
    fn test_deterministic() {
        let key = random_key();
        let digest = random_digest();
        assert_eq!(sign_digest(&digest, &key).unwrap(), sign_digest(&digest, &key).unwrap());
    }

    /// Tests that the raw and Ethereum recovery id conventions agree, and that
    /// the compact form recovers the same address
    #[test]
    fn test_recovery_conventions() {
        let key = random_key();
        let digest = random_digest();
        let sig = sign_digest(&digest, &key).unwrap();

        let mut raw = sig.to_bytes();
        raw[64] -= RECOVERY_ID_OFFSET;
        assert_eq!(recover_from_bytes(&digest, &raw).unwrap(), key.address());

        let alloy_sig = sig.to_signature().unwrap();
        let compact = alloy_sig.as_erc2098();
        assert_eq!(recover_from_bytes(&digest, &compact).unwrap(), key.address());
    }

    /// Tests that malformed signatures are rejected
    #[test]
    fn test_malformed_signatures() {
        let digest = random_digest();
        let err = recover_from_bytes(&digest, &[0u8; 63]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignature(_)));

        // Bad recovery id
        let mut bytes = [1u8; 65];
        bytes[64] = 29;
        assert!(matches!(recover_from_bytes(&digest, &bytes), Err(CryptoError::InvalidSignature(_))));

        // Zero `r` and `s` are never valid
        let zero = RecoverableSignature { v: 27, r: B256::ZERO, s: B256::ZERO };
        assert!(matches!(recover(&digest, &zero), Err(CryptoError::InvalidSignature(_))));
    }

    /// Tests that raw message verification ignores the recovery byte
    #[test]
    fn test_verify_signed_message() {
        let key = random_key();
        let message = b"hello gateway";
        let sig = sign_message(message, &key).unwrap().to_bytes();

        assert!(verify_signed_message(message, &sig, key.address()));
        assert!(verify_signed_message(message, &sig[..64], key.address()));

        // A garbage recovery byte is ignored
        let mut garbage = sig;
        garbage[64] = 0xff;
        assert!(verify_signed_message(message, &garbage, key.address()));

        // Wrong signer, wrong message, and wrong lengths all fail closed
        assert!(!verify_signed_message(message, &sig, random_key().address()));
        assert!(!verify_signed_message(b"other message", &sig, key.address()));
        assert!(!verify_signed_message(message, &sig[..63], key.address()));
        assert!(!verify_signed_message(message, &[0u8; 65], key.address()));
    }

    /// Tests that a 65 byte signature in its high-s form still verifies
    #[test]
    fn test_verify_high_s_signature() {
        let key = SigningKey::from_seed("alice").unwrap();
        let message = b"hello gateway";
        let sig = sign_message(message, &key).unwrap().to_signature().unwrap();

        // Negate `s` and flip the parity, the same point recovers
        let order = U256::from_str_radix(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
            16,
        )
        .unwrap();
        let high = Signature::new(sig.r(), order - sig.s(), !sig.v());
        let bytes = RecoverableSignature::from_signature(&high).to_bytes();
        assert!(high.s() > order / U256::from(2u8));

        let recovered = recover_from_bytes(&signed_message_hash(message), &bytes).unwrap();
        assert_eq!(recovered, key.address());
        assert!(verify_signed_message(message, &bytes, key.address()));
    }
}
