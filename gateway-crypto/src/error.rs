//! Errors emitted by the cryptographic primitives

use thiserror::Error;

/// The error type for cryptographic operations
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// A private key was malformed
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Signing a digest failed
    #[error("signing error: {0}")]
    Signing(String),
    /// A signature was malformed or could not be recovered
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}
