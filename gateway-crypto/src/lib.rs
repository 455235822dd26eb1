//! Cryptography helpers and primitives for authorizing gateway actions
//!
//! This covers the EIP-712 digests of ERC20 permits, secp256k1 signing and
//! recovery over those digests, and the keys that sign them
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod ecdsa;
pub mod eip712;
pub mod error;
pub mod keys;

pub use error::CryptoError;
