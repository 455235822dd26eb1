//! Possible errors thrown by the chain client

use alloy_primitives::{Address, B256};
use common::types::pool::InvalidPoolKey;
use gateway_crypto::CryptoError;

/// The error type returned by the chain client interface
#[derive(Clone, Debug, thiserror::Error)]
pub enum ChainClientError {
    /// Error thrown when the client configuration is invalid
    #[error("chain client configuration error: {0}")]
    Config(String),
    /// Error thrown when call arguments do not match a contract interface
    #[error("encoding error: {0}")]
    Encoding(String),
    /// Error thrown when the node cannot be reached
    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),
    /// Error thrown when the node answers a read with an error
    #[error("chain query error: {0}")]
    ChainQuery(String),
    /// Error thrown when a private key is malformed
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Error thrown when signing fails
    #[error("signing error: {0}")]
    Signing(String),
    /// Error thrown when a signature is malformed or unrecoverable
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    /// Error thrown when the node rejects a transaction for broadcast
    #[error("submission rejected: {0}")]
    Submission(String),
    /// Error thrown when a transaction is mined with a failure status
    #[error("transaction {tx_hash:#x} reverted")]
    ExecutionReverted {
        /// The hash of the reverted transaction
        tx_hash: B256,
    },
    /// Error thrown when a balance is read for the zero address
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Error thrown when an address expected to be a contract has no code
    #[error("no contract deployed at {0:#x}")]
    NotAContract(Address),
    /// Error thrown when a transaction is not mined in time
    #[error("timed out waiting for transaction {tx_hash:#x} after {timeout_ms}ms")]
    Timeout {
        /// The hash of the pending transaction
        tx_hash: B256,
        /// The time waited, in milliseconds
        timeout_ms: u64,
    },
    /// Error thrown when a pool key violates the pool manager's invariants
    #[error("invalid pool key: {0}")]
    InvalidPoolKey(#[from] InvalidPoolKey),
    /// Error thrown when two balance snapshots cannot be compared
    #[error("reconciliation error: {0}")]
    Reconciliation(String),
}

impl ChainClientError {
    /// Create a new encoding error
    #[allow(clippy::needless_pass_by_value)]
    pub fn encoding<T: ToString>(msg: T) -> Self {
        Self::Encoding(msg.to_string())
    }

    /// Create a new chain unavailable error
    #[allow(clippy::needless_pass_by_value)]
    pub fn unavailable<T: ToString>(msg: T) -> Self {
        Self::ChainUnavailable(msg.to_string())
    }

    /// Create a new chain query error
    #[allow(clippy::needless_pass_by_value)]
    pub fn query<T: ToString>(msg: T) -> Self {
        Self::ChainQuery(msg.to_string())
    }

    /// Create a new signing error
    #[allow(clippy::needless_pass_by_value)]
    pub fn signing<T: ToString>(msg: T) -> Self {
        Self::Signing(msg.to_string())
    }

    /// Create a new submission error
    #[allow(clippy::needless_pass_by_value)]
    pub fn submission<T: ToString>(msg: T) -> Self {
        Self::Submission(msg.to_string())
    }

    /// Whether the error stems from the node being unreachable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ChainUnavailable(_))
    }

    /// Re-tag a read failure as the node being unavailable, leaving other
    /// errors untouched
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::ChainQuery(msg) => Self::ChainUnavailable(msg),
            other => other,
        }
    }
}

impl From<CryptoError> for ChainClientError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKey(msg) => Self::InvalidKey(msg),
            CryptoError::Signing(msg) => Self::Signing(msg),
            CryptoError::InvalidSignature(msg) => Self::InvalidSignature(msg),
        }
    }
}

impl From<alloy_sol_types::Error> for ChainClientError {
    fn from(e: alloy_sol_types::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
