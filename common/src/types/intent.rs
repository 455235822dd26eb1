//! Types describing a transaction before signing and after inclusion

use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// An unsigned transaction, built fresh for each call and consumed by signing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactIntent {
    /// The account sending the transaction
    pub from: Address,
    /// The contract being called
    pub to: Address,
    /// The value attached to the call, in wei
    pub value: U256,
    /// The gas limit of the transaction
    pub gas_limit: u64,
    /// The gas price of the transaction, in wei
    pub gas_price: u128,
    /// The account nonce of the transaction
    pub nonce: u64,
    /// The encoded calldata
    pub data: Bytes,
}

impl TransactIntent {
    /// Replace the calldata of the intent
    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Replace the gas limit of the intent
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}

/// The outcome of an included transaction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinedReceipt {
    /// The hash of the transaction
    pub tx_hash: B256,
    /// Whether execution succeeded
    pub status: bool,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
    /// The gas consumed by the transaction
    pub gas_used: u64,
}
