//! An in-memory chain client for tests
//!
//! Tokens hold balances and permit nonces; transactions are decoded, checked
//! against the sender's nonce and the chain id, and mined immediately unless
//! configured otherwise. Balance changes a pool call would cause are queued by
//! the test and applied when the next successful transaction is mined

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
};

use alloy::{
    consensus::{SignableTransaction, TxEnvelope},
    eips::eip2718::Decodable2718,
    primitives::{Address, B256, Bytes, TxKind, U256},
};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use common::types::{balances::SignedAmount, intent::MinedReceipt};
use gateway_crypto::eip712::domain_separator;

use crate::{
    abi::{
        IERC20Permit::{
            DOMAIN_SEPARATORCall, allowanceCall, approveCall, balanceOfCall, noncesCall,
        },
        IPoolModifyLiquidityTest::modifyLiquidityWithPermitCall,
        IPoolSwapTest::swapWithPermitCall,
    },
    errors::ChainClientError,
    traits::ChainClient,
};

/// The first well-known development key
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// The gas price the mock suggests
pub const MOCK_GAS_PRICE: u128 = 1_000_000_000;
/// Placeholder code marking an address as a contract
const CONTRACT_CODE: [u8; 1] = [0xfe];

/// A change to a token balance applied when a transaction is mined
#[derive(Copy, Clone, Debug)]
pub struct BalanceEffect {
    pub token: Address,
    pub owner: Address,
    pub delta: SignedAmount,
}

impl BalanceEffect {
    /// Increase `owner`'s balance of `token`
    pub fn credit(token: Address, owner: Address, amount: U256) -> Self {
        Self { token, owner, delta: SignedAmount::positive(amount) }
    }

    /// Decrease `owner`'s balance of `token`
    pub fn debit(token: Address, owner: Address, amount: U256) -> Self {
        Self { token, owner, delta: SignedAmount::negative(amount) }
    }
}

/// A transaction the mock accepted
#[derive(Clone, Debug)]
pub struct RecordedTransaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub chain_id: Option<u64>,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub input: Bytes,
}

#[derive(Default)]
struct MockToken {
    balances: HashMap<Address, U256>,
    permit_nonces: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    domain_separator: B256,
}

#[derive(Default)]
struct MockState {
    chain_id: u64,
    gas_price: u128,
    nonces: HashMap<Address, u64>,
    code: HashMap<Address, Bytes>,
    tokens: HashMap<Address, MockToken>,
    effects: VecDeque<Vec<BalanceEffect>>,
    sent: Vec<RecordedTransaction>,
    receipts: HashMap<B256, MinedReceipt>,
    block_number: u64,
    interactions: usize,
    revert_next: bool,
    withhold_receipts: bool,
    ignore_approvals: bool,
    unavailable: bool,
}

impl MockState {
    fn token(&self, token: Address) -> Result<&MockToken, ChainClientError> {
        self.tokens.get(&token).ok_or_else(|| ChainClientError::query("execution reverted"))
    }

    fn apply(&mut self, effect: &BalanceEffect) {
        let token = self.tokens.entry(effect.token).or_default();
        let balance = token.balances.entry(effect.owner).or_default();
        *balance = if effect.delta.is_negative() {
            balance.saturating_sub(effect.delta.magnitude())
        } else {
            balance.saturating_add(effect.delta.magnitude())
        };
    }

    fn bump_permit_nonce(&mut self, token: Address, owner: Address) {
        let nonce = self.tokens.entry(token).or_default().permit_nonces.entry(owner).or_default();
        *nonce += U256::from(1u64);
    }

    /// Record the allowance an `approve` to `token` grants
    fn record_approval(&mut self, token: Address, owner: Address, input: &[u8]) {
        if self.ignore_approvals {
            return;
        }

        if let Ok(call) = approveCall::abi_decode(input) {
            let token = self.tokens.entry(token).or_default();
            token.allowances.insert((owner, call.spender), call.amount);
        }
    }

    /// Consume the permit nonces a permit based pool call spends
    fn consume_permits(&mut self, input: &[u8]) {
        if let Ok(call) = swapWithPermitCall::abi_decode(input) {
            let token =
                if call.params.zeroForOne { call.key.currency0 } else { call.key.currency1 };
            self.bump_permit_nonce(token, call.user);
        } else if let Ok(call) = modifyLiquidityWithPermitCall::abi_decode(input) {
            self.bump_permit_nonce(call.key.currency0, call.user);
            self.bump_permit_nonce(call.key.currency1, call.user);
        }
    }
}

/// An in-memory chain client
pub struct MockChainClient {
    state: Mutex<MockState>,
}

impl MockChainClient {
    /// A mock of the chain with the given id
    pub fn new(chain_id: u64) -> Self {
        let state = MockState { chain_id, gas_price: MOCK_GAS_PRICE, ..Default::default() };
        Self { state: Mutex::new(state) }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Lock the state for a node interaction
    fn interact(&self) -> Result<MutexGuard<'_, MockState>, ChainClientError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(ChainClientError::unavailable("connection refused"));
        }

        state.interactions += 1;
        Ok(state)
    }

    // -----------
    // | Setters |
    // -----------

    /// Mark an address as a contract
    pub fn add_contract(&self, address: Address) {
        self.state().code.insert(address, Bytes::from_static(&CONTRACT_CODE));
    }

    /// Deploy a permit token with a standard domain
    pub fn add_token(&self, token: Address, name: &str) {
        let mut state = self.state();
        let separator = domain_separator(name, "1", state.chain_id, token);
        state.code.insert(token, Bytes::from_static(&CONTRACT_CODE));
        state.tokens.entry(token).or_default().domain_separator = separator;
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state().tokens.entry(token).or_default().balances.insert(owner, amount);
    }

    pub fn set_permit_nonce(&self, token: Address, owner: Address, nonce: U256) {
        self.state().tokens.entry(token).or_default().permit_nonces.insert(owner, nonce);
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state().nonces.insert(address, nonce);
    }

    /// Queue balance changes for the next successful transaction
    pub fn queue_effects(&self, effects: Vec<BalanceEffect>) {
        self.state().effects.push_back(effects);
    }

    /// Mine the next transaction with a failure status
    pub fn revert_next(&self) {
        self.state().revert_next = true;
    }

    /// Accept transactions without ever mining them
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state().withhold_receipts = withhold;
    }

    /// Mine approvals without changing any allowance
    pub fn ignore_approvals(&self, ignore: bool) {
        self.state().ignore_approvals = ignore;
    }

    /// Refuse all interactions as if the node were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    // -----------
    // | Getters |
    // -----------

    pub fn gas_price(&self) -> u128 {
        self.state().gas_price
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        let state = self.state();
        state.tokens.get(&token).and_then(|t| t.balances.get(&owner).copied()).unwrap_or_default()
    }

    pub fn allowance_of(&self, token: Address, owner: Address, spender: Address) -> U256 {
        let state = self.state();
        state
            .tokens
            .get(&token)
            .and_then(|t| t.allowances.get(&(owner, spender)).copied())
            .unwrap_or_default()
    }

    pub fn permit_nonce_of(&self, token: Address, owner: Address) -> U256 {
        let state = self.state();
        state
            .tokens
            .get(&token)
            .and_then(|t| t.permit_nonces.get(&owner).copied())
            .unwrap_or_default()
    }

    pub fn domain_separator_of(&self, token: Address) -> Option<B256> {
        self.state().tokens.get(&token).map(|t| t.domain_separator)
    }

    /// The transactions accepted so far, in order
    pub fn sent_transactions(&self) -> Vec<RecordedTransaction> {
        self.state().sent.clone()
    }

    /// The number of node interactions served
    pub fn interaction_count(&self) -> usize {
        self.state().interactions
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        Ok(self.interact()?.chain_id)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainClientError> {
        Ok(self.interact()?.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn suggest_gas_price(&self) -> Result<u128, ChainClientError> {
        Ok(self.interact()?.gas_price)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainClientError> {
        Ok(self.interact()?.code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainClientError> {
        let state = self.interact()?;
        let token = state.token(to)?;

        let ret = if let Ok(call) = balanceOfCall::abi_decode(&data) {
            token.balances.get(&call.account).copied().unwrap_or_default().abi_encode()
        } else if let Ok(call) = noncesCall::abi_decode(&data) {
            token.permit_nonces.get(&call.owner).copied().unwrap_or_default().abi_encode()
        } else if DOMAIN_SEPARATORCall::abi_decode(&data).is_ok() {
            token.domain_separator.abi_encode()
        } else if let Ok(call) = allowanceCall::abi_decode(&data) {
            let key = (call.owner, call.spender);
            token.allowances.get(&key).copied().unwrap_or_default().abi_encode()
        } else {
            return Err(ChainClientError::query("execution reverted: unknown selector"));
        };

        Ok(ret.into())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainClientError> {
        let mut state = self.interact()?;
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| ChainClientError::submission(format!("rlp: {e}")))?;
        let TxEnvelope::Legacy(signed) = envelope else {
            return Err(ChainClientError::submission("only legacy transactions are accepted"));
        };

        let tx = signed.tx();
        if tx.chain_id != Some(state.chain_id) {
            return Err(ChainClientError::submission("invalid chain id for signer"));
        }
        let from = signed
            .signature()
            .recover_address_from_prehash(&tx.signature_hash())
            .map_err(|e| ChainClientError::submission(format!("invalid sender: {e}")))?;

        let expected = state.nonces.get(&from).copied().unwrap_or_default();
        if tx.nonce < expected {
            return Err(ChainClientError::submission(format!(
                "nonce too low: next nonce {expected}, tx nonce {}",
                tx.nonce
            )));
        }
        if tx.nonce > expected {
            return Err(ChainClientError::submission(format!(
                "nonce too high: next nonce {expected}, tx nonce {}",
                tx.nonce
            )));
        }
        state.nonces.insert(from, expected + 1);

        let hash = *signed.hash();
        let to = match tx.to {
            TxKind::Call(addr) => Some(addr),
            TxKind::Create => None,
        };
        state.sent.push(RecordedTransaction {
            hash,
            from,
            to,
            nonce: tx.nonce,
            chain_id: tx.chain_id,
            gas_limit: tx.gas_limit,
            gas_price: tx.gas_price,
            input: tx.input.clone(),
        });

        // Mine the transaction immediately
        let status = !std::mem::take(&mut state.revert_next);
        if status {
            if let Some(effects) = state.effects.pop_front() {
                effects.iter().for_each(|e| state.apply(e));
            }
            state.consume_permits(&tx.input);
            if let Some(token) = to {
                state.record_approval(token, from, &tx.input);
            }
        }

        state.block_number += 1;
        if !state.withhold_receipts {
            let receipt = MinedReceipt {
                tx_hash: hash,
                status,
                block_number: Some(state.block_number),
                gas_used: tx.gas_limit / 2,
            };
            state.receipts.insert(hash, receipt);
        }

        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<MinedReceipt>, ChainClientError> {
        Ok(self.interact()?.receipts.get(&tx_hash).copied())
    }
}
