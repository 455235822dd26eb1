//! The transactor context: a signing key bound to a chain, with the nonce and
//! gas price it will use for its next transactions

use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    primitives::{Address, B256, Bytes, TxKind, U256},
    signers::SignerSync,
};
use common::types::intent::TransactIntent;
use gateway_crypto::keys::SigningKey;
use tracing::{debug, instrument};

use crate::{context::ChainContext, errors::ChainClientError};

/// A transaction signed and encoded for broadcast
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The hash of the signed transaction
    pub hash: B256,
    /// The EIP-2718 encoding of the transaction
    pub raw: Bytes,
    /// The account nonce the transaction consumes
    pub nonce: u64,
}

/// A signing key bound to a chain, tracking the account nonce locally
///
/// The nonce is read once, counting pending transactions, and incremented
/// locally for each intent built. Dependent transactions from one account are
/// therefore sequenced without re-querying the node between them
#[derive(Clone, Debug)]
pub struct TransactorContext {
    /// The chain id transactions are bound to
    chain_id: u64,
    /// The key signing transactions
    key: SigningKey,
    /// The nonce of the next intent
    next_nonce: u64,
    /// The gas price applied to every intent
    gas_price: u128,
}

impl TransactorContext {
    /// Build a transactor for `key`, reading its pending nonce and a gas price
    /// suggestion from the node
    #[instrument(skip_all, err, fields(address = %key.address()))]
    pub async fn new(chain: &ChainContext, key: SigningKey) -> Result<Self, ChainClientError> {
        let client = chain.client();
        let chain_id = client.chain_id().await.map_err(ChainClientError::into_unavailable)?;
        if chain_id != chain.chain_id() {
            return Err(ChainClientError::unavailable(format!(
                "node reports chain {chain_id}, expected {}",
                chain.chain_id()
            )));
        }

        let next_nonce = client
            .pending_nonce(key.address())
            .await
            .map_err(ChainClientError::into_unavailable)?;
        let gas_price =
            client.suggest_gas_price().await.map_err(ChainClientError::into_unavailable)?;
        debug!("transactor ready at nonce {next_nonce}, gas price {gas_price}");

        Ok(Self { chain_id, key, next_nonce, gas_price })
    }

    /// Build a transactor from a hex encoded private key
    pub async fn from_hex_key(chain: &ChainContext, key: &str) -> Result<Self, ChainClientError> {
        let key = SigningKey::from_hex(key)?;
        Self::new(chain, key).await
    }

    /// The address transactions are sent from
    pub fn address(&self) -> Address {
        self.key.address()
    }

    /// The chain id transactions are bound to
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The nonce the next intent will use
    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    /// The gas price applied to intents
    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }

    /// Build the next intent from this account, consuming a nonce
    pub fn next_intent(&mut self, to: Address, data: Bytes, gas_limit: u64) -> TransactIntent {
        let nonce = self.next_nonce;
        self.next_nonce += 1;

        TransactIntent {
            from: self.address(),
            to,
            value: U256::ZERO,
            gas_limit,
            gas_price: self.gas_price,
            nonce,
            data,
        }
    }

    /// Sign an intent as a legacy transaction bound to the chain id
    pub fn sign(&self, intent: &TransactIntent) -> Result<SignedTransaction, ChainClientError> {
        if intent.from != self.address() {
            return Err(ChainClientError::signing(format!(
                "intent is from {:#x} but the transactor signs for {:#x}",
                intent.from,
                self.address()
            )));
        }

        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: intent.nonce,
            gas_price: intent.gas_price,
            gas_limit: intent.gas_limit,
            to: TxKind::Call(intent.to),
            value: intent.value,
            input: intent.data.clone(),
        };

        let sighash = tx.signature_hash();
        let sig = self.key.signer().sign_hash_sync(&sighash).map_err(ChainClientError::signing)?;
        let signed = tx.into_signed(sig);
        let hash = *signed.hash();
        let raw = TxEnvelope::Legacy(signed).encoded_2718();

        Ok(SignedTransaction { hash, raw: raw.into(), nonce: intent.nonce })
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use alloy::{consensus::Transaction, eips::eip2718::Decodable2718};
    use alloy_primitives::address;

    use super::*;
    use crate::mocks::{DEV_KEY, MockChainClient};

    /// The router the test intents are sent to
    const ROUTER: Address = address!("0x4000000000000000000000000000000000000004");

    /// Build a chain context around a fresh mock
    async fn mock_context() -> (Arc<MockChainClient>, ChainContext) {
        let mock = Arc::new(MockChainClient::new(31337));
        let chain = ChainContext::new(mock.clone()).await.unwrap();
        (mock, chain)
    }

    /// Tests that dependent intents get consecutive nonces
    #[tokio::test]
    async fn test_nonce_sequencing() {
        let (mock, chain) = mock_context().await;
        let key = SigningKey::from_hex(DEV_KEY).unwrap();
        mock.set_nonce(key.address(), 7);

        let mut transactor = TransactorContext::new(&chain, key).await.unwrap();
        let first = transactor.next_intent(ROUTER, Bytes::new(), 100_000);
        let second = transactor.next_intent(ROUTER, Bytes::new(), 100_000);

        assert_eq!(first.nonce, 7);
        assert_eq!(second.nonce, first.nonce + 1);
        assert_eq!(transactor.next_nonce(), 9);
        assert_eq!(first.gas_price, mock.gas_price());
    }

    /// Tests that a signed intent is a legacy transaction bound to the chain
    #[tokio::test]
    async fn test_sign_legacy() {
        let (_mock, chain) = mock_context().await;
        let mut transactor = TransactorContext::from_hex_key(&chain, DEV_KEY).await.unwrap();
        let intent = transactor.next_intent(ROUTER, Bytes::from(vec![1, 2, 3]), 500_000);
        let signed = transactor.sign(&intent).unwrap();

        let envelope = TxEnvelope::decode_2718(&mut signed.raw.as_ref()).unwrap();
        let TxEnvelope::Legacy(legacy) = &envelope else { panic!("not a legacy transaction") };
        assert_eq!(legacy.tx().chain_id, Some(31337));
        assert_eq!(envelope.nonce(), intent.nonce);
        assert_eq!(envelope.to(), Some(ROUTER));
        assert_eq!(envelope.input(), &intent.data);
        assert_eq!(*legacy.hash(), signed.hash);

        let signer = legacy
            .signature()
            .recover_address_from_prehash(&legacy.tx().signature_hash())
            .unwrap();
        assert_eq!(signer, transactor.address());
    }

    /// Tests that an intent from another account is refused
    #[tokio::test]
    async fn test_sign_foreign_intent() {
        let (_mock, chain) = mock_context().await;
        let transactor = TransactorContext::from_hex_key(&chain, DEV_KEY).await.unwrap();
        let mut other = TransactorContext::new(&chain, SigningKey::from_seed("bob").unwrap())
            .await
            .unwrap();

        let intent = other.next_intent(ROUTER, Bytes::new(), 21_000);
        assert!(matches!(transactor.sign(&intent), Err(ChainClientError::Signing(_))));
    }

    /// Tests the error cases of building a transactor
    #[tokio::test]
    async fn test_transactor_errors() {
        let (mock, chain) = mock_context().await;
        let err = TransactorContext::from_hex_key(&chain, "0x1234").await.unwrap_err();
        assert!(matches!(err, ChainClientError::InvalidKey(_)));

        mock.set_unavailable(true);
        let err = TransactorContext::from_hex_key(&chain, DEV_KEY).await.unwrap_err();
        assert!(matches!(err, ChainClientError::ChainUnavailable(_)));
    }
}
