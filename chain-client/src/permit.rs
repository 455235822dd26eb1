//! Builds and signs ERC20 permits against a token's on-chain state
//!
//! Both the owner's permit nonce and the token's domain separator are read
//! from the token for every permit; neither is cached, so consecutive permits
//! for one owner see each other's nonce consumption

use alloy_primitives::{Address, B256, U256};
use common::types::permit::PermitAuthorization;
use gateway_crypto::{
    ecdsa::RecoverableSignature,
    eip712::{PermitMessage, permit_digest, recover_permit_signer},
    keys::SigningKey,
};
use tracing::instrument;

use crate::{client::erc20::Erc20Ext, context::ChainContext, errors::ChainClientError};

/// Map any failure reading permit state from a token to a query error
fn permit_query_error(what: &str, token: Address, e: ChainClientError) -> ChainClientError {
    ChainClientError::query(format!("fetching {what} from {token:#x}: {e}"))
}

/// A permit with its digest computed, awaiting a signature
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnsignedPermit {
    /// The token the permit is for
    pub token: Address,
    /// The signed fields of the permit
    pub message: PermitMessage,
    /// The token's domain separator at build time
    pub domain_separator: B256,
    /// The digest to sign
    pub digest: B256,
}

impl UnsignedPermit {
    /// Sign the permit with the owner's key
    pub fn sign(&self, key: &SigningKey) -> Result<PermitAuthorization, ChainClientError> {
        if key.address() != self.message.owner {
            return Err(ChainClientError::signing(format!(
                "permit owner is {:#x} but the key is for {:#x}",
                self.message.owner,
                key.address()
            )));
        }

        let sig = gateway_crypto::ecdsa::sign_digest(&self.digest, key)?;
        Ok(self.authorization(&sig))
    }

    /// Attach a signature to the permit
    fn authorization(&self, sig: &RecoverableSignature) -> PermitAuthorization {
        PermitAuthorization {
            token: self.token,
            owner: self.message.owner,
            spender: self.message.spender,
            value: self.message.value,
            nonce: self.message.nonce,
            deadline: self.message.deadline,
            v: sig.v,
            r: sig.r,
            s: sig.s,
        }
    }
}

/// Builds permits by reading a token's permit state
pub struct PermitBuilder<'a> {
    /// The chain the tokens live on
    chain: &'a ChainContext,
}

impl<'a> PermitBuilder<'a> {
    /// Constructor
    pub fn new(chain: &'a ChainContext) -> Self {
        Self { chain }
    }

    /// The digest of a fully specified permit under the token's own domain
    /// separator
    #[instrument(skip_all, err, fields(token = %token))]
    pub async fn build_permit_digest(
        &self,
        token: Address,
        message: &PermitMessage,
    ) -> Result<B256, ChainClientError> {
        let separator = self
            .chain
            .client()
            .domain_separator(token)
            .await
            .map_err(|e| permit_query_error("domain separator", token, e))?;
        Ok(permit_digest(&separator, message))
    }

    /// Build a permit for `owner`'s next permit nonce
    #[instrument(skip_all, err, fields(token = %token, owner = %owner))]
    pub async fn build(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
    ) -> Result<UnsignedPermit, ChainClientError> {
        let client = self.chain.client();
        let nonce = client
            .permit_nonce(token, owner)
            .await
            .map_err(|e| permit_query_error("permit nonce", token, e))?;
        let domain_separator = client
            .domain_separator(token)
            .await
            .map_err(|e| permit_query_error("domain separator", token, e))?;

        let message = PermitMessage { owner, spender, value, nonce, deadline };
        let digest = permit_digest(&domain_separator, &message);
        Ok(UnsignedPermit { token, message, domain_separator, digest })
    }
}

/// Recover the signer of a permit authorization under a domain separator
pub fn permit_signer(
    domain_separator: &B256,
    permit: &PermitAuthorization,
) -> Result<Address, ChainClientError> {
    let message = PermitMessage {
        owner: permit.owner,
        spender: permit.spender,
        value: permit.value,
        nonce: permit.nonce,
        deadline: permit.deadline,
    };
    let sig = RecoverableSignature { v: permit.v, r: permit.r, s: permit.s };
    Ok(recover_permit_signer(domain_separator, &message, &sig)?)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use alloy_primitives::address;

    use super::*;
    use crate::mocks::MockChainClient;

    /// The test token
    const TOKEN: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    /// The test spender
    const SPENDER: Address = address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512");

    /// Build a chain context with a single permit token
    async fn setup() -> (Arc<MockChainClient>, ChainContext) {
        let mock = Arc::new(MockChainClient::new(31337));
        mock.add_token(TOKEN, "Test Token");
        let chain = ChainContext::new(mock.clone()).await.unwrap();
        (mock, chain)
    }

    /// Tests that a permit is built at the current nonce and recovers the owner
    #[tokio::test]
    async fn test_build_and_sign() {
        let (mock, chain) = setup().await;
        let key = SigningKey::from_seed("alice").unwrap();
        mock.set_permit_nonce(TOKEN, key.address(), U256::from(3u64));

        let builder = PermitBuilder::new(&chain);
        let value = U256::from(1000u64);
        let deadline = U256::from(9_999_999_999u64);
        let unsigned = builder.build(TOKEN, key.address(), SPENDER, value, deadline).await.unwrap();
        assert_eq!(unsigned.message.nonce, U256::from(3u64));
        assert_eq!(unsigned.domain_separator, mock.domain_separator_of(TOKEN).unwrap());

        // The digest matches one built from the fully specified message
        let digest = builder.build_permit_digest(TOKEN, &unsigned.message).await.unwrap();
        assert_eq!(digest, unsigned.digest);

        let permit = unsigned.sign(&key).unwrap();
        assert!(permit.v == 27 || permit.v == 28);
        assert_eq!(permit_signer(&unsigned.domain_separator, &permit).unwrap(), key.address());
    }

    /// Tests that the nonce is read fresh for each permit
    #[tokio::test]
    async fn test_nonce_not_cached() {
        let (mock, chain) = setup().await;
        let owner = SigningKey::from_seed("alice").unwrap().address();
        let builder = PermitBuilder::new(&chain);

        let first = builder.build(TOKEN, owner, SPENDER, U256::from(1u64), U256::MAX).await.unwrap();
        mock.set_permit_nonce(TOKEN, owner, U256::from(1u64));
        let second = builder.build(TOKEN, owner, SPENDER, U256::from(1u64), U256::MAX).await.unwrap();

        assert_eq!(first.message.nonce, U256::ZERO);
        assert_eq!(second.message.nonce, U256::from(1u64));
        assert_ne!(first.digest, second.digest);
    }

    /// Tests that signing with a key other than the owner's is refused
    #[tokio::test]
    async fn test_wrong_owner_key() {
        let (_mock, chain) = setup().await;
        let owner = SigningKey::from_seed("alice").unwrap().address();
        let unsigned = PermitBuilder::new(&chain)
            .build(TOKEN, owner, SPENDER, U256::from(1u64), U256::MAX)
            .await
            .unwrap();

        let bob = SigningKey::from_seed("bob").unwrap();
        assert!(matches!(unsigned.sign(&bob), Err(ChainClientError::Signing(_))));
    }

    /// Tests that failing to read permit state is a query error
    #[tokio::test]
    async fn test_fetch_failure() {
        let (mock, chain) = setup().await;
        let builder = PermitBuilder::new(&chain);
        let unknown = address!("0x9000000000000000000000000000000000000009");
        let err = builder.build(unknown, SPENDER, SPENDER, U256::ZERO, U256::MAX).await.unwrap_err();
        assert!(matches!(err, ChainClientError::ChainQuery(_)));

        mock.set_unavailable(true);
        let err = builder.build(TOKEN, SPENDER, SPENDER, U256::ZERO, U256::MAX).await.unwrap_err();
        assert!(matches!(err, ChainClientError::ChainQuery(_)));
    }
}
