//! Reads balances around a transaction and computes their signed deltas

use alloy_primitives::{Address, U256};
use common::types::balances::{BalanceDelta, BalanceSnapshot};
use tracing::instrument;

use crate::{client::erc20::Erc20Ext, errors::ChainClientError, traits::ChainClient};

/// Fail unless `address` has code deployed
pub async fn ensure_contract(
    client: &dyn ChainClient,
    address: Address,
) -> Result<(), ChainClientError> {
    let code = client.code_at(address).await?;
    if code.is_empty() {
        return Err(ChainClientError::NotAContract(address));
    }

    Ok(())
}

/// Reads token balances through a chain client
pub struct BalanceReconciler<'a> {
    /// The client balances are read through
    client: &'a dyn ChainClient,
}

impl<'a> BalanceReconciler<'a> {
    /// Constructor
    pub fn new(client: &'a dyn ChainClient) -> Self {
        Self { client }
    }

    /// Read the balance of `owner` in `currency`
    ///
    /// Both addresses are validated before the node is contacted, and the
    /// currency must have code deployed
    #[instrument(skip_all, err, fields(currency = %currency, owner = %owner))]
    pub async fn read_balance(
        &self,
        currency: Address,
        owner: Address,
    ) -> Result<U256, ChainClientError> {
        if currency.is_zero() {
            return Err(ChainClientError::InvalidAddress("currency is the zero address".into()));
        }
        if owner.is_zero() {
            return Err(ChainClientError::InvalidAddress("owner is the zero address".into()));
        }

        ensure_contract(self.client, currency).await?;
        self.client.erc20_balance(currency, owner).await
    }

    /// Read the balances of `owner` in each currency
    pub async fn snapshot(
        &self,
        owner: Address,
        currencies: &[Address],
    ) -> Result<BalanceSnapshot, ChainClientError> {
        let mut balances = Vec::with_capacity(currencies.len());
        for currency in currencies {
            let amount = self.read_balance(*currency, owner).await?;
            balances.push((*currency, amount));
        }

        Ok(BalanceSnapshot { owner, balances })
    }

    /// The signed change from `before` to `after`, per currency
    pub fn delta(
        before: &BalanceSnapshot,
        after: &BalanceSnapshot,
    ) -> Result<BalanceDelta, ChainClientError> {
        BalanceDelta::between(before, after).map_err(ChainClientError::Reconciliation)
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::address;

    use super::*;
    use crate::mocks::MockChainClient;

    /// The test token
    const TOKEN: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    /// The test owner
    const OWNER: Address = address!("0x3000000000000000000000000000000000000003");

    /// Tests that zero addresses fail before the node is contacted
    #[tokio::test]
    async fn test_zero_address_no_network() {
        let mock = MockChainClient::new(1);
        let reconciler = BalanceReconciler::new(&mock);

        let err = reconciler.read_balance(Address::ZERO, OWNER).await.unwrap_err();
        assert!(matches!(err, ChainClientError::InvalidAddress(_)));
        let err = reconciler.read_balance(TOKEN, Address::ZERO).await.unwrap_err();
        assert!(matches!(err, ChainClientError::InvalidAddress(_)));
        assert_eq!(mock.interaction_count(), 0);
    }

    /// Tests that an address without code is not read
    #[tokio::test]
    async fn test_not_a_contract() {
        let mock = MockChainClient::new(1);
        let reconciler = BalanceReconciler::new(&mock);

        let err = reconciler.read_balance(TOKEN, OWNER).await.unwrap_err();
        assert!(matches!(err, ChainClientError::NotAContract(addr) if addr == TOKEN));
    }

    /// Tests a snapshot and delta around a balance change
    #[tokio::test]
    async fn test_snapshot_delta() {
        let other = address!("0x6000000000000000000000000000000000000006");
        let mock = MockChainClient::new(1);
        mock.add_token(TOKEN, "Token A");
        mock.add_token(other, "Token B");
        mock.set_balance(TOKEN, OWNER, U256::from(50u64));

        let reconciler = BalanceReconciler::new(&mock);
        let before = reconciler.snapshot(OWNER, &[TOKEN, other]).await.unwrap();
        mock.set_balance(TOKEN, OWNER, U256::from(20u64));
        mock.set_balance(other, OWNER, U256::from(5u64));
        let after = reconciler.snapshot(OWNER, &[TOKEN, other]).await.unwrap();

        let delta = BalanceReconciler::delta(&before, &after).unwrap();
        assert_eq!(delta.delta_of(&TOKEN).unwrap().to_string(), "-30");
        assert_eq!(delta.delta_of(&other).unwrap().to_string(), "5");
    }
}
