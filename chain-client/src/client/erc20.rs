//! ERC20 reads over any chain client

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use crate::{
    abi::IERC20Permit::{DOMAIN_SEPARATORCall, allowanceCall, balanceOfCall, noncesCall},
    errors::ChainClientError,
    traits::ChainClient,
};

/// Typed ERC20 view calls, available on every chain client
#[async_trait]
pub trait Erc20Ext: ChainClient {
    /// Get the balance of `owner` in `token`
    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, ChainClientError> {
        let data = balanceOfCall { account: owner }.abi_encode();
        let ret = self.call(token, data.into()).await?;
        balanceOfCall::abi_decode_returns(&ret).map_err(|e| {
            ChainClientError::query(format!("bad balanceOf return from {token:#x}: {e}"))
        })
    }

    /// Get the allowance `owner` has granted `spender` in `token`
    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainClientError> {
        let data = allowanceCall { owner, spender }.abi_encode();
        let ret = self.call(token, data.into()).await?;
        allowanceCall::abi_decode_returns(&ret).map_err(|e| {
            ChainClientError::query(format!("bad allowance return from {token:#x}: {e}"))
        })
    }

    /// Get the current permit nonce of `owner` in `token`
    async fn permit_nonce(&self, token: Address, owner: Address) -> Result<U256, ChainClientError> {
        let data = noncesCall { owner }.abi_encode();
        let ret = self.call(token, data.into()).await?;
        noncesCall::abi_decode_returns(&ret).map_err(|e| {
            ChainClientError::query(format!("bad nonces return from {token:#x}: {e}"))
        })
    }

    /// Get the EIP-712 domain separator `token` verifies permits under
    async fn domain_separator(&self, token: Address) -> Result<B256, ChainClientError> {
        let data = DOMAIN_SEPARATORCall {}.abi_encode();
        let ret = self.call(token, data.into()).await?;
        DOMAIN_SEPARATORCall::abi_decode_returns(&ret).map_err(|e| {
            ChainClientError::query(format!("bad DOMAIN_SEPARATOR return from {token:#x}: {e}"))
        })
    }
}
impl<T: ChainClient + ?Sized> Erc20Ext for T {}
