//! Tests approving the routers to spend the gateway's tokens

mod helpers;

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256, address};
use chain_client::errors::ChainClientError;
use common::types::tasks::ApproveTokensTaskDescriptor;
use constants::APPROVE_GAS_LIMIT;
use eyre::{Result, eyre};
use helpers::setup;
use task_driver::{
    TaskError, TaskErrorKind,
    tasks::approve_tokens::{ApproveTaskError, ApproveTokensTask},
};
use test_helpers::{
    assert_eq_result, assert_true_result,
    mock_chain::{LP_ROUTER, SWAP_ROUTER, TOKEN0, TOKEN1},
};

/// Tests that both tokens are approved for both routers with sequenced
/// nonces
#[tokio::test]
async fn test_approve_tokens() -> Result<()> {
    let (mock, driver) = setup().await?;
    let gateway = driver.context().gateway_key.address();
    mock.set_nonce(gateway, 5);
    mock.set_balance(TOKEN0, gateway, U256::from(42u64));

    let desc = ApproveTokensTaskDescriptor::new(vec![TOKEN0, TOKEN1]).map_err(|e| eyre!(e))?;
    let out = driver.run::<ApproveTokensTask>(desc).await?;

    let pairs: Vec<(Address, Address)> =
        out.approvals.iter().map(|a| (a.token, a.spender)).collect();
    let expected =
        vec![(TOKEN0, SWAP_ROUTER), (TOKEN0, LP_ROUTER), (TOKEN1, SWAP_ROUTER), (TOKEN1, LP_ROUTER)];
    assert_eq_result!(pairs, expected)?;

    let sent = mock.sent_transactions();
    let nonces: Vec<u64> = sent.iter().map(|tx| tx.nonce).collect();
    assert_eq_result!(nonces, vec![5, 6, 7, 8])?;
    assert_true_result!(sent.iter().all(|tx| tx.gas_limit == APPROVE_GAS_LIMIT))?;
    assert_eq_result!(sent[1].to, Some(TOKEN0))?;

    let (method, args) = driver.context().chain.encoder().erc20.decode(&sent[1].input)?;
    assert_eq_result!(method, "approve")?;
    assert_eq_result!(args[0], DynSolValue::Address(LP_ROUTER))?;
    assert_eq_result!(args[1], DynSolValue::Uint(U256::MAX, 256))?;
    assert_eq_result!(mock.allowance_of(TOKEN1, gateway, SWAP_ROUTER), U256::MAX)?;

    assert_eq_result!(out.balances.owner, gateway)?;
    assert_eq_result!(out.balances.balance_of(&TOKEN0), Some(U256::from(42u64)))?;
    assert_eq_result!(out.balances.balance_of(&TOKEN1), Some(U256::ZERO))
}

/// Tests that nothing is sent when a token is not deployed
#[tokio::test]
async fn test_approve_undeployed_token() -> Result<()> {
    let (mock, driver) = setup().await?;
    let missing = address!("0x7000000000000000000000000000000000000007");

    let desc = ApproveTokensTaskDescriptor::new(vec![TOKEN0, missing]).map_err(|e| eyre!(e))?;
    let err = driver.run::<ApproveTokensTask>(desc).await.err();
    let err = err.ok_or_else(|| eyre!("expected the approval to fail"))?;

    assert_true_result!(matches!(
        err,
        ApproveTaskError::Chain(ChainClientError::NotAContract(addr)) if addr == missing
    ))?;
    assert_eq_result!(err.kind(), TaskErrorKind::InvalidInput)?;
    assert_true_result!(mock.sent_transactions().is_empty())
}

/// Tests that a reverted approval stops the remaining approvals
#[tokio::test]
async fn test_approve_reverted() -> Result<()> {
    let (mock, driver) = setup().await?;
    mock.revert_next();

    let desc = ApproveTokensTaskDescriptor::new(vec![TOKEN0, TOKEN1]).map_err(|e| eyre!(e))?;
    let err = driver.run::<ApproveTokensTask>(desc).await.err();
    let err = err.ok_or_else(|| eyre!("expected the approval to fail"))?;

    assert_eq_result!(err.kind(), TaskErrorKind::Reverted)?;
    assert_eq_result!(mock.sent_transactions().len(), 1)
}

/// Tests that an approval which leaves the allowance unchanged fails the task
/// before the next approval is sent
#[tokio::test]
async fn test_approve_allowance_not_granted() -> Result<()> {
    let (mock, driver) = setup().await?;
    mock.ignore_approvals(true);

    let desc = ApproveTokensTaskDescriptor::new(vec![TOKEN0, TOKEN1]).map_err(|e| eyre!(e))?;
    let err = driver.run::<ApproveTokensTask>(desc).await.err();
    let err = err.ok_or_else(|| eyre!("expected the approval to fail"))?;

    assert_true_result!(matches!(
        err,
        ApproveTaskError::AllowanceNotGranted { token, spender, allowance }
            if token == TOKEN0 && spender == SWAP_ROUTER && allowance == U256::ZERO
    ))?;
    assert_eq_result!(err.kind(), TaskErrorKind::Internal)?;
    assert_eq_result!(mock.sent_transactions().len(), 1)
}
