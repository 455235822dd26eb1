//! Approves the swap and liquidity routers to spend the gateway's tokens
//!
//! Every approval is sent from the gateway account with nonces sequenced from
//! a single pending nonce read, and each is awaited before the next is sent.
//! Once mined, the allowance is read back to confirm the approval took effect

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chain_client::{
    client::erc20::Erc20Ext,
    conversion::{address_value, uint256_value},
    errors::ChainClientError,
    reconciler::{BalanceReconciler, ensure_contract},
    transactor::TransactorContext,
};
use common::types::{balances::BalanceSnapshot, tasks::ApproveTokensTaskDescriptor};
use constants::APPROVE_GAS_LIMIT;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    metrics::TRANSACTIONS_SUBMITTED_METRIC,
    traits::{Task, TaskContext, TaskError, TaskErrorKind, TaskState},
};

/// The name of the task
const TASK_NAME: &str = "approve-tokens";

// --------------
// | Task State |
// --------------

/// Defines the state of the approve tokens task
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ApproveTokensTaskState {
    /// The task is awaiting scheduling
    Pending,
    /// The task is sending the approval at the given index
    Approving(usize),
    /// The task is reading the gateway's balances
    ReadingBalances,
    /// The task has finished
    Completed,
}

impl TaskState for ApproveTokensTaskState {
    fn commit_point() -> Self {
        ApproveTokensTaskState::Approving(0)
    }

    fn completed(&self) -> bool {
        matches!(self, ApproveTokensTaskState::Completed)
    }
}

impl Display for ApproveTokensTaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

// ---------------
// | Task Errors |
// ---------------

/// The error type for the approve tokens task
#[derive(Clone, Debug, thiserror::Error)]
pub enum ApproveTaskError {
    /// An error interacting with the chain
    #[error(transparent)]
    Chain(#[from] ChainClientError),
    /// An approval was mined but the allowance it granted falls short
    #[error("allowance of {spender:#x} in {token:#x} is {allowance} after approving")]
    AllowanceNotGranted {
        /// The token approved
        token: Address,
        /// The router approved to spend it
        spender: Address,
        /// The allowance read back after the approval
        allowance: U256,
    },
    /// The task was stepped out of order
    #[error("invalid task state: {0}")]
    State(String),
}

impl TaskError for ApproveTaskError {
    fn kind(&self) -> TaskErrorKind {
        match self {
            ApproveTaskError::Chain(e) => e.into(),
            ApproveTaskError::AllowanceNotGranted { .. } | ApproveTaskError::State(_) => {
                TaskErrorKind::Internal
            },
        }
    }
}

// ---------------
// | Task Output |
// ---------------

/// A mined approval
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenApproval {
    /// The token approved
    pub token: Address,
    /// The router approved to spend it
    pub spender: Address,
    /// The hash of the approval transaction
    pub tx_hash: B256,
}

/// The result of a completed approve tokens task
#[derive(Clone, Debug)]
pub struct ApproveTokensOutput {
    /// The approvals, in the order they were sent
    pub approvals: Vec<TokenApproval>,
    /// The gateway's balance of each token after approving
    pub balances: BalanceSnapshot,
}

// -------------------
// | Task Definition |
// -------------------

/// Defines the approve tokens task flow
pub struct ApproveTokensTask {
    /// The tokens to approve
    tokens: Vec<Address>,
    /// The `(token, spender)` pairs to approve, in send order
    pending: Vec<(Address, Address)>,
    /// The context the task runs in
    ctx: TaskContext,
    /// The transactor sending the approvals
    transactor: Option<TransactorContext>,
    /// The approvals mined so far
    approvals: Vec<TokenApproval>,
    /// The gateway's balances after approving
    balances: Option<BalanceSnapshot>,
    /// The current state of the task
    task_state: ApproveTokensTaskState,
}

#[async_trait]
impl Task for ApproveTokensTask {
    type State = ApproveTokensTaskState;
    type Error = ApproveTaskError;
    type Descriptor = ApproveTokensTaskDescriptor;
    type Output = ApproveTokensOutput;

    async fn new(descriptor: Self::Descriptor, ctx: TaskContext) -> Result<Self, Self::Error> {
        let routers = ctx.contracts.routers();
        let pending = descriptor
            .tokens
            .iter()
            .flat_map(|token| routers.iter().map(move |router| (*token, *router)))
            .collect();

        Ok(Self {
            tokens: descriptor.tokens,
            pending,
            ctx,
            transactor: None,
            approvals: Vec::new(),
            balances: None,
            task_state: ApproveTokensTaskState::Pending,
        })
    }

    #[instrument(skip_all, err, fields(task = %self.name(), state = %self.state()))]
    async fn step(&mut self) -> Result<(), Self::Error> {
        match self.state() {
            ApproveTokensTaskState::Pending => {
                self.prepare().await?;
                self.task_state = ApproveTokensTaskState::Approving(0);
            },
            ApproveTokensTaskState::Approving(idx) => {
                self.approve(idx).await?;
                self.task_state = if idx + 1 < self.pending.len() {
                    ApproveTokensTaskState::Approving(idx + 1)
                } else {
                    ApproveTokensTaskState::ReadingBalances
                };
            },
            ApproveTokensTaskState::ReadingBalances => {
                self.read_balances().await?;
                self.task_state = ApproveTokensTaskState::Completed;
            },
            ApproveTokensTaskState::Completed => {
                return Err(ApproveTaskError::State("step called on completed task".into()));
            },
        }

        Ok(())
    }

    fn state(&self) -> Self::State {
        self.task_state.clone()
    }

    fn name(&self) -> String {
        TASK_NAME.to_string()
    }

    fn into_output(self) -> Result<Self::Output, Self::Error> {
        let balances =
            self.balances.ok_or_else(|| ApproveTaskError::State("no balances read".into()))?;
        Ok(ApproveTokensOutput { approvals: self.approvals, balances })
    }
}

// -----------------------
// | Task Implementation |
// -----------------------

impl ApproveTokensTask {
    /// Check every token is deployed and read the gateway's pending nonce
    async fn prepare(&mut self) -> Result<(), ApproveTaskError> {
        for token in &self.tokens {
            ensure_contract(self.ctx.chain.client(), *token).await?;
        }

        let transactor =
            TransactorContext::new(&self.ctx.chain, self.ctx.gateway_key.clone()).await?;
        self.transactor = Some(transactor);
        Ok(())
    }

    /// Send the approval at `idx` for the maximum amount, await it, and check
    /// the allowance it granted
    async fn approve(&mut self, idx: usize) -> Result<(), ApproveTaskError> {
        let (token, spender) = *self
            .pending
            .get(idx)
            .ok_or_else(|| ApproveTaskError::State(format!("no approval at index {idx}")))?;
        let transactor =
            self.transactor.as_mut().ok_or_else(|| ApproveTaskError::State("no transactor".into()))?;

        let data = self
            .ctx
            .chain
            .encoder()
            .erc20
            .encode("approve", &[address_value(spender), uint256_value(U256::MAX)])?;
        let intent = transactor.next_intent(token, data, APPROVE_GAS_LIMIT);
        let receipt = self.ctx.submitter().submit_and_wait(transactor, &intent).await?;
        metrics::counter!(TRANSACTIONS_SUBMITTED_METRIC).increment(1);
        info!("approved {spender:#x} to spend {token:#x}");

        let owner = self.ctx.gateway_key.address();
        let allowance = self.ctx.chain.client().erc20_allowance(token, owner, spender).await?;
        if allowance < U256::MAX {
            return Err(ApproveTaskError::AllowanceNotGranted { token, spender, allowance });
        }

        self.approvals.push(TokenApproval { token, spender, tx_hash: receipt.tx_hash });
        Ok(())
    }

    /// Read the gateway's balance of each approved token
    async fn read_balances(&mut self) -> Result<(), ApproveTaskError> {
        let owner = self.ctx.gateway_key.address();
        let reconciler = BalanceReconciler::new(self.ctx.chain.client());
        self.balances = Some(reconciler.snapshot(owner, &self.tokens).await?);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests the progression of the task's states
    #[test]
    fn test_state_order() {
        assert!(!ApproveTokensTaskState::Pending.committed());
        assert!(ApproveTokensTaskState::Approving(0).committed());
        assert!(ApproveTokensTaskState::Approving(0) < ApproveTokensTaskState::Approving(3));
        assert!(ApproveTokensTaskState::Approving(3) < ApproveTokensTaskState::ReadingBalances);
        assert_eq!(ApproveTokensTaskState::Approving(2).to_string(), "Approving(2)");
    }
}
