//! The transact task runs one pool operation through the gateway's pipeline
//!
//! The flow is:
//!     1. Build the transaction intent and snapshot the owner's balances
//!     2. Encode the call against the target contract
//!     3. For permit based operations, build and sign a permit per token
//!        moved, then append the signatures to the call
//!     4. Submit the transaction and await its inclusion
//!     5. Snapshot the owner's balances again and compute the deltas

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use chain_client::{
    conversion::{
        address_value, bytes_value, modify_liquidity_params_value, permit_signature_values,
        pool_key_value, sqrt_price_value, swap_params_value, test_settings_value, uint256_value,
    },
    encoder::ContractInterface,
    errors::ChainClientError,
    permit::{PermitBuilder, UnsignedPermit},
    reconciler::{BalanceReconciler, ensure_contract},
    transactor::TransactorContext,
};
use common::types::{
    balances::{BalanceDelta, BalanceSnapshot},
    intent::{MinedReceipt, TransactIntent},
    permit::PermitAuthorization,
    tasks::{PoolOperation, TransactTaskDescriptor},
};
use constants::{PERMIT_SLIPPAGE_DENOMINATOR, PERMIT_SLIPPAGE_NUMERATOR};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    metrics::{PERMITS_SIGNED_METRIC, TRANSACTIONS_SUBMITTED_METRIC},
    traits::{Task, TaskContext, TaskError, TaskErrorKind, TaskState},
};

// --------------
// | Task State |
// --------------

/// Defines the state of the transact task
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TransactTaskState {
    /// The task is awaiting scheduling
    Pending,
    /// The task is building the transaction intent
    BuildingIntent,
    /// The task is encoding the contract call
    EncodingCall,
    /// The task is reading token state to build permits
    BuildingPermit,
    /// The task is signing permits and finishing the call encoding
    SigningPermit,
    /// The task is broadcasting the transaction
    Submitting,
    /// The task is waiting for the transaction to be mined
    AwaitingInclusion,
    /// The task is reading balances after inclusion
    ReconcilingBalances,
    /// The task has finished
    Completed,
}

impl TaskState for TransactTaskState {
    fn commit_point() -> Self {
        TransactTaskState::Submitting
    }

    fn completed(&self) -> bool {
        matches!(self, TransactTaskState::Completed)
    }
}

impl Display for TransactTaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

// ---------------
// | Task Errors |
// ---------------

/// The error type for the transact task
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransactTaskError {
    /// An error interacting with the chain
    #[error(transparent)]
    Chain(#[from] ChainClientError),
    /// The requested operation cannot be performed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The task was stepped out of order
    #[error("invalid task state: {0}")]
    State(String),
}

impl TransactTaskError {
    /// Create a new invalid request error
    #[allow(clippy::needless_pass_by_value)]
    pub fn invalid_request<T: ToString>(msg: T) -> Self {
        Self::InvalidRequest(msg.to_string())
    }

    /// Create a new state error
    #[allow(clippy::needless_pass_by_value)]
    pub fn state<T: ToString>(msg: T) -> Self {
        Self::State(msg.to_string())
    }
}

impl TaskError for TransactTaskError {
    fn kind(&self) -> TaskErrorKind {
        match self {
            TransactTaskError::Chain(e) => e.into(),
            TransactTaskError::InvalidRequest(_) => TaskErrorKind::InvalidInput,
            TransactTaskError::State(_) => TaskErrorKind::Internal,
        }
    }
}

// ---------------
// | Task Output |
// ---------------

/// The balances of the operation's owner around the transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceReport {
    /// The balances read before the transaction was built
    pub before: BalanceSnapshot,
    /// The balances read after the transaction was mined
    pub after: BalanceSnapshot,
    /// The signed change in each currency
    pub delta: BalanceDelta,
}

/// The result of a completed transact task
#[derive(Clone, Debug)]
pub struct TransactOutput {
    /// The receipt of the mined transaction
    pub receipt: MinedReceipt,
    /// The permits authorizing the operation, empty unless permit based
    pub permits: Vec<PermitAuthorization>,
    /// The owner's balances, absent for operations that move no tokens
    pub balances: Option<BalanceReport>,
}

impl TransactOutput {
    /// The hash of the mined transaction
    pub fn tx_hash(&self) -> B256 {
        self.receipt.tx_hash
    }
}

// -------------------
// | Task Definition |
// -------------------

/// The contract a pool operation calls
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CallTarget {
    /// The pool manager
    PoolManager,
    /// The swap router
    SwapRouter,
    /// The liquidity router
    LpRouter,
}

/// A call whose arguments are being assembled
#[derive(Clone, Debug)]
struct PendingCall {
    /// The contract called
    target: CallTarget,
    /// The method called
    method: &'static str,
    /// The arguments assembled so far
    args: Vec<DynSolValue>,
}

/// Defines the transact task flow
pub struct TransactTask {
    /// The operation being performed
    descriptor: TransactTaskDescriptor,
    /// The context the task runs in
    ctx: TaskContext,
    /// The account whose tokens the operation moves
    owner: Address,
    /// The transactor sending the transaction
    transactor: Option<TransactorContext>,
    /// The intent being built
    intent: Option<TransactIntent>,
    /// The call being encoded
    call: Option<PendingCall>,
    /// The permits awaiting signatures
    unsigned_permits: Vec<UnsignedPermit>,
    /// The signed permits
    permits: Vec<PermitAuthorization>,
    /// The hash of the broadcast transaction
    tx_hash: Option<B256>,
    /// The receipt of the mined transaction
    receipt: Option<MinedReceipt>,
    /// The owner's balances before the transaction
    balances_before: Option<BalanceSnapshot>,
    /// The owner's balances around the transaction
    balances: Option<BalanceReport>,
    /// The current state of the task
    task_state: TransactTaskState,
}

#[async_trait]
impl Task for TransactTask {
    type State = TransactTaskState;
    type Error = TransactTaskError;
    type Descriptor = TransactTaskDescriptor;
    type Output = TransactOutput;

    async fn new(descriptor: Self::Descriptor, ctx: TaskContext) -> Result<Self, Self::Error> {
        if descriptor.uses_permit() && !descriptor.operation.moves_balances() {
            return Err(TransactTaskError::invalid_request(format!(
                "{} does not accept a permit",
                descriptor.operation.name()
            )));
        }

        let owner = if descriptor.uses_permit() {
            ctx.permit_signer.address()
        } else {
            ctx.gateway_key.address()
        };

        Ok(Self {
            descriptor,
            ctx,
            owner,
            transactor: None,
            intent: None,
            call: None,
            unsigned_permits: Vec::new(),
            permits: Vec::new(),
            tx_hash: None,
            receipt: None,
            balances_before: None,
            balances: None,
            task_state: TransactTaskState::Pending,
        })
    }

    #[instrument(skip_all, err, fields(task = %self.name(), state = %self.state()))]
    async fn step(&mut self) -> Result<(), Self::Error> {
        match self.state() {
            TransactTaskState::Pending => {
                self.task_state = TransactTaskState::BuildingIntent;
            },
            TransactTaskState::BuildingIntent => {
                self.build_intent().await?;
                self.task_state = TransactTaskState::EncodingCall;
            },
            TransactTaskState::EncodingCall => {
                self.encode_call()?;
                self.task_state = if self.descriptor.uses_permit() {
                    TransactTaskState::BuildingPermit
                } else {
                    TransactTaskState::Submitting
                };
            },
            TransactTaskState::BuildingPermit => {
                self.build_permits().await?;
                self.task_state = TransactTaskState::SigningPermit;
            },
            TransactTaskState::SigningPermit => {
                self.sign_permits()?;
                self.task_state = TransactTaskState::Submitting;
            },
            TransactTaskState::Submitting => {
                self.submit().await?;
                self.task_state = TransactTaskState::AwaitingInclusion;
            },
            TransactTaskState::AwaitingInclusion => {
                self.await_inclusion().await?;
                self.task_state = if self.descriptor.operation.moves_balances() {
                    TransactTaskState::ReconcilingBalances
                } else {
                    TransactTaskState::Completed
                };
            },
            TransactTaskState::ReconcilingBalances => {
                self.reconcile_balances().await?;
                self.task_state = TransactTaskState::Completed;
            },
            TransactTaskState::Completed => {
                return Err(TransactTaskError::state("step called on completed task"));
            },
        }

        Ok(())
    }

    fn state(&self) -> Self::State {
        self.task_state.clone()
    }

    fn name(&self) -> String {
        let name = self.descriptor.operation.name().to_lowercase().replace(' ', "-");
        if self.descriptor.uses_permit() { format!("{name}-with-permit") } else { name }
    }

    fn into_output(self) -> Result<Self::Output, Self::Error> {
        let receipt = self.receipt.ok_or_else(|| TransactTaskError::state("no receipt"))?;
        Ok(TransactOutput { receipt, permits: self.permits, balances: self.balances })
    }
}

// -----------------------
// | Task Implementation |
// -----------------------

impl TransactTask {
    /// Build the intent, check the target is deployed, and snapshot the
    /// owner's balances before anything is sent
    async fn build_intent(&mut self) -> Result<(), TransactTaskError> {
        let mut transactor =
            TransactorContext::new(&self.ctx.chain, self.ctx.gateway_key.clone()).await?;

        let target = self.call_target();
        if matches!(self.descriptor.operation, PoolOperation::AddLiquidity { .. }) {
            ensure_contract(self.ctx.chain.client(), self.target_address(target)).await?;
        }

        if self.descriptor.operation.moves_balances() {
            let currencies = self.descriptor.pool_key.currencies();
            let reconciler = BalanceReconciler::new(self.ctx.chain.client());
            self.balances_before = Some(reconciler.snapshot(self.owner, &currencies).await?);
        }

        let to = self.target_address(target);
        let intent = transactor.next_intent(to, Bytes::new(), self.descriptor.gas_limit());
        self.intent = Some(intent);
        self.transactor = Some(transactor);
        Ok(())
    }

    /// Assemble the call's arguments, encoding it now unless signatures are
    /// still to be appended
    fn encode_call(&mut self) -> Result<(), TransactTaskError> {
        let desc = &self.descriptor;
        let key = pool_key_value(&desc.pool_key);
        let hook_data = bytes_value(&desc.hook_data);

        let (method, args) = match (&desc.operation, desc.permit_deadline) {
            (PoolOperation::Initialize { sqrt_price_x96 }, None) => {
                ("initialize", vec![key, sqrt_price_value(*sqrt_price_x96), hook_data])
            },
            (PoolOperation::AddLiquidity { params }, None) => {
                ("modifyLiquidity", vec![key, modify_liquidity_params_value(params), hook_data])
            },
            (PoolOperation::Swap { params, settings }, None) => (
                "swap",
                vec![key, swap_params_value(params), test_settings_value(settings), hook_data],
            ),
            (PoolOperation::AddLiquidity { params }, Some(deadline)) => (
                "modifyLiquidityWithPermit",
                vec![
                    address_value(self.owner),
                    key,
                    modify_liquidity_params_value(params),
                    hook_data,
                    DynSolValue::Bool(false), // settleUsingBurn
                    DynSolValue::Bool(false), // takeClaims
                    uint256_value(deadline),
                ],
            ),
            (PoolOperation::Swap { params, settings }, Some(deadline)) => (
                "swapWithPermit",
                vec![
                    address_value(self.owner),
                    key,
                    swap_params_value(params),
                    test_settings_value(settings),
                    hook_data,
                    uint256_value(deadline),
                ],
            ),
            (PoolOperation::Initialize { .. }, Some(_)) => {
                return Err(TransactTaskError::invalid_request(
                    "pool initialization does not accept a permit",
                ));
            },
        };

        let call = PendingCall { target: self.call_target(), method, args };
        if !desc.uses_permit() {
            self.finish_encoding(&call)?;
        }

        self.call = Some(call);
        Ok(())
    }

    /// Build one permit per token the operation pulls from the owner
    async fn build_permits(&mut self) -> Result<(), TransactTaskError> {
        let deadline = self
            .descriptor
            .permit_deadline
            .ok_or_else(|| TransactTaskError::state("building permits without a deadline"))?;
        let key = &self.descriptor.pool_key;
        let contracts = &self.ctx.contracts;

        let requests: Vec<(Address, Address, U256)> = match &self.descriptor.operation {
            PoolOperation::Swap { params, .. } => {
                let value = permit_value_with_slippage(params.amount())?;
                vec![(key.input_currency(params.zero_for_one), contracts.swap_router, value)]
            },
            PoolOperation::AddLiquidity { params } => key
                .currencies()
                .into_iter()
                .map(|currency| (currency, contracts.lp_router, params.liquidity()))
                .collect(),
            PoolOperation::Initialize { .. } => Vec::new(),
        };

        let builder = PermitBuilder::new(&self.ctx.chain);
        for (token, spender, value) in requests {
            let permit = builder.build(token, self.owner, spender, value, deadline).await?;
            self.unsigned_permits.push(permit);
        }

        Ok(())
    }

    /// Sign the built permits and append their signatures to the call
    fn sign_permits(&mut self) -> Result<(), TransactTaskError> {
        for unsigned in self.unsigned_permits.drain(..) {
            let permit = unsigned.sign(&self.ctx.permit_signer)?;
            metrics::counter!(PERMITS_SIGNED_METRIC).increment(1);
            self.permits.push(permit);
        }

        let mut call = self.call.take().ok_or_else(|| TransactTaskError::state("no call"))?;
        for permit in &self.permits {
            call.args.extend(permit_signature_values(permit));
        }

        self.finish_encoding(&call)?;
        self.call = Some(call);
        Ok(())
    }

    /// Broadcast the transaction
    async fn submit(&mut self) -> Result<(), TransactTaskError> {
        let transactor =
            self.transactor.as_ref().ok_or_else(|| TransactTaskError::state("no transactor"))?;
        let intent = self.intent.as_ref().ok_or_else(|| TransactTaskError::state("no intent"))?;

        let tx_hash = self.ctx.submitter().submit(transactor, intent).await?;
        metrics::counter!(TRANSACTIONS_SUBMITTED_METRIC).increment(1);
        self.tx_hash = Some(tx_hash);
        Ok(())
    }

    /// Wait for the transaction to be mined successfully
    async fn await_inclusion(&mut self) -> Result<(), TransactTaskError> {
        let tx_hash = self.tx_hash.ok_or_else(|| TransactTaskError::state("no tx hash"))?;
        let receipt = self.ctx.submitter().await_mined(tx_hash).await?;
        self.receipt = Some(receipt);
        Ok(())
    }

    /// Read the owner's balances again and compute the change
    async fn reconcile_balances(&mut self) -> Result<(), TransactTaskError> {
        let before = self
            .balances_before
            .take()
            .ok_or_else(|| TransactTaskError::state("no balance snapshot"))?;
        let currencies = self.descriptor.pool_key.currencies();

        let reconciler = BalanceReconciler::new(self.ctx.chain.client());
        let after = reconciler.snapshot(self.owner, &currencies).await?;
        let delta = BalanceReconciler::delta(&before, &after)?;
        info!("balances of {:#x} changed by {:?}", self.owner, delta.amounts());

        self.balances = Some(BalanceReport { before, after, delta });
        Ok(())
    }

    // -----------
    // | Helpers |
    // -----------

    /// Encode the call and attach it to the intent
    fn finish_encoding(&mut self, call: &PendingCall) -> Result<(), TransactTaskError> {
        let data = self.interface(call.target).encode(call.method, &call.args)?;
        let intent = self.intent.take().ok_or_else(|| TransactTaskError::state("no intent"))?;
        self.intent = Some(intent.with_data(data));
        Ok(())
    }

    /// The contract the operation calls
    fn call_target(&self) -> CallTarget {
        match self.descriptor.operation {
            PoolOperation::Initialize { .. } => CallTarget::PoolManager,
            PoolOperation::AddLiquidity { .. } => CallTarget::LpRouter,
            PoolOperation::Swap { .. } => CallTarget::SwapRouter,
        }
    }

    /// The address of a call target
    fn target_address(&self, target: CallTarget) -> Address {
        let contracts = &self.ctx.contracts;
        match target {
            CallTarget::PoolManager => contracts.pool_manager,
            CallTarget::SwapRouter => contracts.swap_router,
            CallTarget::LpRouter => contracts.lp_router,
        }
    }

    /// The interface of a call target
    fn interface(&self, target: CallTarget) -> &ContractInterface {
        let encoder = self.ctx.chain.encoder();
        match target {
            CallTarget::PoolManager => &encoder.pool_manager,
            CallTarget::SwapRouter => &encoder.swap_router,
            CallTarget::LpRouter => &encoder.lp_router,
        }
    }
}

/// The value a swap permit authorizes: the input amount plus slippage room
pub fn permit_value_with_slippage(amount: U256) -> Result<U256, TransactTaskError> {
    amount
        .checked_mul(U256::from(PERMIT_SLIPPAGE_NUMERATOR))
        .map(|v| v / U256::from(PERMIT_SLIPPAGE_DENOMINATOR))
        .ok_or_else(|| TransactTaskError::invalid_request("permit value overflows"))
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests the slippage applied to a swap permit
    #[test]
    fn test_permit_value() {
        let value = permit_value_with_slippage(U256::from(10_000_000u64)).unwrap();
        assert_eq!(value, U256::from(11_000_000u64));

        let value = permit_value_with_slippage(U256::from(15u64)).unwrap();
        assert_eq!(value, U256::from(16u64));

        assert!(permit_value_with_slippage(U256::MAX).is_err());
    }

    /// Tests that the states are ordered by progress
    #[test]
    fn test_state_order() {
        assert!(!TransactTaskState::SigningPermit.committed());
        assert!(TransactTaskState::Submitting.committed());
        assert!(TransactTaskState::ReconcilingBalances.committed());
        assert!(TransactTaskState::Completed.completed());
        assert_eq!(TransactTaskState::SigningPermit.to_string(), "SigningPermit");
    }
}
