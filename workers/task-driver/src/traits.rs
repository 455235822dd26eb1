//! Defines the traits implemented by every task and the context they run in

use std::{
    error::Error,
    fmt::{Debug, Display},
    time::Duration,
};

use async_trait::async_trait;
use chain_client::{
    context::ChainContext, errors::ChainClientError, submitter::TransactionSubmitter,
};
use common::types::chain::ContractAddresses;
use gateway_crypto::keys::SigningKey;
use serde::Serialize;

// ----------------
// | Task Context |
// ----------------

/// The context every task is constructed with
///
/// Built once at startup and cloned into each task
#[derive(Clone)]
pub struct TaskContext {
    /// The chain the gateway transacts on
    pub chain: ChainContext,
    /// The key the gateway sends transactions with
    pub gateway_key: SigningKey,
    /// The key that authors permits on behalf of a user
    pub permit_signer: SigningKey,
    /// The addresses of the pool manager and its routers
    pub contracts: ContractAddresses,
    /// The maximum time to wait for a transaction to be mined
    pub receipt_timeout: Duration,
    /// The interval at which to poll for a receipt
    pub receipt_poll_interval: Duration,
}

impl TaskContext {
    /// A submitter configured with the context's receipt timing
    pub fn submitter(&self) -> TransactionSubmitter {
        TransactionSubmitter::new(&self.chain, self.receipt_timeout, self.receipt_poll_interval)
    }
}

// --------------
// | Task State |
// --------------

/// The state of a task, ordered by progress
pub trait TaskState: Clone + Debug + Display + Send + Serialize + PartialOrd {
    /// The first state whose step sends a transaction
    fn commit_point() -> Self;

    /// Whether the state is a terminal state
    fn completed(&self) -> bool;

    /// Whether the task has reached its commit point
    fn committed(&self) -> bool {
        *self >= Self::commit_point()
    }
}

// ---------------
// | Task Errors |
// ---------------

/// The broad class of a task failure, used to pick a response for the caller
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskErrorKind {
    /// The request itself is invalid; retrying it cannot succeed
    InvalidInput,
    /// The node could not be reached
    ChainUnavailable,
    /// A transaction was not mined in time
    Timeout,
    /// A transaction was mined but reverted
    Reverted,
    /// Any other failure
    Internal,
}

impl From<&ChainClientError> for TaskErrorKind {
    fn from(err: &ChainClientError) -> Self {
        match err {
            ChainClientError::Timeout { .. } => TaskErrorKind::Timeout,
            ChainClientError::ExecutionReverted { .. } => TaskErrorKind::Reverted,
            ChainClientError::ChainUnavailable(_) => TaskErrorKind::ChainUnavailable,
            ChainClientError::InvalidAddress(_)
            | ChainClientError::NotAContract(_)
            | ChainClientError::InvalidPoolKey(_) => TaskErrorKind::InvalidInput,
            _ => TaskErrorKind::Internal,
        }
    }
}

/// The error type returned by a task
pub trait TaskError: Error + Send + Sync + 'static {
    /// The class of the failure
    fn kind(&self) -> TaskErrorKind;
}

// --------
// | Task |
// --------

/// A task is a sequence of async steps, each of which moves it to its next
/// state until it completes
///
/// Steps are not retried; a failed step fails the task
#[async_trait]
pub trait Task: Send + Sized {
    /// The state type of the task, used for task introspection
    type State: TaskState;
    /// The error type that the task may give
    type Error: TaskError;
    /// The descriptor parameterizing the task
    type Descriptor: Send;
    /// The result of a completed task
    type Output: Send;

    /// Create a new task from a descriptor and a context
    async fn new(descriptor: Self::Descriptor, ctx: TaskContext) -> Result<Self, Self::Error>;
    /// Take a step in the task
    async fn step(&mut self) -> Result<(), Self::Error>;
    /// Get the current state of the task
    fn state(&self) -> Self::State;
    /// Whether or not the task is completed
    fn completed(&self) -> bool {
        self.state().completed()
    }
    /// Get a displayable name for the task
    fn name(&self) -> String;
    /// Consume a completed task, returning its result
    fn into_output(self) -> Result<Self::Output, Self::Error>;
}
