//! Groups together the multi-step flows the gateway runs against the chain
//!
//! Each flow is a task: a state machine stepped forward by the driver from
//! intent construction through submission, inclusion, and balance
//! reconciliation. A task that fails after submitting is reported as failed;
//! its on-chain effects are not rolled back

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::needless_pass_by_ref_mut)]

pub mod driver;
pub mod metrics;
pub mod tasks;
pub mod traits;

pub use driver::TaskDriver;
pub use traits::{TaskContext, TaskError, TaskErrorKind};
