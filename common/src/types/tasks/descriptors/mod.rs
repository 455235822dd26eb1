//! Descriptors parameterizing the tasks the gateway runs

mod approve;
mod transact;

pub use approve::*;
pub use transact::*;
