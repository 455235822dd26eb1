//! Provides a client for transacting against the pool manager and its routers
//! and the blockchain more generally.
//!
//! This contains the minimal chain interface the gateway consumes, an RPC
//! backed implementation of it, and the pieces built on top: call encoding,
//! the transactor context, permit construction, transaction submission, and
//! balance reconciliation

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod abi;
pub mod client;
pub mod context;
pub mod conversion;
pub mod encoder;
pub mod errors;
pub mod permit;
pub mod reconciler;
pub mod submitter;
pub mod traits;
pub mod transactor;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
