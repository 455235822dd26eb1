//! The tasks the gateway runs

pub mod approve_tokens;
pub mod transact;
