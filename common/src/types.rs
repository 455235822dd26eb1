//! Defines common types that many crates can depend on
pub mod balances;
pub mod chain;
pub mod intent;
pub mod permit;
pub mod pool;
pub mod tasks;
