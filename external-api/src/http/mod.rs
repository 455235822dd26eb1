//! Groups API types for the HTTP API

use serde::{Deserialize, Serialize};

pub mod pool;
pub mod signature;

/// Health check
pub const PING_ROUTE: &str = "/ping";

/// A ping response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PingResponse {
    /// The timestamp when the response is sent, in milliseconds
    pub timestamp: u64,
}
