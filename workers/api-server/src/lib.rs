//! Defines the HTTP server the gateway exposes
//!
//! Each pool route parses its request, resolves the pool against the
//! configured defaults, and runs the matching task through the task driver

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod error;
pub mod http;
mod router;

pub use http::{ApiServerConfig, HttpServer, PoolConfig};
