//! The API module defines the request and response bodies of the gateway's
//! HTTP API along with the routes they are served on
#![deny(missing_docs)]

use serde::{Deserialize, Serialize};

pub mod error;
pub mod http;
pub mod types;

/// An empty request/response type
///
/// Serialized as `null`
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmptyRequestResponse;
