//! Groups API type definitions for signature verification

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use util::hex::bytes_from_hex_string;

use crate::error::ApiTypeError;

/// Verify a signature over a raw message
pub const VERIFY_SIGNATURE_ROUTE: &str = "/verifySignature";

/// The request type to verify a signed message
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifySignatureRequest {
    /// The hex encoded message
    pub message: String,
    /// The hex encoded signature, 64 or 65 bytes
    pub signature: String,
    /// The address expected to have signed
    pub address: Address,
}

impl VerifySignatureRequest {
    /// The message bytes
    pub fn message_bytes(&self) -> Result<Vec<u8>, ApiTypeError> {
        bytes_from_hex_string(&self.message).map_err(|e| ApiTypeError::parsing(format!("message: {e}")))
    }

    /// The signature bytes
    pub fn signature_bytes(&self) -> Result<Vec<u8>, ApiTypeError> {
        bytes_from_hex_string(&self.signature)
            .map_err(|e| ApiTypeError::parsing(format!("signature: {e}")))
    }
}

/// The response to a signature verification
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifySignatureResponse {
    /// Whether the signature was made by the given address
    pub valid: bool,
}
