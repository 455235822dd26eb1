//! Route handler for signature verification

use async_trait::async_trait;
use external_api::http::signature::{VerifySignatureRequest, VerifySignatureResponse};
use gateway_crypto::ecdsa::verify_signed_message;
use hyper::HeaderMap;

use crate::{
    error::ApiServerError,
    router::{TypedHandler, UrlParams},
};

/// Handler for the POST /verifySignature route
#[derive(Clone, Debug, Default)]
pub struct VerifySignatureHandler;

impl VerifySignatureHandler {
    /// Constructor
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TypedHandler for VerifySignatureHandler {
    type Request = VerifySignatureRequest;
    type Response = VerifySignatureResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        let message = req.message_bytes()?;
        let signature = req.signature_bytes()?;

        let valid = verify_signed_message(&message, &signature, req.address);
        Ok(VerifySignatureResponse { valid })
    }
}
