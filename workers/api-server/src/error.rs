//! Defines error types that occur in the ApiServer

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

use external_api::error::ApiTypeError;
use hyper::{Response, StatusCode};
use task_driver::{TaskError, TaskErrorKind};
use tracing::warn;

use super::router::{ResponseBody, build_500_response, build_response_from_status_code};

/// The error type for errors that occur during ApiServer execution
#[derive(Debug)]
pub enum ApiServerError {
    /// An http error code, should be forwarded as a response
    HttpStatusCode(StatusCode, String),
    /// HTTP server has failed
    HttpServerFailure(String),
    /// Error setting up the API server
    Setup(String),
}

impl ApiServerError {
    /// Create a new server failure error
    #[allow(clippy::needless_pass_by_value)]
    pub fn server_failure<T: ToString>(e: T) -> Self {
        Self::HttpServerFailure(e.to_string())
    }

    /// Create a new setup error
    #[allow(clippy::needless_pass_by_value)]
    pub fn setup<T: ToString>(e: T) -> Self {
        Self::Setup(e.to_string())
    }
}

impl Display for ApiServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

impl Error for ApiServerError {}

impl From<hyper::Error> for ApiServerError {
    fn from(e: hyper::Error) -> Self {
        Self::server_failure(e)
    }
}

impl From<ApiTypeError> for ApiServerError {
    fn from(e: ApiTypeError) -> Self {
        bad_request(e)
    }
}

impl From<ApiServerError> for Response<ResponseBody> {
    fn from(err: ApiServerError) -> Self {
        match err {
            ApiServerError::HttpStatusCode(status, message) => {
                build_response_from_status_code(status, message)
            },
            _ => build_500_response(err.to_string()),
        }
    }
}

/// Map a failed task to a response status, keeping its message as the body
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn task_error<E: TaskError>(e: E) -> ApiServerError {
    let status = match e.kind() {
        TaskErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        TaskErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        TaskErrorKind::Reverted => StatusCode::UNPROCESSABLE_ENTITY,
        TaskErrorKind::ChainUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        TaskErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warn!("task failed with status {status}: {e}");
    ApiServerError::HttpStatusCode(status, e.to_string())
}

/// Create an `ApiServerError` with a 400 bad request code
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn bad_request<E: ToString>(e: E) -> ApiServerError {
    ApiServerError::HttpStatusCode(StatusCode::BAD_REQUEST, e.to_string())
}

/// Create an `ApiServerError` with a 500 internal server error code
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn internal_error<E: ToString>(e: E) -> ApiServerError {
    ApiServerError::HttpStatusCode(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
