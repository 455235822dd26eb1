//! Error types for API type conversions

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Error type for API type conversions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiTypeError {
    /// A field could not be parsed
    Parsing(String),
    /// A field parsed but holds a value the gateway does not accept
    Invalid(String),
    /// A field was omitted and has no configured default
    Missing(String),
}

impl ApiTypeError {
    /// Create a parsing error from any type that can be converted to a string
    #[allow(clippy::needless_pass_by_value)]
    pub fn parsing<T: ToString>(err: T) -> Self {
        Self::Parsing(err.to_string())
    }

    /// Create an invalid value error
    #[allow(clippy::needless_pass_by_value)]
    pub fn invalid<T: ToString>(err: T) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl Display for ApiTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ApiTypeError::Parsing(msg) => write!(f, "parsing error: {msg}"),
            ApiTypeError::Invalid(msg) => write!(f, "invalid value: {msg}"),
            ApiTypeError::Missing(field) => write!(f, "missing field: {field}"),
        }
    }
}

impl std::error::Error for ApiTypeError {}
