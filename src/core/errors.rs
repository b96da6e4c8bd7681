//! Custom error types for proxy operations

use thiserror::Error;

use crate::core::models::ErrorKind;

/// Errors raised while serving an invocation
#[derive(Error, Debug)]
pub enum ProxyError {
    /// A required field of the invocation event is absent
    #[error("Missing required field: {field}")]
    MissingField {
        /// Wire name of the absent field
        field: String,
    },

    /// A field of the invocation event is present but has the wrong JSON type
    #[error("Invalid field {field}: expected {expected}")]
    InvalidField {
        /// Wire name of the field
        field: String,
        /// Expected JSON type
        expected: String,
    },

    /// Body declared as base64 but could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Decoded body is not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Metrics query failed
    #[error("Metrics error: {message}")]
    MetricsError {
        /// Upstream failure description
        message: String,
    },

    /// Translation call failed
    #[error("Translate error: {message}")]
    TranslateError {
        /// Upstream failure description
        message: String,
    },

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ProxyError {
    /// Caller-visible error kind for this failure.
    ///
    /// Only a missing event field is reported as the caller's fault; decode,
    /// parse and upstream failures all collapse into [`ErrorKind::Unknown`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::MissingField { .. } => ErrorKind::InvalidParameter,
            _ => ErrorKind::Unknown,
        }
    }
}

/// Result type for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_invalid_parameter() {
        let err = ProxyError::MissingField {
            field: "body".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_other_errors_are_unknown() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ProxyError::from(json_err).kind(), ErrorKind::Unknown);

        let upstream = ProxyError::TranslateError {
            message: "UnsupportedLanguagePairException".to_string(),
        };
        assert_eq!(upstream.kind(), ErrorKind::Unknown);

        let wrong_type = ProxyError::InvalidField {
            field: "body".to_string(),
            expected: "string".to_string(),
        };
        assert_eq!(wrong_type.kind(), ErrorKind::Unknown);
    }
}
