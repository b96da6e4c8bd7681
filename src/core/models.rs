//! Core data models for the translation proxy

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Inbound gateway proxy event.
///
/// Only the two fields the proxy reads are modelled; everything else the
/// gateway sends is ignored. Both are kept as raw JSON so that a wrongly typed
/// field is reported by the handler instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    /// Whether `body` is base64 encoded, expected to be a JSON bool
    #[serde(default)]
    pub is_base64_encoded: Option<Value>,
    /// Raw or base64-encoded JSON request, expected to be a JSON string
    #[serde(default)]
    pub body: Option<Value>,
}

impl InvocationEvent {
    /// Event carrying a plain JSON body
    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            is_base64_encoded: Some(Value::Bool(false)),
            body: Some(Value::String(body.into())),
        }
    }

    /// Event carrying a base64-encoded body
    pub fn base64(body: impl Into<String>) -> Self {
        Self {
            is_base64_encoded: Some(Value::Bool(true)),
            body: Some(Value::String(body.into())),
        }
    }

    /// Pick the event fields out of an arbitrary invocation payload.
    ///
    /// Never fails: a payload that is not a JSON object yields an event with
    /// neither field, and `null` counts as absent.
    pub fn from_payload(payload: &Value) -> Self {
        let field = |name: &str| payload.get(name).filter(|v| !v.is_null()).cloned();

        Self {
            is_base64_encoded: field("isBase64Encoded"),
            body: field("body"),
        }
    }
}

/// Translation request decoded from the event body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranslationRequest {
    /// Source text
    pub text: String,
    /// Source language, or `auto` to let the service detect it
    pub source_language_code: String,
    /// Target language
    pub target_language_code: String,
}

impl TranslationRequest {
    /// Create a request from its three parameters
    pub fn new(
        text: impl Into<String>,
        source_language_code: impl Into<String>,
        target_language_code: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language_code: source_language_code.into(),
            target_language_code: target_language_code.into(),
        }
    }
}

/// Translation result returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranslationResult {
    /// Translated text
    pub translated_text: String,
    /// Resolved source language (differs from the request when it was `auto`)
    pub source_language_code: String,
    /// Resolved target language
    pub target_language_code: String,
}

/// Caller-visible error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Monthly character quota used up
    CharacterCountLimitExceeded,
    /// Malformed invocation event
    InvalidParameter,
    /// Parse or upstream failure
    Unknown,
}

impl ErrorKind {
    /// HTTP status code reported for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::CharacterCountLimitExceeded => 403,
            ErrorKind::InvalidParameter => 400,
            ErrorKind::Unknown => 500,
        }
    }

    /// Default message reported to the caller
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::CharacterCountLimitExceeded => {
                "Monthly character count limit was exceeded. Plase retry after some time."
            }
            ErrorKind::InvalidParameter => "Request body isn't exist.",
            ErrorKind::Unknown => "Unknown error occured.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CharacterCountLimitExceeded => write!(f, "CharacterCountLimitExceeded"),
            ErrorKind::InvalidParameter => write!(f, "InvalidParameter"),
            ErrorKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Symbolic error name
    pub error: ErrorKind,
    /// Human-readable message
    pub message: String,
}

/// Gateway proxy response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status_code: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Serialized JSON payload
    pub body: String,
}

impl ResponseEnvelope {
    /// JSON response with the given status
    fn json(status_code: u16, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status_code,
            headers,
            body,
        }
    }

    /// 200 response carrying a translation
    pub fn success(result: &TranslationResult) -> Self {
        match serde_json::to_string(result) {
            Ok(body) => Self::json(200, body),
            Err(_) => Self::error(ErrorKind::Unknown),
        }
    }

    /// Error response with the kind's default message
    pub fn error(kind: ErrorKind) -> Self {
        Self::error_with_message(kind, kind.message())
    }

    /// Error response with a custom message
    pub fn error_with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: kind,
            message: message.into(),
        };
        // ErrorBody only holds strings, serialization cannot fail
        let body = serde_json::to_string(&body).unwrap_or_default();
        Self::json(kind.status_code(), body)
    }
}
