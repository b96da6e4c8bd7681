//! Invocation handling: quota gate followed by the translation proxy

use aws_config::BehaviorVersion;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::client::{AwsTranslator, TextTranslator};
use crate::core::config::ProxyConfig;
use crate::core::errors::{ProxyError, Result};
use crate::core::models::{
    ErrorKind, InvocationEvent, ResponseEnvelope, TranslationRequest, TranslationResult,
};
use crate::core::usage::{CloudWatchMetrics, MetricsSource, QuotaChecker};

/// Process-wide proxy state, built once at startup and shared by every invocation
#[derive(Clone)]
pub struct TranslationProxy {
    quota: QuotaChecker,
    translator: Arc<dyn TextTranslator>,
}

impl TranslationProxy {
    /// Assemble the proxy from its two upstream services
    pub fn new(
        config: &ProxyConfig,
        metrics: Arc<dyn MetricsSource>,
        translator: Arc<dyn TextTranslator>,
    ) -> Self {
        Self {
            quota: QuotaChecker::new(
                metrics,
                config.metric_name.clone(),
                config.character_count_limit,
            ),
            translator,
        }
    }

    /// Proxy using CloudWatch and Amazon Translate clients from one SDK config
    pub fn from_sdk_config(config: &ProxyConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(
            config,
            Arc::new(CloudWatchMetrics::from_sdk_config(sdk_config)),
            Arc::new(AwsTranslator::from_sdk_config(sdk_config)),
        )
    }

    /// Load AWS configuration from the environment and build the proxy
    pub async fn from_env(config: &ProxyConfig) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_sdk_config(config, &sdk_config)
    }

    /// Serve a raw invocation payload. Never fails to produce an envelope.
    pub async fn handle_payload(&self, payload: &Value) -> ResponseEnvelope {
        self.handle(InvocationEvent::from_payload(payload)).await
    }

    /// Serve one invocation. Every path yields exactly one envelope.
    pub async fn handle(&self, event: InvocationEvent) -> ResponseEnvelope {
        info!(
            is_base64_encoded = ?event.is_base64_encoded,
            body = ?event.body,
            "Received event"
        );

        let status = match self.quota.check().await {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to compute character count: {}", e);
                return ResponseEnvelope::error(e.kind());
            }
        };

        info!("characterCountSum = {}", status.usage);

        if status.is_exceeded() {
            warn!(
                "Character count limit exceeded: {} >= {}",
                status.usage, status.limit
            );
            return ResponseEnvelope::error(ErrorKind::CharacterCountLimitExceeded);
        }

        match self.translate_event(&event).await {
            Ok(result) => {
                info!(
                    translated_text = %result.translated_text,
                    source_language_code = %result.source_language_code,
                    target_language_code = %result.target_language_code,
                    "Translation succeeded"
                );
                ResponseEnvelope::success(&result)
            }
            Err(ProxyError::MissingField { field }) => {
                warn!("Invalid request: {} missing", field);
                ResponseEnvelope::error_with_message(
                    ErrorKind::InvalidParameter,
                    missing_field_message(&field),
                )
            }
            Err(e) => {
                error!("Translation failed: {}", e);
                ResponseEnvelope::error(e.kind())
            }
        }
    }

    async fn translate_event(&self, event: &InvocationEvent) -> Result<TranslationResult> {
        let request = decode_request(event)?;
        self.translator.translate(&request).await
    }
}

/// Decode the event body into a translation request.
///
/// Both `body` (a string) and `isBase64Encoded` (a bool) must be present. An
/// absent field is a [`ProxyError::MissingField`], a wrongly typed one a
/// [`ProxyError::InvalidField`]. Field contents are not validated here beyond
/// what JSON parsing enforces.
pub fn decode_request(event: &InvocationEvent) -> Result<TranslationRequest> {
    let body = match &event.body {
        Some(Value::String(body)) => body,
        Some(_) => return Err(invalid_field("body", "string")),
        None => return Err(missing_field("body")),
    };

    let is_base64_encoded = match &event.is_base64_encoded {
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(invalid_field("isBase64Encoded", "bool")),
        None => return Err(missing_field("isBase64Encoded")),
    };

    let request = if is_base64_encoded {
        // Line-wrapped base64 is accepted
        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        let text = String::from_utf8(bytes)?;
        serde_json::from_str(&text)?
    } else {
        serde_json::from_str(body)?
    };

    Ok(request)
}

fn missing_field(field: &str) -> ProxyError {
    ProxyError::MissingField {
        field: field.to_string(),
    }
}

fn invalid_field(field: &str, expected: &str) -> ProxyError {
    ProxyError::InvalidField {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}

fn missing_field_message(field: &str) -> String {
    match field {
        "body" => ErrorKind::InvalidParameter.message().to_string(),
        other => format!("Request parameter {} isn't exist.", other),
    }
}
