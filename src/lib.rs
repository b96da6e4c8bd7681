//! Quota Translator - quota-guarded Amazon Translate proxy
//!
//! This library implements an AWS Lambda function that forwards translation
//! requests to Amazon Translate, refusing them once the month's character
//! count (summed from CloudWatch metrics) reaches a configured limit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::{AwsTranslator, TextTranslator},
    config::ProxyConfig,
    errors::ProxyError,
    handler::TranslationProxy,
    models::{ErrorKind, InvocationEvent, ResponseEnvelope, TranslationRequest, TranslationResult},
    usage::{CloudWatchMetrics, MetricsSource, QuotaChecker, QuotaStatus},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
