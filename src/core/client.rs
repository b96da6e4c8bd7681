//! Translation client backed by Amazon Translate

use async_trait::async_trait;
use aws_sdk_translate::error::DisplayErrorContext;
use tracing::debug;

use crate::core::errors::{ProxyError, Result};
use crate::core::models::{TranslationRequest, TranslationResult};

/// Something that can translate a single request
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate the request, returning the text and the resolved language codes
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult>;
}

/// Amazon Translate `TranslateText` client
#[derive(Debug, Clone)]
pub struct AwsTranslator {
    client: aws_sdk_translate::Client,
}

impl AwsTranslator {
    /// Wrap an existing Amazon Translate client
    pub fn new(client: aws_sdk_translate::Client) -> Self {
        Self { client }
    }

    /// Create from a loaded AWS SDK config
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_translate::Client::new(config))
    }
}

#[async_trait]
impl TextTranslator for AwsTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            request.source_language_code,
            request.target_language_code
        );

        let output = self
            .client
            .translate_text()
            .text(&request.text)
            .source_language_code(&request.source_language_code)
            .target_language_code(&request.target_language_code)
            .send()
            .await
            .map_err(|e| ProxyError::TranslateError {
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(TranslationResult {
            translated_text: output.translated_text().to_string(),
            source_language_code: output.source_language_code().to_string(),
            target_language_code: output.target_language_code().to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Translator returning a canned result and counting calls
    pub(crate) struct FakeTranslator {
        pub result: Option<TranslationResult>,
        pub calls: AtomicUsize,
        pub requests: Mutex<Vec<TranslationRequest>>,
    }

    impl FakeTranslator {
        pub(crate) fn returning(result: TranslationResult) -> Self {
            Self {
                result: Some(result),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                result: None,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextTranslator for FakeTranslator {
        async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.result.clone().ok_or_else(|| ProxyError::TranslateError {
                message: "UnsupportedLanguagePairException".to_string(),
            })
        }
    }

    mod aws {
        use super::*;
        use aws_sdk_translate::operation::translate_text::{
            TranslateTextError, TranslateTextOutput,
        };
        use aws_sdk_translate::types::error::UnsupportedLanguagePairException;
        use aws_smithy_mocks::{mock, mock_client};

        #[tokio::test]
        async fn test_translate_forwards_parameters_verbatim() {
            let rule = mock!(aws_sdk_translate::Client::translate_text)
                .match_requests(|req| {
                    req.text() == Some("hi")
                        && req.source_language_code() == Some("auto")
                        && req.target_language_code() == Some("fr")
                })
                .then_output(|| {
                    TranslateTextOutput::builder()
                        .translated_text("salut")
                        .source_language_code("en")
                        .target_language_code("fr")
                        .build()
                        .unwrap()
                });

            let client = mock_client!(aws_sdk_translate, [&rule]);
            let translator = AwsTranslator::new(client);

            let result = translator
                .translate(&TranslationRequest::new("hi", "auto", "fr"))
                .await
                .unwrap();

            assert_eq!(
                result,
                TranslationResult {
                    translated_text: "salut".to_string(),
                    source_language_code: "en".to_string(),
                    target_language_code: "fr".to_string(),
                }
            );
            assert_eq!(rule.num_calls(), 1);
        }

        #[tokio::test]
        async fn test_service_error_is_translate_error() {
            let rule = mock!(aws_sdk_translate::Client::translate_text).then_error(|| {
                TranslateTextError::UnsupportedLanguagePairException(
                    UnsupportedLanguagePairException::builder()
                        .message("xx is not supported")
                        .build(),
                )
            });

            let client = mock_client!(aws_sdk_translate, [&rule]);
            let translator = AwsTranslator::new(client);

            let err = translator
                .translate(&TranslationRequest::new("hi", "en", "xx"))
                .await
                .unwrap_err();

            assert!(matches!(err, ProxyError::TranslateError { .. }));
        }
    }
}
