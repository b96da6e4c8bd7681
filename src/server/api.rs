//! Local HTTP development server
//!
//! Mirrors what the API gateway does in front of the deployed function: the raw
//! request body is wrapped in an invocation event and the envelope returned by
//! the proxy becomes the HTTP response.

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::core::handler::TranslationProxy;
use crate::core::models::{InvocationEvent, ResponseEnvelope};

/// Application state
#[derive(Clone)]
pub struct AppState {
    proxy: TranslationProxy,
}

impl AppState {
    /// State serving requests through `proxy`
    pub fn new(proxy: TranslationProxy) -> Self {
        Self { proxy }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }

        response
    }
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Translation handler
async fn translate(State(state): State<Arc<AppState>>, body: String) -> ResponseEnvelope {
    let event = if body.is_empty() {
        InvocationEvent {
            is_base64_encoded: Some(Value::Bool(false)),
            body: None,
        }
    } else {
        InvocationEvent::plain(body)
    };

    state.proxy.handle(event).await
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/translate", post(translate))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(proxy: TranslationProxy, host: String, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(proxy));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::FakeTranslator;
    use crate::core::config::ProxyConfig;
    use crate::core::models::TranslationResult;
    use crate::core::usage::tests::FakeMetrics;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(usage: &[f64]) -> Router {
        let config = ProxyConfig {
            character_count_limit: 1000.0,
            ..Default::default()
        };
        let translator = FakeTranslator::returning(TranslationResult {
            translated_text: "Bonjour".to_string(),
            source_language_code: "en".to_string(),
            target_language_code: "fr".to_string(),
        });
        let proxy = TranslationProxy::new(
            &config,
            Arc::new(FakeMetrics::daily(usage)),
            Arc::new(translator),
        );
        router(Arc::new(AppState::new(proxy)))
    }

    fn post_translate(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/translate")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_translate_route() {
        let body = r#"{"Text":"Hello","SourceLanguageCode":"en","TargetLanguageCode":"fr"}"#;
        let response = app(&[10.0]).oneshot(post_translate(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["TranslatedText"], "Bonjour");
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let response = app(&[10.0]).oneshot(post_translate("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quota_exceeded_is_forbidden() {
        let response = app(&[999.0, 1.0]).oneshot(post_translate("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
