//! Shared test utilities for Album Core integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use album_abstraction::ChatProvider;
use album_core::ai::{AiService, CacheConfig, CaptionCache};
use album_core::config::Config;
use album_core::server;
use album_models::MockProvider;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

/// Wraps mock providers as a provider chain.
pub fn chain(providers: &[&Arc<MockProvider>]) -> Vec<Arc<dyn ChatProvider>> {
    providers.iter().map(|p| Arc::clone(*p) as Arc<dyn ChatProvider>).collect()
}

/// A mock provider with the given id.
pub fn mock(id: &str) -> Arc<MockProvider> {
    Arc::new(MockProvider::new("test-model").with_id(id))
}

/// Builds a service over explicit chains with the default cache.
pub fn service(
    ask: Vec<Arc<dyn ChatProvider>>,
    caption: Vec<Arc<dyn ChatProvider>>,
) -> Arc<AiService> {
    let cache = CaptionCache::new(CacheConfig::default()).expect("default cache config is valid");
    Arc::new(AiService::new(ask, caption, cache))
}

/// The full application with default configuration.
pub fn app(ai: Arc<AiService>) -> Router {
    server::app(ai, &Config::default())
}

/// A response decoded for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

/// Sends one request through `app` without a socket.
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body readable");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse { status, headers, json }
}

/// POSTs a raw body.
pub async fn post(app: Router, uri: &str, body: impl Into<Body>) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("valid request");
    send(app, request).await
}

/// POSTs a JSON value.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> TestResponse {
    post(app, uri, body.to_string()).await
}
