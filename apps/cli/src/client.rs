//! HTTP client for the album server.

use std::time::Duration;

use album_core::gallery::{Caption, CaptionSource};
use album_core::AlbumError;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Base delay between attempts; attempt `n` waits `n` times this.
const RETRY_STEP: Duration = Duration::from_millis(400);

/// Answer returned by the ask endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AskReply {
    /// Model answer.
    #[serde(default)]
    pub answer: String,
    /// Provider that answered.
    #[serde(default)]
    pub provider: Option<String>,
}

/// Talks JSON to `/api/*`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    retries: u32,
    http: Client,
}

impl ApiClient {
    /// Creates a client for `base`; trailing slashes are dropped.
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            retries: 0,
            http: Client::builder().timeout(Duration::from_secs(60)).build().unwrap_or_default(),
        }
    }

    /// Extra attempts after a failed request.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// The server base URL.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// POSTs `payload` to `path`, retrying failures with a growing delay.
    ///
    /// A non-2xx reply fails with the server's `error` message when present.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, payload: &Value) -> Result<T> {
        let url = format!("{}{}", self.base, path);
        let mut attempt = 0;
        loop {
            match self.post_once(&url, payload).await {
                Ok(value) => {
                    return serde_json::from_value(value).with_context(|| format!("Unexpected reply from {url}"));
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(url = %url, attempt, error = %e, "Request failed, retrying");
                    tokio::time::sleep(RETRY_STEP * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, url: &str, payload: &Value) -> Result<Value> {
        debug!(url = %url, "POST");
        let response = self.http.post(url).json(payload).send().await.with_context(|| format!("POST {url}"))?;
        let status = response.status();
        // An unreadable body reads as an empty object.
        let body: Value = response.json().await.unwrap_or_else(|_| json!({}));
        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map_or_else(|| format!("HTTP {}", status.as_u16()), ToString::to_string);
            return Err(anyhow!(message));
        }
        Ok(body)
    }

    /// Asks a question about `context`.
    pub async fn ask(&self, question: &str, context: &str) -> Result<AskReply> {
        self.post_json("/api/ai", &json!({ "mode": "ask", "question": question, "context": context })).await
    }

    /// Captions one image.
    pub async fn caption_image(&self, image_url: &str) -> Result<Caption> {
        self.post_json("/api/ai", &json!({ "mode": "caption", "imageUrl": image_url })).await
    }

    /// True when `/health` answers `{ok: true}`.
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base);
        let response = self.http.get(&url).send().await.with_context(|| format!("GET {url}"))?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: Value = response.json().await.unwrap_or_else(|_| json!({}));
        Ok(body.get("ok").and_then(Value::as_bool).unwrap_or(false))
    }
}

#[async_trait]
impl CaptionSource for ApiClient {
    async fn caption(&self, image_url: &str) -> album_core::Result<Caption> {
        self.caption_image(image_url).await.map_err(|e| AlbumError::Upstream(e.to_string()))
    }
}
