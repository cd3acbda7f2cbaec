//! OpenAI-compatible chat completions provider.
//!
//! Groq, Perplexity, OpenAI and DeepInfra all expose the same
//! `POST {base_url}/chat/completions` contract with bearer authentication, so a
//! single implementation serves all four. The provider id reported back to
//! clients is whatever the factory assigned ("groq", "openai", ...).

use album_abstraction::{
    ChatMessage, ChatParameters, ChatProvider, ChatResponse, ChatUsage, MessageContent,
    ProviderError,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Default per-request deadline for upstream calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A provider speaking the OpenAI Chat Completions API.
#[derive(Debug, Clone)]
pub struct OpenAICompatProvider {
    /// Identifier reported in answers ("groq", "perplexity", ...).
    provider_id: String,
    /// The model ID (e.g., "gpt-4o-mini", "sonar").
    model_id: String,
    /// Base URL for the API endpoint (e.g., "https://api.groq.com/openai/v1").
    base_url: String,
    /// The API key for authentication.
    api_key: String,
    /// Whether image parts may be sent.
    vision: bool,
    /// Request deadline, reported in timeout errors.
    timeout: Duration,
    /// HTTP client for requests.
    client: Client,
}

impl OpenAICompatProvider {
    /// Creates a provider for the given endpoint.
    ///
    /// # Arguments
    /// * `provider_id` - Identifier reported to clients
    /// * `model_id` - The model to request
    /// * `base_url` - Base URL; a trailing slash is ignored
    /// * `api_key` - Bearer token
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            vision: false,
            timeout: DEFAULT_TIMEOUT,
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Marks the provider as accepting image parts.
    #[must_use]
    pub fn with_vision(mut self, vision: bool) -> Self {
        self.vision = vision;
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_client(timeout);
        self
    }

    /// Classifies a non-success status into a `ProviderError`.
    fn status_error(&self, status: reqwest::StatusCode, body: String) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::NotConfigured(format!(
                "{} rejected the API key ({}): {}",
                self.provider_id, status, body
            )),
            402 | 429 => ProviderError::QuotaExceeded {
                provider: self.provider_id.clone(),
                message: Some(body),
            },
            _ => ProviderError::ResponseError(format!("API error ({}): {}", status, body)),
        }
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|_| Client::new())
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ChatParameters>,
    ) -> Result<ChatResponse, ProviderError> {
        debug!(
            provider = %self.provider_id,
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "Sending chat completion"
        );

        if !self.vision && messages.iter().any(|m| m.content.has_images()) {
            return Err(ProviderError::UnsupportedContent {
                provider: self.provider_id.clone(),
                content_type: "image_url".to_string(),
            });
        }

        let url = format!("{}/chat/completions", self.base_url);

        let mut request_body = OpenAIRequest {
            model: self.model_id.clone(),
            messages: messages
                .iter()
                .map(|msg| OpenAIMessage { role: msg.role.clone(), content: msg.content.clone() })
                .collect(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: None,
        };

        if let Some(params) = parameters {
            request_body.temperature = params.temperature;
            request_body.top_p = params.top_p;
            request_body.max_tokens = params.max_tokens;
            request_body.stop = params.stop_sequences;
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.provider_id, error = %e, "Failed to send request");
                if e.is_timeout() {
                    ProviderError::Timeout {
                        provider: self.provider_id.clone(),
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    ProviderError::RequestError(format!("Network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                provider = %self.provider_id,
                status = %status,
                error = %error_text,
                "Provider returned error status"
            );
            return Err(self.status_error(status, error_text));
        }

        let parsed: OpenAIResponse = response.json().await.map_err(|e| {
            error!(provider = %self.provider_id, error = %e, "Failed to parse response");
            ProviderError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            error!(provider = %self.provider_id, "Empty answer in provider response");
            return Err(ProviderError::ResponseError("No content in API response".to_string()));
        }

        let usage = parsed.usage.map(|u| ChatUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            content,
            provider: self.provider_id.clone(),
            model_id: Some(self.model_id.clone()),
            usage,
        })
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn supports_vision(&self) -> bool {
        self.vision
    }
}

// OpenAI API request/response structures

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: MessageContent,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)] // Matches API naming
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
