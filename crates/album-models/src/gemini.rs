//! Google Gemini provider.
//!
//! Calls `POST {base_url}/models/{model}:generateContent`. System messages are
//! folded into `systemInstruction`; image parts are fetched and sent inline as
//! base64 because the API does not dereference arbitrary URLs.

use album_abstraction::{
    ChatMessage, ChatParameters, ChatProvider, ChatResponse, ChatUsage, ContentPart,
    MessageContent, ProviderError,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::openai_compat::DEFAULT_TIMEOUT;

const PROVIDER_ID: &str = "gemini";

/// Largest image body downloaded for inlining.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Google Gemini provider implementation.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    /// The model ID (e.g., "gemini-1.5-flash").
    model_id: String,
    /// The API key, sent as `x-goog-api-key`.
    api_key: String,
    /// The base URL for the Gemini API.
    base_url: String,
    /// Request deadline, reported in timeout errors.
    timeout: Duration,
    /// Cap on a downloaded image body.
    max_image_bytes: usize,
    /// HTTP client for making requests.
    client: Client,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    #[must_use]
    pub fn new(
        model_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            model_id: model_id.into(),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_image_bytes: MAX_IMAGE_BYTES,
            client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = Client::builder().timeout(timeout).build().unwrap_or_else(|_| Client::new());
        self
    }

    /// Sets the cap on downloaded image bodies.
    #[must_use]
    pub fn with_max_image_bytes(mut self, max: usize) -> Self {
        self.max_image_bytes = max;
        self
    }

    /// Converts a chat role to Gemini's vocabulary.
    ///
    /// System messages are filtered out before this is called.
    fn role_to_gemini(role: &str) -> String {
        match role {
            "assistant" => "model".to_string(),
            _ => "user".to_string(),
        }
    }

    /// Joins all system messages with a blank line, or `None` when absent.
    fn extract_system_messages(messages: &[ChatMessage]) -> Option<String> {
        let system_messages: Vec<String> =
            messages.iter().filter(|msg| msg.role == "system").map(|msg| msg.content.text()).collect();

        if system_messages.is_empty() { None } else { Some(system_messages.join("\n\n")) }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout { provider: PROVIDER_ID.to_string(), seconds: self.timeout.as_secs() }
        } else {
            ProviderError::RequestError(format!("Network error: {}", e))
        }
    }

    /// Downloads an image and wraps it as an inline data part.
    ///
    /// Only `http(s)` URLs are fetched, link-local and unspecified addresses
    /// are refused, and bodies over `max_image_bytes` are rejected.
    async fn fetch_inline_image(&self, url: &str) -> Result<GeminiPart, ProviderError> {
        check_image_url(url)?;

        let mut response = self.client.get(url).send().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to fetch image for Gemini");
            self.map_send_error(&e)
        })?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestError(format!(
                "Image fetch failed ({}): {}",
                response.status(),
                url
            )));
        }

        if let Some(len) = response.content_length()
            && len > self.max_image_bytes as u64
        {
            warn!(url = %url, bytes = len, "Image too large to inline");
            return Err(self.too_large());
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or_else(|| guess_mime_type(url).to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProviderError::RequestError(format!("Failed to read image: {}", e)))?
        {
            if bytes.len() + chunk.len() > self.max_image_bytes {
                warn!(url = %url, "Image body exceeded the inline limit");
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(GeminiPart {
            text: None,
            inline_data: Some(GeminiInlineData { mime_type, data: STANDARD.encode(&bytes) }),
        })
    }

    fn too_large(&self) -> ProviderError {
        ProviderError::RequestError(format!("Image exceeds {} bytes", self.max_image_bytes))
    }

    async fn to_parts(&self, content: &MessageContent) -> Result<Vec<GeminiPart>, ProviderError> {
        match content {
            MessageContent::Text(text) => Ok(vec![GeminiPart::text(text.clone())]),
            MessageContent::Parts(parts) => {
                let mut out = Vec::with_capacity(parts.len());
                for part in parts {
                    match part {
                        ContentPart::Text { text } => out.push(GeminiPart::text(text.clone())),
                        ContentPart::ImageUrl { image_url } => {
                            out.push(self.fetch_inline_image(&image_url.url).await?);
                        }
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Rejects URLs the server should never fetch on a client's behalf.
fn check_image_url(url: &str) -> Result<(), ProviderError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ProviderError::RequestError(format!("Invalid image URL '{}': {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ProviderError::RequestError(format!(
            "Unsupported image URL scheme: {}",
            parsed.scheme()
        )));
    }
    let host = parsed.host_str().unwrap_or_default().trim_start_matches('[').trim_end_matches(']');
    let blocked = match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_link_local() || ip.is_unspecified(),
        Ok(IpAddr::V6(ip)) => ip.is_unicast_link_local() || ip.is_unspecified(),
        Err(_) => host.is_empty(),
    };
    if blocked {
        return Err(ProviderError::RequestError(format!("Refusing to fetch image from {}", host)));
    }
    Ok(())
}

/// Guesses an image MIME type from a URL's extension.
fn guess_mime_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ChatParameters>,
    ) -> Result<ChatResponse, ProviderError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "GeminiProvider generating chat completion"
        );

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

        let system_instruction = Self::extract_system_messages(messages);

        let mut contents = Vec::new();
        for msg in messages.iter().filter(|msg| msg.role != "system") {
            contents.push(GeminiContent {
                role: Self::role_to_gemini(&msg.role),
                parts: self.to_parts(&msg.content).await?,
            });
        }

        let request_body = GeminiRequest {
            contents,
            generation_config: parameters.map(|params| GeminiGenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                max_output_tokens: params.max_tokens,
                stop_sequences: params.stop_sequences,
            }),
            system_instruction: system_instruction
                .map(|text| GeminiSystemInstruction { parts: vec![GeminiPart::text(text)] }),
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to Gemini API");
                self.map_send_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Gemini API returned error status");

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::NotConfigured(format!(
                    "gemini rejected the API key ({}): {}",
                    status, error_text
                )),
                402 | 429 => ProviderError::QuotaExceeded {
                    provider: PROVIDER_ID.to_string(),
                    message: Some(error_text),
                },
                _ => ProviderError::ResponseError(format!("API error ({}): {}", status, error_text)),
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Gemini API response");
            ProviderError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        let content = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<Vec<_>>().join("")
            })
            .unwrap_or_default()
            .trim()
            .to_string();

        if content.is_empty() {
            error!("No content in Gemini API response");
            return Err(ProviderError::ResponseError("No content in API response".to_string()));
        }

        let usage = gemini_response.usage_metadata.map(|meta| ChatUsage {
            prompt_tokens: meta.prompt_token_count.unwrap_or(0),
            completion_tokens: meta.candidates_token_count.unwrap_or(0),
            total_tokens: meta.total_token_count.unwrap_or(0),
        });

        Ok(ChatResponse {
            content,
            provider: PROVIDER_ID.to_string(),
            model_id: Some(self.model_id.clone()),
            usage,
        })
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn supports_vision(&self) -> bool {
        true
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    fn text(text: String) -> Self {
        Self { text: Some(text), inline_data: None }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_field_names)]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}
