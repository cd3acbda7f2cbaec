//! Chat provider abstraction for the album assistant.
//!
//! This crate defines the trait every upstream LLM provider implements and the
//! message types passed through it. The proxy walks an ordered list of
//! `ChatProvider` trait objects; nothing above this layer knows which vendor
//! answered until it reads `ChatResponse::provider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when talking to an upstream provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderError {
    /// The request never produced a response (network, DNS, TLS).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The provider answered with an error status or an unusable body.
    #[error("Provider Response Error: {0}")]
    ResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The provider is missing credentials or rejected them.
    #[error("Provider Not Configured: {0}")]
    NotConfigured(String),

    /// The message content cannot be expressed for this provider.
    #[error("Unsupported content for provider '{provider}': {content_type}")]
    UnsupportedContent {
        /// The provider name.
        provider: String,
        /// Description of the content that was rejected.
        content_type: String,
    },

    /// Provider quota exceeded or rate limit hit.
    #[error("Provider '{provider}' quota exceeded{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    QuotaExceeded {
        /// The provider name (e.g., "openai", "groq").
        provider: String,
        /// Optional error message from the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The call did not finish within the per-call deadline.
    #[error("Provider '{provider}' timed out after {seconds}s")]
    Timeout {
        /// The provider name.
        provider: String,
        /// The deadline that elapsed.
        seconds: u64,
    },

    /// Other unexpected errors.
    #[error("Other Provider Error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Returns true when the error is a deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A reference to an image by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Publicly reachable image URL.
    pub url: String,
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An image the provider should look at.
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

/// Content of a chat message: plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// Multi-part content (text plus images).
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenates every text part, ignoring images.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Returns true if any part is an image.
    #[must_use]
    pub fn has_images(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Parts(parts) => {
                parts.iter().any(|part| matches!(part, ContentPart::ImageUrl { .. }))
            }
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Represents a message in a conversation with a chat provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender ("system", "user", "assistant").
    pub role: String,
    /// The content of the message.
    pub content: MessageContent,
}

impl ChatMessage {
    /// A system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: MessageContent::Text(content.into()) }
    }

    /// A plain user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: MessageContent::Text(content.into()) }
    }

    /// A user message carrying a text prompt and one image.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl { image_url: ImageUrl { url: image_url.into() } },
            ]),
        }
    }
}

/// Parameters for controlling generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParameters {
    /// Sampling temperature, between 0 and 2.
    pub temperature: Option<f32>,

    /// Nucleus sampling mass.
    pub top_p: Option<f32>,

    /// The maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sequences where the provider should stop generating.
    pub stop_sequences: Option<Vec<String>>,
}

impl ChatParameters {
    /// Settings for album question answering.
    #[must_use]
    pub fn ask() -> Self {
        Self { temperature: Some(0.2), max_tokens: Some(400), ..Self::default() }
    }

    /// Settings for one-sentence image captions.
    #[must_use]
    pub fn caption() -> Self {
        Self { temperature: Some(0.2), max_tokens: Some(160), ..Self::default() }
    }

    /// Settings for deriving tags from a caption.
    #[must_use]
    pub fn tags() -> Self {
        Self { temperature: Some(0.1), max_tokens: Some(60), ..Self::default() }
    }
}

impl Default for ChatParameters {
    fn default() -> Self {
        Self { temperature: Some(0.7), top_p: None, max_tokens: Some(512), stop_sequences: None }
    }
}

/// Usage statistics for a provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,

    /// Number of tokens in the completion.
    pub completion_tokens: u32,

    /// Total number of tokens used.
    pub total_tokens: u32,
}

/// The answer returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated content, trimmed.
    pub content: String,

    /// Provider identifier ("groq", "gemini", ...).
    pub provider: String,

    /// Optional: the model that produced the answer.
    pub model_id: Option<String>,

    /// Optional: usage statistics for the request.
    pub usage: Option<ChatUsage>,
}

/// A hosted chat-completion API.
///
/// Implementations must be `Send + Sync` so a single instance can serve
/// concurrent requests from the HTTP server.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generates a chat completion for the given conversation.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the request fails or the answer is unusable.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ChatParameters>,
    ) -> Result<ChatResponse, ProviderError>;

    /// Stable provider identifier reported to clients ("groq", "openai").
    fn provider_id(&self) -> &str;

    /// The model used for requests.
    fn model_id(&self) -> &str;

    /// Whether the provider accepts image parts.
    fn supports_vision(&self) -> bool {
        false
    }
}
