//! Provider implementations for the album assistant.
//!
//! This crate provides concrete implementations of the `ChatProvider` trait.
//!
//! # Supported Providers
//!
//! - **Groq**, **Perplexity**, **OpenAI**, **DeepInfra**: OpenAI-compatible chat completions
//! - **Gemini**: Google's `generateContent` API (vision capable)
//! - **Mock**: Scripted answers for tests and offline runs

pub mod factory;
pub mod gemini;
pub mod openai_compat;

use album_abstraction::{
    ChatMessage, ChatParameters, ChatProvider, ChatResponse, ChatUsage, ProviderError,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

pub use factory::{ProviderConfig, ProviderFactory, ProviderKind};
pub use gemini::GeminiProvider;
pub use openai_compat::{DEFAULT_TIMEOUT, OpenAICompatProvider};

/// A scripted implementation of `ChatProvider` for testing and offline use.
///
/// Queued outcomes are consumed in order; once the script runs dry every call
/// succeeds with an echo of the last user message.
#[derive(Debug)]
pub struct MockProvider {
    id: String,
    model: String,
    vision: bool,
    delay: Option<Duration>,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl MockProvider {
    /// Creates a new `MockProvider` reporting itself as "mock".
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: "mock".to_string(),
            model: model.into(),
            vision: true,
            delay: None,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the provider id reported in answers.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Queues a successful answer.
    #[must_use]
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn with_error(self, error: ProviderError) -> Self {
        self.push(Err(error));
        self
    }

    /// Sleeps before answering, to exercise deadlines.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets whether image parts are accepted.
    #[must_use]
    pub fn with_vision(mut self, vision: bool) -> Self {
        self.vision = vision;
        self
    }

    /// Queues an outcome on an existing instance.
    pub fn push(&self, outcome: Result<String, ProviderError>) {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).push_back(outcome);
    }

    /// Number of `chat` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages passed to the most recent call.
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ChatParameters>,
    ) -> Result<ChatResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(
            provider = %self.id,
            message_count = messages.len(),
            parameters = ?parameters,
            "MockProvider generating chat completion"
        );

        *self.last_messages.lock().unwrap_or_else(PoisonError::into_inner) = messages.to_vec();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        let content = match scripted {
            Some(outcome) => outcome?,
            None => {
                let question = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == "user")
                    .map(|m| m.content.text())
                    .unwrap_or_default();
                format!("Mock answer from {}: {}", self.id, question)
            }
        };

        let prompt_tokens = messages.iter().map(|m| count_tokens(&m.content.text())).sum::<u32>();
        let completion_tokens = count_tokens(&content);

        Ok(ChatResponse {
            content,
            provider: self.id.clone(),
            model_id: Some(self.model.clone()),
            usage: Some(ChatUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }

    fn provider_id(&self) -> &str {
        &self.id
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn supports_vision(&self) -> bool {
        self.vision
    }
}

/// Count tokens in a string (simplified: word count).
fn count_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_consumes_script_then_echoes() {
        let mock = MockProvider::new("m")
            .with_id("groq")
            .with_error(ProviderError::Other("down".to_string()))
            .with_reply("scripted");

        let messages = [ChatMessage::user("ping")];
        assert!(mock.chat(&messages, None).await.is_err());
        assert_eq!(mock.chat(&messages, None).await.unwrap().content, "scripted");

        let echoed = mock.chat(&messages, None).await.unwrap();
        assert_eq!(echoed.content, "Mock answer from groq: ping");
        assert_eq!(echoed.provider, "groq");
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.last_messages(), messages.to_vec());
    }

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens("one two  three"), 3);
        assert_eq!(count_tokens(""), 0);
    }
}
