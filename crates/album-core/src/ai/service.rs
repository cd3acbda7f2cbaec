//! The proxy itself: ordered provider fallback for questions and captions.

use std::sync::Arc;
use std::time::Duration;

use album_abstraction::{ChatMessage, ChatParameters, ChatProvider, ProviderError};
use album_models::{DEFAULT_TIMEOUT, ProviderFactory, ProviderKind};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::cache::CaptionCache;
use super::error::{AiError, MAX_QUESTION_CHARS};
use super::prompts::{ask_messages, caption_messages, parse_tags, tag_messages};
use crate::config::{Config, ProvidersConfig};
use crate::error::AlbumError;
use crate::gallery::{Caption, CaptionSource};

/// A successful `ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskAnswer {
    /// Model answer, trimmed.
    pub answer: String,
    /// Id of the provider that answered.
    pub provider: String,
}

/// Walks provider chains with a per-call deadline.
pub struct AiService {
    ask_providers: Vec<Arc<dyn ChatProvider>>,
    caption_providers: Vec<Arc<dyn ChatProvider>>,
    cache: CaptionCache,
    timeout: Duration,
}

impl AiService {
    /// Creates a service over explicit provider chains.
    pub fn new(
        ask_providers: Vec<Arc<dyn ChatProvider>>,
        caption_providers: Vec<Arc<dyn ChatProvider>>,
        cache: CaptionCache,
    ) -> Self {
        Self { ask_providers, caption_providers, cache, timeout: DEFAULT_TIMEOUT }
    }

    /// Overrides the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds both chains from configuration, keeping only providers with keys.
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let providers = &config.providers;
        let ask = build_chain(providers, &providers.ask_order, false);
        let caption = build_chain(providers, &providers.caption_order, true);
        let cache = CaptionCache::new(config.cache.clone())?;
        Ok(Self::new(ask, caption, cache).with_timeout(providers.timeout()))
    }

    /// Ids of the ask chain, in order.
    pub fn ask_provider_ids(&self) -> Vec<&str> {
        self.ask_providers.iter().map(|p| p.provider_id()).collect()
    }

    /// Ids of the caption chain, in order.
    pub fn caption_provider_ids(&self) -> Vec<&str> {
        self.caption_providers.iter().map(|p| p.provider_id()).collect()
    }

    /// The caption cache.
    pub fn cache(&self) -> &CaptionCache {
        &self.cache
    }

    /// The per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Answers `question` about `context` with the first provider that succeeds.
    pub async fn ask(&self, question: &str, context: &str) -> Result<AskAnswer, AiError> {
        let question = question.trim();
        let context = context.trim();
        if question.is_empty() || context.is_empty() {
            return Err(AiError::MissingQuestion);
        }
        let chars = question.chars().count();
        if chars > MAX_QUESTION_CHARS {
            return Err(AiError::QuestionTooLong { chars });
        }
        if self.ask_providers.is_empty() {
            warn!("Ask requested but no provider is configured");
            return Err(AiError::NoProviders("ask"));
        }

        let messages = ask_messages(question, context);
        let mut failures = Vec::with_capacity(self.ask_providers.len());
        for provider in &self.ask_providers {
            match self.call(provider.as_ref(), &messages, ChatParameters::ask()).await {
                Ok(answer) => {
                    info!(provider = %provider.provider_id(), failed_before = failures.len(), "Ask answered");
                    return Ok(AskAnswer { answer, provider: provider.provider_id().to_string() });
                }
                Err(e) => {
                    warn!(provider = %provider.provider_id(), error = %e, "Ask provider failed");
                    failures.push(e);
                }
            }
        }
        Err(exhausted(failures))
    }

    /// Captions `image_url`, serving repeats from the cache.
    pub async fn caption(&self, image_url: &str) -> Result<Caption, AiError> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(AiError::MissingImageUrl);
        }
        if let Some(hit) = self.cache.get(image_url) {
            debug!(url = %image_url, "Caption cache hit");
            return Ok(hit);
        }
        if self.caption_providers.is_empty() {
            warn!("Caption requested but no vision provider is configured");
            return Err(AiError::NoProviders("captions"));
        }

        let mut failures = Vec::with_capacity(self.caption_providers.len());
        for provider in &self.caption_providers {
            match self.caption_with(provider.as_ref(), image_url).await {
                Ok(caption) => {
                    info!(provider = %provider.provider_id(), url = %image_url, tags = caption.tags.len(), "Captioned");
                    self.cache.insert(image_url, caption.clone());
                    return Ok(caption);
                }
                Err(e) => {
                    warn!(provider = %provider.provider_id(), url = %image_url, error = %e, "Caption provider failed");
                    failures.push(e);
                }
            }
        }
        Err(exhausted(failures))
    }

    async fn caption_with(&self, provider: &dyn ChatProvider, image_url: &str) -> Result<Caption, ProviderError> {
        let caption = self.call(provider, &caption_messages(image_url), ChatParameters::caption()).await?;
        let reply = self.call(provider, &tag_messages(&caption), ChatParameters::tags()).await?;
        Ok(Caption { tags: parse_tags(&reply), caption })
    }

    async fn call(
        &self,
        provider: &dyn ChatProvider,
        messages: &[ChatMessage],
        parameters: ChatParameters,
    ) -> Result<String, ProviderError> {
        let response = tokio::time::timeout(self.timeout, provider.chat(messages, Some(parameters)))
            .await
            .map_err(|_| ProviderError::Timeout {
                provider: provider.provider_id().to_string(),
                seconds: self.timeout.as_secs(),
            })??;

        let content = response.content.trim();
        if content.is_empty() {
            return Err(ProviderError::ResponseError("Empty answer".to_string()));
        }
        Ok(content.to_string())
    }
}

#[async_trait]
impl CaptionSource for AiService {
    async fn caption(&self, image_url: &str) -> crate::error::Result<Caption> {
        Self::caption(self, image_url).await.map_err(AlbumError::from)
    }
}

fn exhausted(failures: Vec<ProviderError>) -> AiError {
    let attempts = failures.len();
    if failures.iter().all(ProviderError::is_timeout) {
        return AiError::TimedOut { attempts };
    }
    let last = failures.last().map(ToString::to_string).unwrap_or_default();
    AiError::AllFailed { attempts, last }
}

fn build_chain(providers: &ProvidersConfig, order: &[String], vision: bool) -> Vec<Arc<dyn ChatProvider>> {
    let mut chain: Vec<Arc<dyn ChatProvider>> = Vec::new();
    for name in order {
        let kind = match name.parse::<ProviderKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(provider = %name, error = %e, "Skipping unknown provider");
                continue;
            }
        };
        if chain.iter().any(|p| p.provider_id() == kind.id()) {
            continue;
        }
        match ProviderFactory::create(providers.provider_config(kind)) {
            Ok(provider) if vision && !provider.supports_vision() => {
                warn!(provider = %kind, "Skipping provider without vision for captions");
            }
            Ok(provider) => chain.push(provider),
            Err(ProviderError::NotConfigured(reason)) => {
                debug!(provider = %kind, reason = %reason, "Provider not configured");
            }
            Err(e) => warn!(provider = %kind, error = %e, "Failed to create provider"),
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::cache::CacheConfig;
    use album_models::MockProvider;

    fn cache() -> CaptionCache {
        CaptionCache::new(CacheConfig::default()).unwrap()
    }

    fn mock(id: &str) -> Arc<MockProvider> {
        Arc::new(MockProvider::new("m").with_id(id))
    }

    fn chain(providers: &[&Arc<MockProvider>]) -> Vec<Arc<dyn ChatProvider>> {
        providers.iter().map(|p| Arc::clone(*p) as Arc<dyn ChatProvider>).collect()
    }

    #[tokio::test]
    async fn test_ask_falls_back_to_second_provider() {
        let first = Arc::new(
            MockProvider::new("m")
                .with_id("groq")
                .with_error(ProviderError::NotConfigured("bad key".to_string())),
        );
        let second = Arc::new(MockProvider::new("m").with_id("gemini").with_reply("  Lidar and radar.  "));
        let service = AiService::new(chain(&[&first, &second]), vec![], cache());

        let answer = service.ask("What sensors?", "Title: AAVSS").await.unwrap();
        assert_eq!(answer, AskAnswer { answer: "Lidar and radar.".to_string(), provider: "gemini".to_string() });
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_ask_stops_at_first_success() {
        let first = mock("groq");
        let second = mock("gemini");
        let service = AiService::new(chain(&[&first, &second]), vec![], cache());

        let answer = service.ask("What sensors?", "ctx").await.unwrap();
        assert_eq!(answer.provider, "groq");
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_answer_moves_on() {
        let first = Arc::new(MockProvider::new("m").with_id("groq").with_reply("   "));
        let second = mock("openai");
        let service = AiService::new(chain(&[&first, &second]), vec![], cache());
        assert_eq!(service.ask("q?", "ctx").await.unwrap().provider, "openai");
    }

    #[tokio::test]
    async fn test_all_fail() {
        let first =
            Arc::new(MockProvider::new("m").with_id("groq").with_error(ProviderError::RequestError("down".into())));
        let second = Arc::new(
            MockProvider::new("m")
                .with_id("openai")
                .with_error(ProviderError::QuotaExceeded { provider: "openai".into(), message: None }),
        );
        let service = AiService::new(chain(&[&first, &second]), vec![], cache());

        let err = service.ask("q?", "ctx").await.unwrap_err();
        assert!(matches!(err, AiError::AllFailed { attempts: 2, .. }));
        assert!(err.status_code().as_u16() >= 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_timeouts_map_to_timed_out() {
        let slow = Arc::new(MockProvider::new("m").with_id("groq").with_delay(Duration::from_secs(60)));
        let service = AiService::new(chain(&[&slow]), vec![], cache())
            .with_timeout(Duration::from_secs(30));

        let err = service.ask("q?", "ctx").await.unwrap_err();
        assert_eq!(err, AiError::TimedOut { attempts: 1 });
        assert_eq!(err.status_code().as_u16(), 504);
    }

    #[tokio::test]
    async fn test_ask_validation() {
        let service = AiService::new(chain(&[&mock("groq")]), vec![], cache());
        assert_eq!(service.ask("  ", "ctx").await.unwrap_err(), AiError::MissingQuestion);
        assert_eq!(service.ask("q", "").await.unwrap_err(), AiError::MissingQuestion);
        let long = "x".repeat(MAX_QUESTION_CHARS + 1);
        assert_eq!(service.ask(&long, "ctx").await.unwrap_err(), AiError::QuestionTooLong { chars: 2001 });
        assert!(service.ask(&"x".repeat(MAX_QUESTION_CHARS), "ctx").await.is_ok());
    }

    #[tokio::test]
    async fn test_no_providers() {
        let service = AiService::new(vec![], vec![], cache());
        assert_eq!(service.ask("q", "ctx").await.unwrap_err(), AiError::NoProviders("ask"));
        assert_eq!(service.caption("https://x/a.jpg").await.unwrap_err(), AiError::NoProviders("captions"));
    }

    #[tokio::test]
    async fn test_caption_is_cached() {
        let vision = Arc::new(
            MockProvider::new("m")
                .with_id("openai")
                .with_reply("A test vehicle on a wet road.")
                .with_reply("vehicle, road, rain"),
        );
        let service = AiService::new(vec![], chain(&[&vision]), cache());

        let first = service.caption("https://x/a.jpg").await.unwrap();
        let second = service.caption("https://x/a.jpg").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.caption, "A test vehicle on a wet road.");
        assert_eq!(first.tags, vec!["vehicle", "road", "rain"]);
        assert_eq!(vision.calls(), 2);
        assert_eq!(service.cache().stats().total_hits, 1);
    }

    #[tokio::test]
    async fn test_tag_call_uses_caption() {
        let vision = mock("openai");
        let service = AiService::new(vec![], chain(&[&vision]), cache());
        service.caption("https://x/a.jpg").await.unwrap();
        // The last call is the tag call; it carries the first caption as text.
        assert!(vision.last_messages()[1].content.text().starts_with("Caption: "));
    }

    #[tokio::test]
    async fn test_failed_caption_is_not_cached() {
        let vision = Arc::new(
            MockProvider::new("m").with_id("openai").with_error(ProviderError::ResponseError("500".into())),
        );
        let service = AiService::new(vec![], chain(&[&vision]), cache());

        assert!(service.caption("https://x/a.jpg").await.is_err());
        assert!(service.cache().is_empty());
        assert!(service.caption("https://x/a.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_caption_requires_url() {
        let service = AiService::new(vec![], vec![], cache());
        assert_eq!(service.caption(" ").await.unwrap_err(), AiError::MissingImageUrl);
    }

    #[test]
    fn test_from_config_keeps_only_keyed_providers() {
        let mut config = Config::default();
        config.providers.ask_order = vec!["groq".into(), "bogus".into(), "mock".into(), "openai".into()];
        config.providers.caption_order = vec!["groq".into(), "openai".into(), "mock".into()];
        config.providers.settings.entry("openai".to_string()).or_default().api_key = Some("sk-test".into());
        config.providers.settings.entry("groq".to_string()).or_default().api_key = Some("gsk-test".into());

        let service = AiService::from_config(&config).unwrap();
        assert_eq!(service.ask_provider_ids(), vec!["groq", "mock", "openai"]);
        assert_eq!(service.caption_provider_ids(), vec!["openai", "mock"]);
    }

    #[test]
    fn test_from_config_with_no_keys_is_empty() {
        let service = AiService::from_config(&Config::default()).unwrap();
        assert!(service.ask_provider_ids().is_empty());
        assert!(service.caption_provider_ids().is_empty());
        assert_eq!(service.timeout(), Duration::from_secs(30));
    }
}
