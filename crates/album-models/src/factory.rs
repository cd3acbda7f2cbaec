//! Provider factory for creating provider instances from configuration.
//!
//! Each supported vendor is a `ProviderKind` carrying its defaults (API key
//! variable, base URL, model). Groq, Perplexity, OpenAI and DeepInfra share the
//! OpenAI-compatible client; Gemini has its own.

use crate::{GeminiProvider, MockProvider, OpenAICompatProvider};
use album_abstraction::{ChatProvider, ProviderError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::openai_compat::DEFAULT_TIMEOUT;

/// Provider kind enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Groq (OpenAI-compatible).
    Groq,
    /// Google Gemini.
    Gemini,
    /// Perplexity (OpenAI-compatible).
    Perplexity,
    /// OpenAI.
    OpenAI,
    /// DeepInfra (OpenAI-compatible).
    DeepInfra,
    /// Scripted provider for tests and offline runs.
    Mock,
}

impl ProviderKind {
    /// Every real provider, in default ask order.
    pub const ALL: [Self; 5] =
        [Self::Groq, Self::Gemini, Self::Perplexity, Self::OpenAI, Self::DeepInfra];

    /// Stable identifier used in configuration and answers.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::Perplexity => "perplexity",
            Self::OpenAI => "openai",
            Self::DeepInfra => "deepinfra",
            Self::Mock => "mock",
        }
    }

    /// Environment variable holding the API key.
    #[must_use]
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY",
            Self::Perplexity => "PPLX_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::DeepInfra => "DEEPINFRA_API_KEY",
            Self::Mock => "MOCK_API_KEY",
        }
    }

    /// Model requested when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Groq => "llama-3.1-8b-instant",
            Self::Gemini => "gemini-1.5-flash",
            Self::Perplexity => "sonar",
            Self::OpenAI => "gpt-4o-mini",
            Self::DeepInfra => "meta-llama/Meta-Llama-3.1-8B-Instruct",
            Self::Mock => "mock-model",
        }
    }

    /// Public API endpoint.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Perplexity => "https://api.perplexity.ai",
            Self::OpenAI => "https://api.openai.com/v1",
            Self::DeepInfra => "https://api.deepinfra.com/v1/openai",
            Self::Mock => "mock://local",
        }
    }

    /// Whether the default model accepts images.
    #[must_use]
    pub const fn supports_vision(self) -> bool {
        matches!(self, Self::Gemini | Self::OpenAI | Self::Mock)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "gemini" | "google" => Ok(Self::Gemini),
            "perplexity" | "pplx" => Ok(Self::Perplexity),
            "openai" => Ok(Self::OpenAI),
            "deepinfra" => Ok(Self::DeepInfra),
            "mock" => Ok(Self::Mock),
            other => Err(ProviderError::Other(format!("Unrecognized provider: {}", other))),
        }
    }
}

/// Provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// The kind of provider to create.
    pub kind: ProviderKind,
    /// The API key (required for every kind except `Mock`).
    pub api_key: Option<String>,
    /// Model override; the kind's default when `None`.
    pub model_id: Option<String>,
    /// Base URL override; the kind's default when `None`.
    pub base_url: Option<String>,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Creates a configuration with the kind's defaults and no key.
    #[must_use]
    pub fn new(kind: ProviderKind) -> Self {
        Self { kind, api_key: None, model_id: None, base_url: None, timeout: DEFAULT_TIMEOUT }
    }

    /// Sets the API key for this configuration.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the model.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Overrides the base URL (useful for proxies and tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The model that will be requested.
    #[must_use]
    pub fn effective_model(&self) -> &str {
        self.model_id.as_deref().unwrap_or_else(|| self.kind.default_model())
    }

    /// The endpoint that will be called.
    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_else(|| self.kind.default_base_url())
    }
}

/// Factory for creating provider instances.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a provider from the given configuration.
    ///
    /// # Errors
    /// Returns `ProviderError::NotConfigured` if a real provider has no API key.
    pub fn create(config: ProviderConfig) -> Result<Arc<dyn ChatProvider>, ProviderError> {
        debug!(
            provider = %config.kind,
            model_id = %config.effective_model(),
            base_url = %config.effective_base_url(),
            "Creating provider instance"
        );

        if config.kind == ProviderKind::Mock {
            return Ok(Arc::new(MockProvider::new(config.effective_model())));
        }

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                error!(provider = %config.kind, "Missing API key");
                ProviderError::NotConfigured(format!("{} is not set", config.kind.env_key()))
            })?
            .to_string();

        let model_id = config.effective_model().to_string();
        let base_url = config.effective_base_url().to_string();

        let provider: Arc<dyn ChatProvider> = match config.kind {
            ProviderKind::Gemini => Arc::new(
                GeminiProvider::new(model_id, base_url, api_key).with_timeout(config.timeout),
            ),
            kind => Arc::new(
                OpenAICompatProvider::new(kind.id(), model_id, base_url, api_key)
                    .with_vision(kind.supports_vision())
                    .with_timeout(config.timeout),
            ),
        };
        Ok(provider)
    }

    /// Creates a provider from a kind string and an API key.
    ///
    /// # Errors
    /// Returns a `ProviderError` if the kind is unrecognized or creation fails.
    pub fn create_with_api_key(
        kind_str: &str,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn ChatProvider>, ProviderError> {
        let kind = ProviderKind::from_str(kind_str).inspect_err(|_| {
            error!(provider = %kind_str, "Unrecognized provider kind");
        })?;
        Self::create(ProviderConfig::new(kind).with_api_key(api_key))
    }
}
