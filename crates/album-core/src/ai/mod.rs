//! The "ask the album" AI proxy.
//!
//! `AiService` holds two ordered provider chains, one for questions and one
//! for vision captions, and tries each provider in turn until one answers.
//! Captions are cached in memory by image URL.

pub mod cache;
pub mod error;
pub mod prompts;
pub mod service;

pub use cache::{CacheConfig, CacheConfigError, CacheStats, CaptionCache};
pub use error::{AiError, MAX_QUESTION_CHARS};
pub use prompts::parse_tags;
pub use service::{AiService, AskAnswer};
