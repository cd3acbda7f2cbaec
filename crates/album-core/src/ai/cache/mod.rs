//! Caption caching.
//!
//! Captions are expensive (two upstream calls each), so results are kept in
//! memory keyed by image URL for a configurable TTL.

#[allow(clippy::module_inception)]
pub mod cache;
pub mod config;
pub mod types;

pub use cache::CaptionCache;
pub use config::{CacheConfig, CacheConfigError};
pub use types::{CacheStats, CachedCaption};
