//! Album Core - portfolio gallery model and "ask the album" AI proxy.
//!
//! This crate provides:
//! - the gallery model: albums, media, search, the viewer state machine
//! - client-side stores for captions, AI tags and the chat topic
//! - chat topic routing and answer rendering
//! - the AI proxy with ordered provider fallback and a caption cache
//! - configuration and the axum HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use album_core::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> album_core::error::Result<()> {
//!     let config = Config::load()?;
//!     server::run(&config).await
//! }
//! ```

pub mod ai;
pub mod chat;
pub mod config;
pub mod error;
pub mod gallery;
pub mod server;
pub mod store;

pub use ai::{AiError, AiService, AskAnswer, CacheConfig, CaptionCache};
pub use chat::{ChatBrain, RouteError, Routed, Topic, md_to_html};
pub use config::{CliConfig, Config};
pub use error::{AlbumError, Result};
pub use gallery::{Album, Caption, CaptionSource, Catalog, MediaItem, MediaType, Viewer};
pub use store::{AiTagStore, CaptionStore, JsonFileStore, KeyValueStore, MemoryStore, TopicStore};
