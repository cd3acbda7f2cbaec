//! Client-side persistence.
//!
//! The front end keeps a few small values in browser storage: captions per
//! image URL, AI tags per album and the last chat topic. Here the same keys
//! live behind `KeyValueStore`, with an in-memory backend for the server and
//! tests and a JSON file backend for the CLI.
//!
//! Storage problems never surface to callers of the typed stores: unreadable
//! or corrupt values read as absent, failed writes are logged and dropped.

mod file;
mod memory;
mod typed;

use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use typed::{AiTagStore, CaptionStore, TopicStore};

/// Errors that can occur in a key-value backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// String key-value storage with `localStorage` semantics.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a value; missing keys are not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
