use std::sync::Arc;

use tracing::warn;

use super::KeyValueStore;
use crate::gallery::Caption;

const CAPTION_PREFIX: &str = "cap:";
const AI_TAGS_PREFIX: &str = "ai-tags:";
const TOPIC_KEY: &str = "chat_topic";

/// Captions keyed by image URL (`cap:<url>`). Entries never expire.
#[derive(Clone)]
pub struct CaptionStore {
    store: Arc<dyn KeyValueStore>,
}

impl CaptionStore {
    /// Wraps a backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored caption for `image_url`, if present and readable.
    pub fn get(&self, image_url: &str) -> Option<Caption> {
        let key = format!("{CAPTION_PREFIX}{image_url}");
        let raw = read(self.store.as_ref(), &key)?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(key = %key, error = %e, "Ignoring unreadable caption"))
            .ok()
    }

    /// Stores a caption; failures are logged.
    pub fn set(&self, image_url: &str, caption: &Caption) {
        let key = format!("{CAPTION_PREFIX}{image_url}");
        match serde_json::to_string(caption) {
            Ok(json) => write(self.store.as_ref(), &key, &json),
            Err(e) => warn!(key = %key, error = %e, "Failed to encode caption"),
        }
    }
}

/// AI-derived tags keyed by album id (`ai-tags:<id>`).
#[derive(Clone)]
pub struct AiTagStore {
    store: Arc<dyn KeyValueStore>,
}

impl AiTagStore {
    /// Wraps a backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored tags for `album_id`; empty when absent or unreadable.
    pub fn get(&self, album_id: &str) -> Vec<String> {
        let key = format!("{AI_TAGS_PREFIX}{album_id}");
        read(self.store.as_ref(), &key)
            .and_then(|raw| {
                serde_json::from_str::<Vec<String>>(&raw)
                    .inspect_err(|e| warn!(key = %key, error = %e, "Ignoring unreadable tags"))
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Replaces the tags for `album_id` with the trimmed, non-empty,
    /// deduplicated subset of `tags` (first occurrence wins).
    pub fn set(&self, album_id: &str, tags: &[String]) {
        let key = format!("{AI_TAGS_PREFIX}{album_id}");
        let uniq = normalize_tags(tags);
        match serde_json::to_string(&uniq) {
            Ok(json) => write(self.store.as_ref(), &key, &json),
            Err(e) => warn!(key = %key, error = %e, "Failed to encode tags"),
        }
    }
}

/// The last detected chat topic (`chat_topic`).
#[derive(Clone)]
pub struct TopicStore {
    store: Arc<dyn KeyValueStore>,
}

impl TopicStore {
    /// Wraps a backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored topic id, or an empty string.
    pub fn get(&self) -> String {
        read(self.store.as_ref(), TOPIC_KEY).unwrap_or_default()
    }

    /// Stores a topic id; an empty string clears it.
    pub fn set(&self, topic: &str) {
        write(self.store.as_ref(), TOPIC_KEY, topic);
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut uniq: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !uniq.iter().any(|u| u == tag) {
            uniq.push(tag.to_string());
        }
    }
    uniq
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store
        .get(key)
        .inspect_err(|e| warn!(key = %key, error = %e, "Store read failed"))
        .ok()
        .flatten()
}

fn write(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        warn!(key = %key, error = %e, "Store write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};

    fn backend() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
        fn remove(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_ai_tags_trimmed_deduped_non_empty() {
        let store = AiTagStore::new(backend());
        let input: Vec<String> =
            ["  lidar ", "", "radar", "lidar", "   ", "Radar", "radar "].iter().map(ToString::to_string).collect();
        store.set("aavss", &input);
        assert_eq!(store.get("aavss"), vec!["lidar", "radar", "Radar"]);
        assert!(store.get("dataset").is_empty());
    }

    #[test]
    fn test_caption_round_trip_and_key_layout() {
        let kv = backend();
        let store = CaptionStore::new(kv.clone());
        let caption = Caption { caption: "A car.".to_string(), tags: vec!["car".to_string()] };
        store.set("https://x/a.jpg", &caption);

        assert_eq!(store.get("https://x/a.jpg"), Some(caption));
        assert!(kv.get("cap:https://x/a.jpg").unwrap().is_some());
        assert_eq!(store.get("https://x/b.jpg"), None);
    }

    #[test]
    fn test_corrupt_values_read_as_absent() {
        let kv = backend();
        kv.set("cap:u", "not json").unwrap();
        kv.set("ai-tags:a", "{\"x\":1}").unwrap();

        assert_eq!(CaptionStore::new(kv.clone()).get("u"), None);
        assert!(AiTagStore::new(kv).get("a").is_empty());
    }

    #[test]
    fn test_broken_backend_is_not_fatal() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(BrokenStore);
        let topics = TopicStore::new(kv.clone());
        topics.set("AAVSS");
        assert_eq!(topics.get(), "");
        CaptionStore::new(kv.clone()).set("u", &Caption::default());
        assert!(AiTagStore::new(kv).get("a").is_empty());
    }

    #[test]
    fn test_topic_store() {
        let topics = TopicStore::new(backend());
        assert_eq!(topics.get(), "");
        topics.set("Sri_Lanka_Dataset");
        assert_eq!(topics.get(), "Sri_Lanka_Dataset");
    }
}
