use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{KeyValueStore, StoreResult};

/// A store persisted as one JSON object in a file.
///
/// The file is read once when opened. Every write rewrites it through a
/// temporary sibling file followed by a rename, and reaches the in-memory
/// map only once the rename succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// A missing file starts empty. A corrupt file is logged and treated as
    /// empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Corrupt store file, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = values.len(), "Opened store file");
        Ok(Self { path, values: Mutex::new(values) })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(values)?;
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let stem = self.path.file_stem().and_then(|s| s.to_str()).unwrap_or("store");
        let temp_path = dir.join(format!("{stem}.tmp.{}", Uuid::new_v4()));

        if let Err(e) = fs::write(&temp_path, json) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("cap:https://x/a.jpg", r#"{"caption":"A"}"#).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("cap:https://x/a.jpg").unwrap().as_deref(), Some(r#"{"caption":"A"}"#));
        reopened.remove("cap:https://x/a.jpg").unwrap();
        assert_eq!(JsonFileStore::open(&path).unwrap().get("cap:https://x/a.jpg").unwrap(), None);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("sub");
        let store = JsonFileStore::open(blocker.join("state.json")).unwrap();
        store.set("kept", "1").unwrap();

        // A file where the directory should be makes every write fail.
        fs::remove_dir_all(&blocker).unwrap();
        fs::write(&blocker, "not a directory").unwrap();

        assert!(store.set("lost", "2").is_err());
        assert_eq!(store.get("lost").unwrap(), None);
        assert!(store.remove("kept").is_err());
        assert_eq!(store.get("kept").unwrap().as_deref(), Some("1"));

        fs::remove_file(&blocker).unwrap();
        store.set("lost", "2").unwrap();
        let reopened = JsonFileStore::open(blocker.join("state.json")).unwrap();
        assert_eq!(reopened.get("kept").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{oops").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        store.set("k", "v").unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"k\""));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("state.json")).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names.len(), 1);
    }
}
