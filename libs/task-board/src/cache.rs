//! Local key/value storage for client state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::BoardError;
use crate::model::LocalMeta;

/// JSON array of [`LocalMeta`].
pub const TASKS_KEY: &str = "taskflow_tasks";
/// Bearer token of the logged-in user.
pub const TOKEN_KEY: &str = "token";
/// `{"name": ...}` of the logged-in user.
pub const USER_KEY: &str = "user";

/// String values under string keys. Reads and writes are synchronous.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, BoardError>;
    fn set(&self, key: &str, value: &str) -> Result<(), BoardError>;
    fn remove(&self, key: &str) -> Result<(), BoardError>;
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, BoardError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BoardError> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BoardError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BoardError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BoardError::cache(format!("invalid cache key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, BoardError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BoardError::cache(format!("read {}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BoardError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| BoardError::cache(format!("create {}: {e}", self.dir.display())))?;
        std::fs::write(&path, value)
            .map_err(|e| BoardError::cache(format!("write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<(), BoardError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BoardError::cache(format!("remove {}: {e}", path.display()))),
        }
    }
}

/// Reads the annotation list. A missing or unreadable entry yields an empty
/// list; the cache is never authoritative.
pub fn load_meta(cache: &dyn LocalCache) -> Vec<LocalMeta> {
    let raw = match cache.get(TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read task cache");
            return Vec::new();
        }
    };
    let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed task cache");
            return Vec::new();
        }
    };
    // One unreadable entry must not cost the others their annotations.
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<LocalMeta>(entry) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable task cache entry");
                None
            }
        })
        .collect()
}

pub fn store_meta(cache: &dyn LocalCache, metas: &[LocalMeta]) -> Result<(), BoardError> {
    let json = serde_json::to_string(metas).map_err(|e| BoardError::cache(e.to_string()))?;
    cache.set(TASKS_KEY, &json)
}
