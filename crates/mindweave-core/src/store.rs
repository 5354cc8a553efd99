//! Local key-value persistence for favorites, drafts, quota counters and sessions.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const FAVORITES_KEY: &str = "styles.favorites";
pub const LOCAL_DRAFTS_KEY: &str = "drafts.local";
pub const SERVER_QUOTA_KEY: &str = "quota.server";
pub const SESSION_KEY: &str = "session.current";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Malformed value for key `{key}`: {message}")]
    MalformedValue { key: String, message: String },

    #[error("Failed to encode value for key `{key}`: {message}")]
    Encode { key: String, message: String },
}

/// String-keyed, string-valued storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Reads `key` as JSON. Unparseable values are reported as `Ok(None)` after a warning, so a
/// corrupted entry falls back to defaults instead of blocking the editor.
pub fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, %err, "ignoring malformed stored value");
            Ok(None)
        }
    }
}

/// Reads `key` as JSON, reporting an unparseable value as [`StoreError::MalformedValue`].
///
/// Values that are read, changed and written back go through this loader.
pub fn load_json_strict<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StoreError::MalformedValue {
            key: key.to_string(),
            message: err.to_string(),
        })
}

pub fn save_json<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, raw)
}

/// In-memory store; each instance is isolated.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A store backed by a single JSON object file.
///
/// Every operation re-reads the file, so several handles on the same path stay consistent.
/// A missing file reads as empty and is created on the first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Malformed {
                path: self.path.clone(),
                message: "expected a JSON object".to_string(),
            }),
            Err(err) => Err(StoreError::Malformed {
                path: self.path.clone(),
                message: err.to_string(),
            }),
        }
    }

    fn write_map(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text =
            serde_json::to_string_pretty(&Value::Object(map)).map_err(|e| StoreError::Encode {
                key: String::new(),
                message: e.to_string(),
            })?;
        // Staged beside the target, then renamed over it.
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, text).map_err(io_err)?;
        std::fs::rename(&staging, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value));
        self.write_map(map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(map)?;
        }
        Ok(())
    }
}
