//! Settings persistence backends.
//!
//! The dispatch core only reads settings; the editor owns their lifecycle.
//! Stores therefore never fail on read: an unreadable entry is reported as absent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::DispatchError;

/// Key-value store holding the persisted settings blob.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Raw value stored under `key`, or `None` when absent or unreadable.
    async fn load(&self, key: &str) -> Option<String>;

    async fn save(&self, key: &str, value: &str) -> Result<(), DispatchError>;
}

/// In-process store, mainly for tests and embedding hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(key, value);
        store
    }

    /// Synchronous write, usable outside an async context.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), value.into());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DispatchError> {
        self.set(key, value);
        Ok(())
    }
}

/// One JSON document per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Settings file unreadable; treating as absent");
                None
            }
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DispatchError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DispatchError::ConfigurationError(format!(
                "cannot create settings dir {}: {e}",
                self.dir.display()
            ))
        })?;
        let path = self.path_for(key);
        tokio::fs::write(&path, value).await.map_err(|e| {
            DispatchError::ConfigurationError(format!("cannot write {}: {e}", path.display()))
        })
    }
}
