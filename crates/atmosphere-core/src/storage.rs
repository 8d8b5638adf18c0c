//! Local persistence for the pinned city list

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::model::{default_cities, WeatherRecord};

/// Storage key under which the pinned list is kept
pub const PINNED_CITIES_KEY: &str = "atmosphere_pinned_cities";

/// Minimal string key-value persistence
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow!("Failed to read {}: {}", key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-process store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Reads and writes the whole pinned list under [`PINNED_CITIES_KEY`].
///
/// Nothing here ever fails outward: unreadable or unusable data yields the
/// default seed list, and write failures are only logged.
#[derive(Debug)]
pub struct CityStore<S> {
    backend: S,
}

impl<S: KeyValueStore> CityStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn load(&self) -> Vec<WeatherRecord> {
        let raw = match self.backend.get(PINNED_CITIES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no stored city list, using defaults");
                return default_cities();
            }
            Err(e) => {
                tracing::warn!("failed to read stored city list: {}", e);
                return default_cities();
            }
        };

        match serde_json::from_str::<Vec<WeatherRecord>>(&raw) {
            Ok(cities) if !cities.is_empty() => cities,
            Ok(_) => {
                tracing::debug!("stored city list is empty, using defaults");
                default_cities()
            }
            Err(e) => {
                tracing::warn!("stored city list is malformed, using defaults: {}", e);
                default_cities()
            }
        }
    }

    pub fn save(&self, cities: &[WeatherRecord]) {
        let serialized = match serde_json::to_string(cities) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("failed to serialize city list: {}", e);
                return;
            }
        };

        if let Err(e) = self.backend.set(PINNED_CITIES_KEY, &serialized) {
            tracing::warn!("failed to persist city list: {}", e);
        } else {
            tracing::debug!(count = cities.len(), "persisted city list");
        }
    }
}
