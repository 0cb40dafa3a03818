//! Flat key-value persistence for wheel layer lists.

use crate::layer::Layer;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_KEY: &str = "multiWheel";

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct StorageKey(String);

crate::impl_string_newtype!(StorageKey);

impl Default for StorageKey {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to determine data directory")]
    DataDirNotFound,
    #[error("Store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &StorageKey) -> Option<String>;
    fn set(&mut self, key: &StorageKey, value: String) -> Result<(), StoreError>;
}

/// In-memory store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &StorageKey, value: impl Into<String>) {
        self.entries.lock().insert(key.to_string(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &StorageKey) -> Option<String> {
        self.entries.lock().get(key.as_str()).cloned()
    }

    fn set(&mut self, key: &StorageKey, value: String) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object file mapping keys to string values.
///
/// Every write re-reads the file so several wheels can share it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        let proj_dirs =
            ProjectDirs::from("org", "rota", "rota").ok_or(StoreError::DataDirNotFound)?;
        Ok(proj_dirs.data_dir().join("store.json"))
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(data) = fs_err::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable store {}: {}", self.path.display(), e);
            BTreeMap::new()
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &StorageKey) -> Option<String> {
        self.read_all().remove(key.as_str())
    }

    fn set(&mut self, key: &StorageKey, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        // readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs_err::write(&tmp, serde_json::to_string_pretty(&entries)?)?;
        fs_err::rename(&tmp, &self.path)?;
        Ok(())
    }
}

pub fn encode_layers(layers: &[Layer]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(layers)?)
}

/// Reads the layer list under `key`. Anything absent or malformed is `None`.
pub fn load_layers(store: &dyn KeyValueStore, key: &StorageKey) -> Option<Vec<Layer>> {
    let data = store.get(key)?;
    match serde_json::from_str(&data) {
        Ok(layers) => Some(layers),
        Err(e) => {
            log::warn!("Discarding saved state under '{}': {}", key, e);
            None
        }
    }
}

pub fn save_layers(
    store: &mut dyn KeyValueStore,
    key: &StorageKey,
    layers: &[Layer],
) -> Result<(), StoreError> {
    store.set(key, encode_layers(layers)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerId;

    fn sample_layers() -> Vec<Layer> {
        let mut a = Layer::new(LayerId::new("a1"), "Food", 4);
        a.sectors[2].label = "Tacos al pastor".to_string();
        a.rotation_deg = 135.0;
        let mut b = Layer::new(LayerId::new("b2"), "Drinks", 3);
        b.rotation_deg = 299.99;
        vec![a, b]
    }

    #[test]
    fn test_round_trip_keeps_names_labels_rotation() {
        let mut store = MemoryStore::new();
        let key = StorageKey::default();
        let layers = sample_layers();
        save_layers(&mut store, &key, &layers).unwrap();

        let loaded = load_layers(&store, &key).unwrap();
        assert_eq!(loaded.len(), 2);
        for (a, b) in layers.iter().zip(&loaded) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.name(), b.name());
            assert_eq!(a.sectors(), b.sectors());
            assert_eq!(a.rotation_deg(), b.rotation_deg());
        }
    }

    #[test]
    fn test_missing_and_malformed_are_none() {
        let store = MemoryStore::new();
        let key = StorageKey::default();
        assert!(load_layers(&store, &key).is_none());

        store.insert(&key, "{not json");
        assert!(load_layers(&store, &key).is_none());

        store.insert(&key, r#"[{"id":"a","name":"A","sectors":[]}]"#);
        assert!(load_layers(&store, &key).is_none());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let mut store = MemoryStore::new();
        let view = store.clone();
        let key = StorageKey::new("k");
        store.set(&key, "v".to_string()).unwrap();
        assert_eq!(view.get(&key).as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = std::env::temp_dir().join(format!("rota-store-{}", std::process::id()));
        let path = dir.join("nested").join("store.json");
        let mut first = FileStore::new(&path);
        let mut second = FileStore::new(&path);

        first.set(&StorageKey::new("one"), "1".to_string()).unwrap();
        second.set(&StorageKey::new("two"), "2".to_string()).unwrap();

        assert_eq!(first.get(&StorageKey::new("one")).as_deref(), Some("1"));
        assert_eq!(first.get(&StorageKey::new("two")).as_deref(), Some("2"));
        assert!(first.get(&StorageKey::new("three")).is_none());

        let _ = fs_err::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_unreadable_file_reads_empty() {
        let dir = std::env::temp_dir().join(format!("rota-store-bad-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("store.json");
        fs_err::write(&path, "garbage").unwrap();

        let mut store = FileStore::new(&path);
        assert!(store.get(&StorageKey::default()).is_none());
        store.set(&StorageKey::default(), "[]".to_string()).unwrap();
        assert_eq!(store.get(&StorageKey::default()).as_deref(), Some("[]"));

        let _ = fs_err::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_replaces_file_without_leftovers() {
        let dir = std::env::temp_dir().join(format!("rota-store-swap-{}", std::process::id()));
        let path = dir.join("store.json");
        let mut store = FileStore::new(&path);

        store.set(&StorageKey::new("a"), "1".to_string()).unwrap();
        store.set(&StorageKey::new("b"), "2".to_string()).unwrap();

        let names: Vec<_> = fs_err::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["store.json".to_string()]);
        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&fs_err::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);

        let _ = fs_err::remove_dir_all(&dir);
    }
}
