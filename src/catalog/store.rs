//! Catalog persistence backends.

use super::MediaRecord;
use clipdock_common::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Load/save primitive for the record list.
pub trait CatalogStore: Send + Sync {
    /// Load all records, newest first.
    fn load(&self) -> Result<Vec<MediaRecord>>;

    /// Replace the persisted record list.
    fn save(&self, records: &[MediaRecord]) -> Result<()>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<MediaRecord>> {
        (**self).load()
    }

    fn save(&self, records: &[MediaRecord]) -> Result<()> {
        (**self).save(records)
    }
}

#[derive(Serialize)]
struct PersistedCatalogRef<'a> {
    videos: &'a [MediaRecord],
}

#[derive(Deserialize)]
struct PersistedCatalog {
    #[serde(default)]
    videos: Vec<MediaRecord>,
}

/// Stores the catalog as a pretty-printed JSON document `{"videos": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self) -> Result<Vec<MediaRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let catalog: PersistedCatalog = serde_json::from_str(&content).map_err(|e| {
            clipdock_common::Error::internal(format!(
                "Failed to parse catalog {:?}: {}",
                self.path, e
            ))
        })?;
        Ok(catalog.videos)
    }

    fn save(&self, records: &[MediaRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(&PersistedCatalogRef { videos: records })
            .map_err(|e| clipdock_common::Error::internal(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Keeps the catalog in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<MediaRecord>>,
}

impl MemoryStore {
    /// Snapshot of what was last saved.
    pub fn saved(&self) -> Vec<MediaRecord> {
        self.records.lock().clone()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self) -> Result<Vec<MediaRecord>> {
        Ok(self.records.lock().clone())
    }

    fn save(&self, records: &[MediaRecord]) -> Result<()> {
        *self.records.lock() = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdock_common::MediaId;

    #[test]
    fn json_store_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn json_store_persists_videos_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        let record = MediaRecord::new(MediaId::from("abc"), "A", "abc.mp4", "a.mp4", 3, None);
        store.save(std::slice::from_ref(&record)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["videos"][0]["id"], "abc");

        assert_eq!(store.load().unwrap(), vec![record]);
    }

    #[test]
    fn json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::new(path).load().is_err());
    }
}
