//! Media catalog.
//!
//! Holds the record list in memory behind a single mutex and writes through to
//! a [`CatalogStore`] on every mutation. Records whose backing file has
//! vanished are dropped by [`Catalog::reconcile`], which [`Catalog::list`]
//! runs before returning.

mod record;
mod store;

pub use record::MediaRecord;
pub use store::{CatalogStore, JsonFileStore, MemoryStore};

use clipdock_common::{Error, MediaId, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Outcome of a reconcile pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub kept: Vec<MediaRecord>,
    pub removed: Vec<MediaRecord>,
}

pub struct Catalog {
    media_dir: PathBuf,
    store: Box<dyn CatalogStore>,
    records: Mutex<Vec<MediaRecord>>,
}

impl Catalog {
    /// Open a catalog, loading the persisted records from `store`.
    pub fn open(media_dir: impl Into<PathBuf>, store: Box<dyn CatalogStore>) -> Result<Self> {
        let records = store.load()?;
        let media_dir = media_dir.into();
        tracing::debug!(
            "Loaded {} catalog records (media dir {:?})",
            records.len(),
            media_dir
        );
        Ok(Self {
            media_dir,
            store,
            records: Mutex::new(records),
        })
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Path of the file backing `record`.
    pub fn path_for(&self, record: &MediaRecord) -> PathBuf {
        self.media_dir.join(&record.filename)
    }

    pub fn file_exists(&self, record: &MediaRecord) -> bool {
        self.path_for(record).exists()
    }

    /// All records, newest first, after pruning records with missing files.
    pub fn list(&self) -> Vec<MediaRecord> {
        self.reconcile().kept
    }

    /// Drop every record whose backing file is absent.
    ///
    /// Persists only when something was removed. A persistence failure is
    /// logged; the in-memory list is pruned regardless.
    pub fn reconcile(&self) -> Reconciled {
        let mut records = self.records.lock();

        let (kept, removed): (Vec<_>, Vec<_>) = records
            .drain(..)
            .partition(|record| self.file_exists(record));
        *records = kept.clone();

        if !removed.is_empty() {
            for record in &removed {
                tracing::info!(
                    "Pruning catalog record {} ({}): backing file missing",
                    record.id,
                    record.filename
                );
            }
            if let Err(e) = self.store.save(&records) {
                tracing::error!("Failed to persist pruned catalog: {}", e);
            }
        }

        Reconciled { kept, removed }
    }

    /// Look up a record by id.
    pub fn find(&self, id: &MediaId) -> Result<MediaRecord> {
        self.records
            .lock()
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("video", id))
    }

    /// Add a record at the front of the list and persist.
    pub fn insert(&self, record: MediaRecord) -> Result<()> {
        let mut records = self.records.lock();
        if records.iter().any(|r| r.filename == record.filename) {
            return Err(Error::validation(format!(
                "Storage filename already cataloged: {}",
                record.filename
            )));
        }
        records.insert(0, record);
        if let Err(e) = self.store.save(&records) {
            records.remove(0);
            return Err(e);
        }
        Ok(())
    }

    /// Remove a record and try to delete its backing file.
    ///
    /// File deletion and persistence failures are logged and swallowed; the
    /// record is removed either way, like a reconcile pass.
    pub fn remove(&self, id: &MediaId) -> Result<MediaRecord> {
        let mut records = self.records.lock();
        let idx = records
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| Error::not_found("video", id))?;
        let record = records.remove(idx);

        let path = self.path_for(&record);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!("Failed to delete media file {:?}: {}", path, e);
        }

        if let Err(e) = self.store.save(&records) {
            tracing::error!("Failed to persist catalog after removing {}: {}", record.id, e);
        }
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
