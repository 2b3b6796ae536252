//! Bounded, persisted history of readings.
//!
//! The history is an oldest-first array of `{date, value}` entries kept in a
//! single named slot. Appending past capacity evicts from the front.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::codec::LogCodec;
use crate::constants::{HISTORY_CAPACITY, STORAGE_KEY};
use crate::error::{EncodeError, StorageError};
use crate::reading::Reading;

/// Where the history slot lives
pub trait HistoryStorage {
    /// Read the whole slot; an absent slot is an empty history
    ///
    /// # Errors
    /// Returns an error if the slot exists but cannot be read or parsed.
    fn load(&self) -> Result<Vec<Reading>, StorageError>;

    /// Replace the whole slot
    ///
    /// # Errors
    /// Returns an error if the slot cannot be written.
    fn save(&mut self, readings: &[Reading]) -> Result<(), StorageError>;

    /// Exclusive access to the slot across processes, held until dropped.
    ///
    /// Storage private to one process needs none.
    ///
    /// # Errors
    /// Returns an error if the lock cannot be taken.
    fn lock_slot(&self) -> Result<SlotLock, StorageError> {
        Ok(SlotLock::default())
    }
}

/// Guard returned by [`HistoryStorage::lock_slot`]
#[derive(Debug, Default)]
pub struct SlotLock {
    _file: Option<File>,
}

/// Storage that lives as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    readings: Vec<Reading>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Reading>, StorageError> {
        Ok(self.readings.clone())
    }

    fn save(&mut self, readings: &[Reading]) -> Result<(), StorageError> {
        self.readings = readings.to_vec();
        Ok(())
    }
}

/// Storage backed by one JSON file holding the history array
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage using the default slot name inside `dir`
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn create_parent(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
        }
        Ok(())
    }

    fn unavailable(&self, source: std::io::Error) -> StorageError {
        StorageError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Reading>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.unavailable(e)),
        };
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        // One unreadable entry costs that entry only
        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                Ok(reading) => Some(reading),
                Err(e) => {
                    warn!("skipping history entry {i} in {}: {e}", self.path.display());
                    None
                }
            })
            .collect())
    }

    fn save(&mut self, readings: &[Reading]) -> Result<(), StorageError> {
        self.create_parent()?;
        let content = serde_json::to_string(readings).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Replace through a rename so readers never see a half-written slot
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.unavailable(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.unavailable(e))
    }

    fn lock_slot(&self) -> Result<SlotLock, StorageError> {
        self.create_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.unavailable(e))?;
        file.lock().map_err(|e| self.unavailable(e))?;
        Ok(SlotLock { _file: Some(file) })
    }
}

struct Inner<S> {
    storage: S,
    /// Last history seen; serves reads while the storage is unavailable
    cache: Vec<Reading>,
}

/// Append-only history capped at a fixed number of readings.
///
/// Every append is a single read-modify-write of the slot under the store's
/// mutex and the storage's slot lock, so concurrent appends never lose
/// updates: from threads sharing one store, or from separate stores and
/// processes sharing one [`JsonFileStorage`] file. A custom
/// [`HistoryStorage`] shared across processes must provide its own
/// [`HistoryStorage::lock_slot`].
///
/// A slot that exists but cannot be parsed is never overwritten by an
/// append; only [`HistoryStore::clear`] replaces it.
pub struct HistoryStore<S: HistoryStorage> {
    inner: Mutex<Inner<S>>,
    capacity: usize,
}

impl<S: HistoryStorage> HistoryStore<S> {
    /// Open the store with the default capacity of 120 readings.
    ///
    /// Never fails: unreadable storage starts the history empty.
    pub fn open(storage: S) -> Self {
        Self::with_capacity(storage, HISTORY_CAPACITY)
    }

    /// Open the store keeping at most `capacity` readings (at least one)
    pub fn with_capacity(storage: S, capacity: usize) -> Self {
        let cache = storage.load().unwrap_or_else(|e| {
            warn!("starting with an empty history: {e}");
            Vec::new()
        });
        Self {
            inner: Mutex::new(Inner { storage, cache }),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict(&self, history: &mut Vec<Reading>) {
        if history.len() > self.capacity {
            let evicted = history.len() - self.capacity;
            history.drain(..evicted);
            debug!("evicted {evicted} oldest readings");
        }
    }

    /// Append a reading, evicting the oldest ones beyond capacity.
    ///
    /// # Errors
    /// Returns an error if the slot cannot be read or written. The reading is
    /// still kept in memory for the life of the store.
    pub fn append(&self, reading: Reading) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let _slot = inner
            .storage
            .lock_slot()
            .map_err(|e| warn!("appending without the slot lock: {e}"))
            .ok();

        let mut history = match inner.storage.load() {
            Ok(history) => history,
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!("history slot unparseable, keeping it and appending in memory: {e}");
                inner.cache.push(reading);
                self.evict(&mut inner.cache);
                return Err(e);
            }
            Err(e) => {
                warn!("history storage unreadable, appending to in-memory copy: {e}");
                std::mem::take(&mut inner.cache)
            }
        };

        history.push(reading);
        self.evict(&mut history);

        let saved = inner.storage.save(&history);
        inner.cache = history;
        saved
    }

    /// All readings, oldest first
    #[must_use]
    pub fn read_all(&self) -> Vec<Reading> {
        let mut inner = self.lock();
        match inner.storage.load() {
            Ok(history) => {
                inner.cache.clone_from(&history);
                history
            }
            Err(e) => {
                warn!("history storage unreadable, serving in-memory copy: {e}");
                inner.cache.clone()
            }
        }
    }

    /// All readings, newest first, the order they are listed in
    #[must_use]
    pub fn read_newest_first(&self) -> Vec<Reading> {
        let mut history = self.read_all();
        history.reverse();
        history
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every reading
    ///
    /// # Errors
    /// Returns an error if the slot cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let _slot = inner.storage.lock_slot()?;
        inner.cache.clear();
        inner.storage.save(&[])
    }

    /// Encode the whole history into a dashboard link
    ///
    /// # Errors
    /// See [`LogCodec::encode`].
    pub fn export_url(&self, codec: &LogCodec, origin: &str) -> Result<String, EncodeError> {
        codec.export_url(origin, &self.read_all())
    }

    /// Give back the underlying storage
    pub fn into_storage(self) -> S {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .storage
    }
}
