//! String key-value persistence.
//!
//! Records live under `"{prefix}-{id}"`; the index of a prefix lives under
//! the bare prefix as a JSON array of reduced entries.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::StorageError;

/// Synchronous string-keyed store holding JSON text.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Index entries identify the record they summarize.
pub trait IndexEntry {
    fn entry_id(&self) -> &str;
}

impl IndexEntry for jogdeck_common::ProgramIndexItem {
    fn entry_id(&self) -> &str {
        &self.id
    }
}

fn record_key(prefix: &str, id: &str) -> String {
    format!("{prefix}-{id}")
}

fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Load the record `id` under `prefix`.
pub fn get_item<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    prefix: &str,
    id: &str,
) -> Result<Option<T>, StorageError> {
    read_json(store, &record_key(prefix, id))
}

/// Upsert `item` and its reduced index entry, then re-sort the index.
pub fn set_item<T, E>(
    store: &dyn KeyValueStore,
    prefix: &str,
    item: &T,
    reduce: impl Fn(&T) -> E,
    sort: impl FnMut(&E, &E) -> Ordering,
) -> Result<(), StorageError>
where
    T: Serialize,
    E: IndexEntry + Serialize + DeserializeOwned,
{
    let entry = reduce(item);
    let id = entry.entry_id().to_owned();
    store.set(&record_key(prefix, &id), &serde_json::to_string(item)?)?;

    let mut index: Vec<E> = list_items(store, prefix)?;
    match index.iter().position(|existing| existing.entry_id() == id) {
        Some(position) => index[position] = entry,
        None => index.push(entry),
    }
    index.sort_by(sort);

    store.set(prefix, &serde_json::to_string(&index)?)?;
    debug!("[storage] stored {}-{} ({} indexed)", prefix, id, index.len());
    Ok(())
}

/// Remove the record `id` and its index entry.
pub fn remove_item<E>(store: &dyn KeyValueStore, prefix: &str, id: &str) -> Result<(), StorageError>
where
    E: IndexEntry + Serialize + DeserializeOwned,
{
    store.remove(&record_key(prefix, id))?;

    let mut index: Vec<E> = list_items(store, prefix)?;
    index.retain(|entry| entry.entry_id() != id);
    store.set(prefix, &serde_json::to_string(&index)?)?;
    debug!("[storage] removed {}-{}", prefix, id);
    Ok(())
}

/// The index of `prefix`, empty if none was written yet.
pub fn list_items<E: DeserializeOwned>(
    store: &dyn KeyValueStore,
    prefix: &str,
) -> Result<Vec<E>, StorageError> {
    Ok(read_json(store, prefix)?.unwrap_or_default())
}

/// In-memory store, mainly for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, value)?;
        std::fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
