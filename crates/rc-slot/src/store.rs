//! Claimed-flag persistence
//!
//! The only persisted state is one boolean: has this player claimed the
//! reward. It lives under [`CLAIMED_KEY`] in a key/value store; absence means
//! not claimed.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreError;

/// Key of the claimed flag
pub const CLAIMED_KEY: &str = "slot.claimed";

/// Value stored when claimed
const CLAIMED_VALUE: &str = "1";

/// Durable key/value storage for the claimed flag
pub trait ClaimStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn clear(&self, key: &str) -> Result<(), StoreError>;

    /// Is the claimed flag present?
    fn is_claimed(&self) -> Result<bool, StoreError> {
        Ok(self.get(CLAIMED_KEY)?.as_deref() == Some(CLAIMED_VALUE))
    }

    fn mark_claimed(&self) -> Result<(), StoreError> {
        self.set(CLAIMED_KEY, CLAIMED_VALUE)
    }

    fn clear_claimed(&self) -> Result<(), StoreError> {
        self.clear(CLAIMED_KEY)
    }
}

impl<T: ClaimStore + ?Sized> ClaimStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        (**self).clear(key)
    }
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out claimed
    pub fn claimed() -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .insert(CLAIMED_KEY.to_string(), CLAIMED_VALUE.to_string());
        store
    }
}

impl ClaimStore for MemoryClaimStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// JSON file store; a missing file is an empty store
#[derive(Debug)]
pub struct FileClaimStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileClaimStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        // Write-then-rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut values = self.read()?;
        f(&mut values);
        self.write(&values)
    }
}

impl ClaimStore for FileClaimStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_flag() {
        let store = MemoryClaimStore::new();
        assert!(!store.is_claimed().unwrap());

        store.mark_claimed().unwrap();
        assert!(store.is_claimed().unwrap());
        assert_eq!(store.get(CLAIMED_KEY).unwrap().as_deref(), Some("1"));

        store.clear_claimed().unwrap();
        assert!(!store.is_claimed().unwrap());
        assert!(MemoryClaimStore::claimed().is_claimed().unwrap());
    }

    #[test]
    fn test_other_values_are_not_claimed() {
        let store = MemoryClaimStore::new();
        store.set(CLAIMED_KEY, "0").unwrap();
        assert!(!store.is_claimed().unwrap());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("claim.json");

        let store = FileClaimStore::new(&path);
        assert!(!store.is_claimed().unwrap());
        store.mark_claimed().unwrap();
        store.set("other", "kept").unwrap();

        let reopened = FileClaimStore::new(&path);
        assert!(reopened.is_claimed().unwrap());

        reopened.clear_claimed().unwrap();
        assert!(!FileClaimStore::new(&path).is_claimed().unwrap());
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claim.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileClaimStore::new(&path);
        assert!(matches!(store.is_claimed(), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_shared_store() {
        let store = Arc::new(MemoryClaimStore::new());
        let shared: Box<dyn ClaimStore> = Box::new(Arc::clone(&store));
        shared.mark_claimed().unwrap();
        assert!(store.is_claimed().unwrap());
    }
}
