use std::collections::HashMap;
use std::sync::RwLock;

use super::{validate_key, KeyValueStore, StorageError};

/// In-memory key-value store.
///
/// An optional quota caps the total bytes of keys plus values, so tests can
/// exercise the quota-exceeded path. A store built with `unavailable()`
/// rejects every operation, like storage disabled by the user.
#[derive(Debug)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    available: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota: None,
            available: true,
        }
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::new()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Seed a value, bypassing quota checks.
    pub fn with_item(self, key: &str, value: &str) -> Self {
        if let Ok(mut items) = self.items.write() {
            items.insert(key.to_string(), value.to_string());
        }
        self
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable("storage is disabled".to_string()))
        }
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("memory store lock poisoned".to_string())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        validate_key(key)?;
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        validate_key(key)?;
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;

        if let Some(limit) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        validate_key(key)?;
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items.remove(key);
        Ok(())
    }
}
