//! Key-value persistence for small JSON documents.
//!
//! `KeyValueStore` is the capability the favorites store and the theme
//! preference are built on. It mirrors browser local storage: string keys,
//! string values, whole-value reads and writes.
//!
//! - `FileStore`: one file per key inside the data directory
//! - `MemoryStore`: in-process map for tests, with an optional quota

pub mod error;
pub mod file;
pub mod memory;

use std::sync::Arc;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if it was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key` in a single write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Keys become file names, so only a conservative character set is allowed.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
