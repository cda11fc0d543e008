use std::path::{Path, PathBuf};

use tracing::debug;

use super::{validate_key, KeyValueStore, StorageError};

/// Key-value store keeping one `<key>.json` file per key.
///
/// Writes land in a hidden temporary file first and are renamed over the
/// target, so readers see either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Unavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", key))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| StorageError::io(key, e))?;
        Ok(Some(contents))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let staging = self.staging_path(key);
        std::fs::write(&staging, value).map_err(|e| StorageError::io(key, e))?;
        std::fs::rename(&staging, self.item_path(key)).map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            StorageError::io(key, e)
        })?;
        debug!(key, bytes = value.len(), "Stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.item_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| StorageError::io(key, e))?;
        }
        Ok(())
    }
}
