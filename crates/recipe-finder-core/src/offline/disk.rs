use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::CacheStorageError;
use super::request::{CachedEntry, Request, Response};
use super::storage::{validate_cache_name, CacheStorage};

/// Index file inside each cache directory
const INDEX_FILE: &str = "index.json";

/// Directory holding response bodies inside each cache directory
const BODIES_DIR: &str = "bodies";

#[derive(Debug, Default, Serialize, Deserialize)]
struct DiskIndex {
    entries: Vec<DiskEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiskEntry {
    method: String,
    url: String,
    status: u16,
    #[serde(default)]
    headers: Vec<(String, String)>,
    body_file: String,
    cached_at: DateTime<Utc>,
}

/// Cache storage keeping one directory per cache under `root`.
///
/// `put_all` builds the complete new cache in a hidden staging directory
/// and renames it into place, so a failed write never leaves a partially
/// populated cache behind. Hidden directories and directories whose names
/// are not valid cache names are never reported as caches.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: PathBuf) -> Result<Self, CacheStorageError> {
        std::fs::create_dir_all(&root).map_err(|e| CacheStorageError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn staging_dir(&self, name: &str) -> PathBuf {
        self.root.join(format!(".staging-{}", name))
    }

    fn retired_dir(&self, name: &str) -> PathBuf {
        self.root.join(format!(".retired-{}", name))
    }

    async fn exists(path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    async fn read_index(&self, name: &str) -> Result<Option<DiskIndex>, CacheStorageError> {
        let path = self.cache_dir(name).join(INDEX_FILE);
        if !Self::exists(&path).await {
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CacheStorageError::io(&path, e))?;
        let index = serde_json::from_str(&contents).map_err(|e| CacheStorageError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(index))
    }

    async fn read_entry(
        &self,
        name: &str,
        entry: &DiskEntry,
    ) -> Result<CachedEntry, CacheStorageError> {
        let path = self.cache_dir(name).join(BODIES_DIR).join(&entry.body_file);
        let body = tokio::fs::read(&path)
            .await
            .map_err(|e| CacheStorageError::io(&path, e))?;

        Ok(CachedEntry {
            request: Request::new(&entry.method, &entry.url),
            response: Response {
                status: entry.status,
                headers: entry.headers.clone(),
                body,
            },
            cached_at: entry.cached_at,
        })
    }

    /// Write a complete cache directory at `dir`.
    async fn write_cache(dir: &Path, entries: &[CachedEntry]) -> Result<(), CacheStorageError> {
        let bodies = dir.join(BODIES_DIR);
        tokio::fs::create_dir_all(&bodies)
            .await
            .map_err(|e| CacheStorageError::io(&bodies, e))?;

        let mut index = DiskIndex::default();
        for (i, entry) in entries.iter().enumerate() {
            let body_file = format!("{}.bin", i);
            let body_path = bodies.join(&body_file);
            tokio::fs::write(&body_path, &entry.response.body)
                .await
                .map_err(|e| CacheStorageError::io(&body_path, e))?;

            index.entries.push(DiskEntry {
                method: entry.request.method.clone(),
                url: entry.request.url.clone(),
                status: entry.response.status,
                headers: entry.response.headers.clone(),
                body_file,
                cached_at: entry.cached_at,
            });
        }

        let index_path = dir.join(INDEX_FILE);
        let contents = serde_json::to_string_pretty(&index).map_err(|e| {
            CacheStorageError::Corrupt {
                name: dir.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        tokio::fs::write(&index_path, contents)
            .await
            .map_err(|e| CacheStorageError::io(&index_path, e))?;
        Ok(())
    }

    /// Remove a leftover hidden directory from an interrupted commit.
    async fn clear_leftover(dir: &Path) -> Result<(), CacheStorageError> {
        if Self::exists(dir).await {
            debug!(path = %dir.display(), "Removing leftover cache directory");
            tokio::fs::remove_dir_all(dir)
                .await
                .map_err(|e| CacheStorageError::io(dir, e))?;
        }
        Ok(())
    }

    /// Swap a fully written staging directory into place as cache `name`.
    async fn commit(&self, name: &str, staging: &Path) -> Result<(), CacheStorageError> {
        let target = self.cache_dir(name);
        let retired = self.retired_dir(name);

        let had_previous = Self::exists(&target).await;
        if had_previous {
            Self::clear_leftover(&retired).await?;
            tokio::fs::rename(&target, &retired)
                .await
                .map_err(|e| CacheStorageError::io(&target, e))?;
        }

        if let Err(e) = tokio::fs::rename(staging, &target).await {
            // Put the previous generation back before reporting
            if had_previous {
                if let Err(restore) = tokio::fs::rename(&retired, &target).await {
                    warn!(
                        cache = name,
                        error = %restore,
                        "Failed to restore previous cache generation"
                    );
                }
            }
            return Err(CacheStorageError::io(&target, e));
        }

        if had_previous {
            if let Err(e) = tokio::fs::remove_dir_all(&retired).await {
                warn!(cache = name, error = %e, "Failed to remove retired cache generation");
            }
        }
        Ok(())
    }

    /// Write `entries` to a staging directory and commit it as cache `name`.
    async fn write_and_commit(
        &self,
        name: &str,
        entries: &[CachedEntry],
    ) -> Result<(), CacheStorageError> {
        let staging = self.staging_dir(name);
        Self::clear_leftover(&staging).await?;

        if let Err(e) = Self::write_cache(&staging, entries).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                warn!(cache = name, error = %cleanup, "Failed to remove staging directory");
            }
            return Err(e);
        }

        self.commit(name, &staging).await?;
        debug!(cache = name, entries = entries.len(), "Committed cache");
        Ok(())
    }
}

fn stamp(entries: Vec<(Request, Response)>) -> Vec<CachedEntry> {
    let cached_at = Utc::now();
    entries
        .into_iter()
        .map(|(request, response)| CachedEntry {
            request,
            response,
            cached_at,
        })
        .collect()
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheStorageError> {
        validate_cache_name(name)?;
        if self.read_index(name).await?.is_some() {
            return Ok(());
        }
        self.put_all(name, Vec::new()).await
    }

    async fn keys(&self) -> Result<Vec<String>, CacheStorageError> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| CacheStorageError::io(&self.root, e))?;

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| CacheStorageError::io(&self.root, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if validate_cache_name(&name).is_err() {
                continue;
            }
            if Self::exists(&entry.path().join(INDEX_FILE)).await {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheStorageError> {
        validate_cache_name(name)?;
        let dir = self.cache_dir(name);
        if !Self::exists(&dir).await {
            return Ok(false);
        }
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| CacheStorageError::io(&dir, e))?;
        debug!(cache = name, "Deleted cache directory");
        Ok(true)
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheStorageError> {
        validate_cache_name(name)?;

        // Keep existing entries that the new batch does not replace
        let mut merged: Vec<CachedEntry> = Vec::new();
        if let Some(index) = self.read_index(name).await? {
            for entry in &index.entries {
                let replaced = entries
                    .iter()
                    .any(|(req, _)| req.method == entry.method && req.url == entry.url);
                if !replaced {
                    merged.push(self.read_entry(name, entry).await?);
                }
            }
        }
        merged.extend(stamp(entries));

        self.write_and_commit(name, &merged).await
    }

    async fn replace_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheStorageError> {
        validate_cache_name(name)?;
        self.write_and_commit(name, &stamp(entries)).await
    }

    async fn match_request(
        &self,
        name: &str,
        request: &Request,
    ) -> Result<Option<CachedEntry>, CacheStorageError> {
        if validate_cache_name(name).is_err() {
            return Ok(None);
        }
        let Some(index) = self.read_index(name).await? else {
            return Ok(None);
        };

        match index
            .entries
            .iter()
            .find(|e| e.method == request.method && e.url == request.url)
        {
            Some(entry) => Ok(Some(self.read_entry(name, entry).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    fn asset(url: &str, body: &str) -> (Request, Response) {
        (
            Request::get(url),
            Response::new(200, body).with_header("content-type", "text/plain"),
        )
    }

    #[tokio::test]
    async fn test_put_all_and_match() {
        let tmp = TempDir::new("disk-cache-match");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();

        storage
            .put_all(
                "recipe-finder-v1",
                vec![asset("/", "<html>"), asset("/style.css", "body{}")],
            )
            .await
            .unwrap();

        let hit = storage
            .match_request("recipe-finder-v1", &Request::get("/style.css"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.response.status, 200);
        assert_eq!(hit.response.body, b"body{}");
        assert_eq!(hit.response.header("Content-Type"), Some("text/plain"));

        assert!(storage
            .match_request("recipe-finder-v1", &Request::get("/missing.js"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let tmp = TempDir::new("disk-cache-reopen");
        {
            let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();
            storage
                .put_all("v1", vec![asset("/index.html", "<html>")])
                .await
                .unwrap();
        }

        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1".to_string()]);
        let hit = storage
            .match_request("v1", &Request::get("/index.html"))
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_put_all_merges_with_existing() {
        let tmp = TempDir::new("disk-cache-merge");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();

        storage
            .put_all("v1", vec![asset("/a", "old a"), asset("/b", "b")])
            .await
            .unwrap();
        storage
            .put_all("v1", vec![asset("/a", "new a")])
            .await
            .unwrap();

        let a = storage
            .match_request("v1", &Request::get("/a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.response.body, b"new a");
        assert!(storage
            .match_request("v1", &Request::get("/b"))
            .await
            .unwrap()
            .is_some());
        assert_eq!(storage.keys().await.unwrap(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_replace_all_drops_old_entries() {
        let tmp = TempDir::new("disk-cache-replace");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();

        storage
            .put_all("v1", vec![asset("/a", "a"), asset("/b", "b")])
            .await
            .unwrap();
        storage
            .replace_all("v1", vec![asset("/a", "new a")])
            .await
            .unwrap();

        assert!(storage
            .match_request("v1", &Request::get("/b"))
            .await
            .unwrap()
            .is_none());
        let a = storage
            .match_request("v1", &Request::get("/a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.response.body, b"new a");
    }

    #[tokio::test]
    async fn test_leftover_retired_dir_does_not_block_commits() {
        let tmp = TempDir::new("disk-cache-retired");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();
        storage.put_all("v1", vec![asset("/", "one")]).await.unwrap();

        // An interrupted commit left the previous generation behind
        let leftover = tmp.path().join(".retired-v1").join(BODIES_DIR);
        std::fs::create_dir_all(&leftover).unwrap();
        std::fs::write(leftover.join("0.bin"), "stale").unwrap();

        storage.put_all("v1", vec![asset("/", "two")]).await.unwrap();
        storage.put_all("v1", vec![asset("/", "three")]).await.unwrap();

        let hit = storage
            .match_request("v1", &Request::get("/"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.response.body, b"three");
        assert!(!tmp.path().join(".retired-v1").exists());
    }

    #[tokio::test]
    async fn test_keys_skip_invalid_names() {
        let tmp = TempDir::new("disk-cache-invalid");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();
        storage.open("v1").await.unwrap();

        let stray = tmp.path().join("old cache");
        std::fs::create_dir_all(&stray).unwrap();
        std::fs::write(stray.join(INDEX_FILE), r#"{"entries":[]}"#).unwrap();

        let keys = storage.keys().await.unwrap();
        assert_eq!(keys, vec!["v1".to_string()]);
        for name in keys {
            storage.delete(&name).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_open_keys_delete() {
        let tmp = TempDir::new("disk-cache-keys");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();

        storage.open("v2").await.unwrap();
        storage.open("v1").await.unwrap();
        // Leftover staging directories are not caches
        std::fs::create_dir_all(tmp.path().join(".staging-v3")).unwrap();

        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["v1".to_string(), "v2".to_string()]
        );
        assert!(storage.has("v2").await.unwrap());

        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_index_is_reported() {
        let tmp = TempDir::new("disk-cache-corrupt");
        let storage = DiskCacheStorage::new(tmp.path().to_path_buf()).unwrap();
        std::fs::create_dir_all(tmp.path().join("v1")).unwrap();
        std::fs::write(tmp.path().join("v1").join(INDEX_FILE), "not json").unwrap();

        let err = storage
            .match_request("v1", &Request::get("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheStorageError::Corrupt { .. }));
    }
}
