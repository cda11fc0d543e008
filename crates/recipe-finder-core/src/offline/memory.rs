use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::error::CacheStorageError;
use super::request::{CachedEntry, Request, Response};
use super::storage::{validate_cache_name, CacheStorage};

type Cache = HashMap<String, CachedEntry>;

/// Cache storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<BTreeMap<String, Cache>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in cache `name`, or `None` if it does not exist.
    pub async fn len(&self, name: &str) -> Option<usize> {
        self.caches.read().await.get(name).map(|c| c.len())
    }
}

fn into_cache(
    entries: Vec<(Request, Response)>,
) -> impl Iterator<Item = (String, CachedEntry)> {
    let cached_at = Utc::now();
    entries.into_iter().map(move |(request, response)| {
        (
            request.cache_key(),
            CachedEntry {
                request,
                response,
                cached_at,
            },
        )
    })
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheStorageError> {
        validate_cache_name(name)?;
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheStorageError> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheStorageError> {
        Ok(self.caches.write().await.remove(name).is_some())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheStorageError> {
        validate_cache_name(name)?;
        let mut caches = self.caches.write().await;
        caches
            .entry(name.to_string())
            .or_default()
            .extend(into_cache(entries));
        Ok(())
    }

    async fn replace_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheStorageError> {
        validate_cache_name(name)?;
        let cache = into_cache(entries).collect();
        self.caches.write().await.insert(name.to_string(), cache);
        Ok(())
    }

    async fn match_request(
        &self,
        name: &str,
        request: &Request,
    ) -> Result<Option<CachedEntry>, CacheStorageError> {
        Ok(self
            .caches
            .read()
            .await
            .get(name)
            .and_then(|cache| cache.get(&request.cache_key()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let storage = MemoryCacheStorage::new();
        storage.open("v1").await.unwrap();
        storage
            .put_all("v1", vec![(Request::get("/"), Response::new(200, "home"))])
            .await
            .unwrap();
        storage.open("v1").await.unwrap();
        assert_eq!(storage.len("v1").await, Some(1));
    }

    #[tokio::test]
    async fn test_replace_all_drops_old_entries() {
        let storage = MemoryCacheStorage::new();
        storage
            .put_all(
                "v1",
                vec![
                    (Request::get("/"), Response::new(200, "home")),
                    (Request::get("/old.js"), Response::new(200, "old")),
                ],
            )
            .await
            .unwrap();
        storage
            .replace_all("v1", vec![(Request::get("/"), Response::new(200, "new home"))])
            .await
            .unwrap();

        assert_eq!(storage.len("v1").await, Some(1));
        assert!(storage
            .match_request("v1", &Request::get("/old.js"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_put_match_delete() {
        let storage = MemoryCacheStorage::new();
        storage
            .put_all(
                "v1",
                vec![(Request::get("/style.css"), Response::new(200, "body{}"))],
            )
            .await
            .unwrap();

        let hit = storage
            .match_request("v1", &Request::get("/style.css"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.response.body, b"body{}");

        assert!(storage
            .match_request("v1", &Request::new("POST", "/style.css"))
            .await
            .unwrap()
            .is_none());
        assert!(storage
            .match_request("v2", &Request::get("/style.css"))
            .await
            .unwrap()
            .is_none());

        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
