use async_trait::async_trait;

use super::error::CacheStorageError;
use super::request::{CachedEntry, Request, Response};

/// A set of named caches, each mapping requests to stored responses.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the cache `name` if it does not exist yet.
    async fn open(&self, name: &str) -> Result<(), CacheStorageError>;

    /// Names of every existing cache.
    async fn keys(&self) -> Result<Vec<String>, CacheStorageError>;

    async fn has(&self, name: &str) -> Result<bool, CacheStorageError> {
        Ok(self.keys().await?.iter().any(|k| k == name))
    }

    /// Delete the cache `name`. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, CacheStorageError>;

    /// Store every entry in cache `name` as a single commit, creating the
    /// cache if needed. On error no entry from this call is visible.
    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheStorageError>;

    /// Make `entries` the whole content of cache `name` as a single commit.
    /// On error the previous content of `name` is left untouched.
    async fn replace_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheStorageError>;

    /// Exact (method, url) lookup in cache `name`.
    async fn match_request(
        &self,
        name: &str,
        request: &Request,
    ) -> Result<Option<CachedEntry>, CacheStorageError>;
}

/// Cache names become directory names on disk.
pub(crate) fn validate_cache_name(name: &str) -> Result<(), CacheStorageError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CacheStorageError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cache_name() {
        assert!(validate_cache_name("recipe-finder-v1").is_ok());
        assert!(validate_cache_name("assets_2.0").is_ok());
        assert!(validate_cache_name("").is_err());
        assert!(validate_cache_name(".staging").is_err());
        assert!(validate_cache_name("a/b").is_err());
    }
}
