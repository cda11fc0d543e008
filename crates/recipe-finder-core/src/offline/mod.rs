//! Versioned offline cache for the application's static assets.
//!
//! The `OfflineCacheManager` follows a service-worker style lifecycle:
//!
//! 1. **install**: fetch every asset in the `Manifest` and commit them as one
//!    cache named after the manifest version. Any failed asset fails the
//!    whole install and nothing is committed.
//! 2. **activate**: delete every cache whose name is not the current version.
//! 3. **intercept**: answer requests from the current cache when an exact
//!    (method, url) entry exists, otherwise forward them to the network.
//!    Network responses are never added to the cache.
//!
//! Cache storage and the network are injected through the `CacheStorage`
//! and `Network` traits so the lifecycle can run against in-memory fakes.

pub mod disk;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod memory;
pub mod network;
pub mod request;
pub mod storage;

pub use disk::DiskCacheStorage;
pub use error::{AssetFailure, CacheStorageError, NetworkError, OfflineError};
pub use manager::{
    ActivateReport, InstallReport, Intercepted, LifecycleEvent, LifecycleOutcome, LifecycleState,
    OfflineCacheManager, ResponseSource,
};
pub use manifest::{Manifest, CACHE_VERSION, DEFAULT_ASSETS};
pub use memory::MemoryCacheStorage;
pub use network::{HttpNetwork, Network};
pub use request::{CachedEntry, Request, Response};
pub use storage::CacheStorage;
