use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::error::{AssetFailure, OfflineError};
use super::manifest::Manifest;
use super::network::Network;
use super::request::{Request, Response};
use super::storage::CacheStorage;

/// Maximum manifest assets fetched at once during install.
const MAX_CONCURRENT_FETCHES: usize = 4;

/// Where the manager is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, nothing attempted yet
    Parked,
    Installing,
    /// Every manifest asset is cached, waiting for activation
    Installed,
    Activating,
    /// Current version; requests are answered from the cache
    Activated,
    /// An install failed with no earlier version to fall back on; a later
    /// install may retry
    Redundant,
}

/// External events the manager reacts to.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Install,
    Activate,
    Fetch(Request),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    pub assets: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Stale cache names removed during activation
    pub deleted: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache { cached_at: DateTime<Utc> },
    Network,
}

/// A response produced by `intercept`, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercepted {
    pub response: Response,
    pub source: ResponseSource,
}

impl Intercepted {
    pub fn from_cache(&self) -> bool {
        matches!(self.source, ResponseSource::Cache { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Responded(Intercepted),
}

pub struct OfflineCacheManager<C, N> {
    manifest: Manifest,
    storage: C,
    network: N,
    state: LifecycleState,
}

impl<C: CacheStorage, N: Network> OfflineCacheManager<C, N> {
    pub fn new(manifest: Manifest, storage: C, network: N) -> Self {
        Self {
            manifest,
            storage,
            network,
            state: LifecycleState::Parked,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Name of the current cache version.
    pub fn cache_name(&self) -> &str {
        &self.manifest.version
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn storage(&self) -> &C {
        &self.storage
    }

    /// Resume as the active version when its cache survives from an
    /// earlier run. Returns whether the manager is now activated.
    pub async fn restore(&mut self) -> Result<bool, OfflineError> {
        if self.storage.has(&self.manifest.version).await? {
            self.state = LifecycleState::Activated;
            debug!(cache = %self.manifest.version, "Restored active cache");
            return Ok(true);
        }
        Ok(false)
    }

    /// Route a lifecycle event to its handler.
    pub async fn handle_event(
        &mut self,
        event: LifecycleEvent,
    ) -> Result<LifecycleOutcome, OfflineError> {
        match event {
            LifecycleEvent::Install => self.install().await.map(LifecycleOutcome::Installed),
            LifecycleEvent::Activate => self.activate().await.map(LifecycleOutcome::Activated),
            LifecycleEvent::Fetch(request) => {
                self.intercept(&request).await.map(LifecycleOutcome::Responded)
            }
        }
    }

    /// Fetch every manifest asset and commit them as the current version.
    ///
    /// A transport error or non-success status for any asset fails the
    /// whole install and commits nothing. A cache that was already installed
    /// or active keeps serving after a failed reinstall.
    pub async fn install(&mut self) -> Result<InstallReport, OfflineError> {
        let previous = self.state;
        self.state = LifecycleState::Installing;
        info!(
            cache = %self.manifest.version,
            assets = self.manifest.assets.len(),
            "Installing offline cache"
        );

        let network = &self.network;
        let results: Vec<(Request, Result<Response, String>)> =
            stream::iter(self.manifest.assets.iter().map(|url| Request::get(url)))
                .map(|request| async move {
                    let result = match network.fetch(&request).await {
                        Ok(response) if response.is_success() => Ok(response),
                        Ok(response) => Err(format!("status {}", response.status)),
                        Err(e) => Err(e.to_string()),
                    };
                    (request, result)
                })
                .buffered(MAX_CONCURRENT_FETCHES)
                .collect()
                .await;

        let mut entries = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (request, result) in results {
            match result {
                Ok(response) => entries.push((request, response)),
                Err(reason) => failures.push(AssetFailure {
                    url: request.url,
                    reason,
                }),
            }
        }

        if !failures.is_empty() {
            self.state = Self::state_after_failed_install(previous);
            warn!(
                cache = %self.manifest.version,
                failed = failures.len(),
                "Offline cache install failed"
            );
            return Err(OfflineError::InstallIncomplete {
                version: self.manifest.version.clone(),
                failures,
            });
        }

        let bytes = entries.iter().map(|(_, r)| r.body.len()).sum();
        let assets = entries.len();

        if let Err(e) = self
            .storage
            .replace_all(&self.manifest.version, entries)
            .await
        {
            self.state = Self::state_after_failed_install(previous);
            return Err(e.into());
        }

        self.state = LifecycleState::Installed;
        info!(cache = %self.manifest.version, assets, bytes, "Offline cache installed");
        Ok(InstallReport {
            cache_name: self.manifest.version.clone(),
            assets,
            bytes,
        })
    }

    fn state_after_failed_install(previous: LifecycleState) -> LifecycleState {
        match previous {
            LifecycleState::Installed | LifecycleState::Activated => previous,
            _ => LifecycleState::Redundant,
        }
    }

    /// Delete every cache other than the current version and take over.
    pub async fn activate(&mut self) -> Result<ActivateReport, OfflineError> {
        if !matches!(
            self.state,
            LifecycleState::Installed | LifecycleState::Activated
        ) {
            return Err(OfflineError::NotInstalled(self.manifest.version.clone()));
        }

        let previous = self.state;
        self.state = LifecycleState::Activating;

        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                self.state = previous;
                return Err(e.into());
            }
        };

        if !names.iter().any(|n| *n == self.manifest.version) {
            self.state = LifecycleState::Redundant;
            return Err(OfflineError::NotInstalled(self.manifest.version.clone()));
        }

        let mut deleted = Vec::new();
        for name in names.into_iter().filter(|n| *n != self.manifest.version) {
            match self.storage.delete(&name).await {
                Ok(_) => {
                    debug!(cache = %name, "Deleted stale cache");
                    deleted.push(name);
                }
                Err(e) => {
                    self.state = previous;
                    return Err(e.into());
                }
            }
        }

        self.state = LifecycleState::Activated;
        info!(
            cache = %self.manifest.version,
            deleted = deleted.len(),
            "Offline cache activated"
        );
        Ok(ActivateReport {
            cache_name: self.manifest.version.clone(),
            deleted,
        })
    }

    /// Answer `request` from the current cache, or forward it to the network.
    ///
    /// Network responses are returned unchanged and never cached. Until the
    /// manager is activated every request goes to the network.
    pub async fn intercept(&self, request: &Request) -> Result<Intercepted, OfflineError> {
        if self.state == LifecycleState::Activated {
            match self
                .storage
                .match_request(&self.manifest.version, request)
                .await
            {
                Ok(Some(entry)) => {
                    debug!(url = %request.url, "Served from offline cache");
                    return Ok(Intercepted {
                        response: entry.response,
                        source: ResponseSource::Cache {
                            cached_at: entry.cached_at,
                        },
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, url = %request.url, "Cache lookup failed, using network");
                }
            }
        }

        let response = self.network.fetch(request).await?;
        Ok(Intercepted {
            response,
            source: ResponseSource::Network,
        })
    }
}
