//! Non-interactive commands for the offline asset cache.
//!
//! `--install-assets` installs and activates the current cache version
//! against the configured asset origin. `--fetch <path>` routes one request
//! through the interceptor and reports where the response came from.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use recipe_finder_core::offline::{
    CacheStorage, DiskCacheStorage, HttpNetwork, Intercepted, LifecycleEvent, LifecycleOutcome,
    Network, OfflineCacheManager, Request, ResponseSource,
};
use recipe_finder_core::utils::{age_display, bytes_display};
use recipe_finder_core::Config;

pub fn print_usage() {
    println!("Usage: recipe-finder [--install-assets | --fetch <path>]");
    println!();
    println!("  (no arguments)     Start the terminal UI");
    println!("  --install-assets   Cache the web assets for offline use");
    println!("  --fetch <path>     Fetch one asset through the offline cache");
}

async fn open_manager(config: &Config) -> Result<OfflineCacheManager<DiskCacheStorage, HttpNetwork>> {
    let dir = config.offline_dir()?;
    let storage = DiskCacheStorage::new(dir.clone())
        .with_context(|| format!("Failed to open offline cache at {}", dir.display()))?;
    let network = HttpNetwork::new(&config.asset_origin)?;
    Ok(OfflineCacheManager::new(config.manifest(), storage, network))
}

pub async fn install_assets(config: &Config) -> Result<()> {
    let mut manager = open_manager(config).await?;
    println!(
        "Installing {} assets from {}...",
        manager.manifest().assets.len(),
        config.asset_origin
    );
    for line in run_install(&mut manager).await? {
        println!("{}", line);
    }
    Ok(())
}

pub async fn fetch(config: &Config, path: &str) -> Result<()> {
    let mut manager = open_manager(config).await?;
    println!("{}", run_fetch(&mut manager, path).await?);
    Ok(())
}

/// Install then activate, returning the report lines.
pub(crate) async fn run_install<C: CacheStorage, N: Network>(
    manager: &mut OfflineCacheManager<C, N>,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    if let LifecycleOutcome::Installed(report) = manager.handle_event(LifecycleEvent::Install).await? {
        info!(cache = %report.cache_name, assets = report.assets, "Installed offline assets");
        lines.push(format!(
            "Installed {}: {} assets, {}",
            report.cache_name,
            report.assets,
            bytes_display(report.bytes)
        ));
    }

    if let LifecycleOutcome::Activated(report) = manager.handle_event(LifecycleEvent::Activate).await? {
        if report.deleted.is_empty() {
            lines.push(format!("Activated {}", report.cache_name));
        } else {
            lines.push(format!(
                "Activated {}, removed old caches: {}",
                report.cache_name,
                report.deleted.join(", ")
            ));
        }
    }

    Ok(lines)
}

/// Resume the active cache if present and route one GET through it.
pub(crate) async fn run_fetch<C: CacheStorage, N: Network>(
    manager: &mut OfflineCacheManager<C, N>,
    path: &str,
) -> Result<String> {
    manager.restore().await?;

    match manager
        .handle_event(LifecycleEvent::Fetch(Request::get(path)))
        .await?
    {
        LifecycleOutcome::Responded(intercepted) => Ok(describe_response(path, &intercepted)),
        other => anyhow::bail!("Unexpected lifecycle outcome: {:?}", other),
    }
}

fn describe_response(path: &str, intercepted: &Intercepted) -> String {
    let source = match intercepted.source {
        ResponseSource::Cache { cached_at } => {
            format!("cache (cached {})", age_display(cached_at, Utc::now()))
        }
        ResponseSource::Network => "network".to_string(),
    };
    format!(
        "{} -> {} from {}, {}",
        path,
        intercepted.response.status,
        source,
        bytes_display(intercepted.response.body.len())
    )
}
