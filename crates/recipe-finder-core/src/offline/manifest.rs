use serde::{Deserialize, Serialize};

/// Name of the current asset cache generation.
/// Bump the suffix whenever the asset list or the deployed assets change.
pub const CACHE_VERSION: &str = "recipe-finder-v1";

/// Assets cached at install: the page root, both HTML entry points, the
/// stylesheet and every script the pages load.
pub const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/favorites.html",
    "/style.css",
    "/script.js",
    "/favorites.js",
    "/config.js",
];

/// The explicit list of assets making up one cache version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub assets: Vec<String>,
}

impl Manifest {
    pub fn new(version: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            version: version.into(),
            assets,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.assets.iter().any(|a| a == url)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}
