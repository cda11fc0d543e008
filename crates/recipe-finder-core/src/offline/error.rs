use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Network unreachable: {0}")]
    Unreachable(String),
}

#[derive(Error, Debug)]
pub enum CacheStorageError {
    #[error("Invalid cache name: {0:?}")]
    InvalidName(String),

    #[error("Cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache '{name}' is corrupt: {reason}")]
    Corrupt { name: String, reason: String },
}

impl CacheStorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheStorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One manifest asset that could not be fetched during install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub url: String,
    pub reason: String,
}

impl fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum OfflineError {
    #[error("Install of '{version}' incomplete: {} asset(s) failed, first: {}", .failures.len(), first_failure(.failures))]
    InstallIncomplete {
        version: String,
        failures: Vec<AssetFailure>,
    },

    #[error("Cache '{0}' has not been installed")]
    NotInstalled(String),

    #[error("Cache storage error: {0}")]
    Storage(#[from] CacheStorageError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

fn first_failure(failures: &[AssetFailure]) -> String {
    failures
        .first()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "none".to_string())
}
