use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}
