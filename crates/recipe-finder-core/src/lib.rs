//! Core library for Recipe Finder.
//!
//! This crate holds everything that is independent of the terminal UI:
//!
//! - `models`: the persisted `Recipe` shape and the search API payloads
//! - `storage`: the `KeyValueStore` capability (file-backed or in-memory)
//! - `favorites`: the `FavoritesStore` over a key-value store
//! - `theme`: the light/dark `ThemePreference`
//! - `offline`: the versioned offline asset cache and its lifecycle
//! - `api`: the recipe search HTTP client
//! - `config`: application configuration and directory layout
//! - `utils`: display formatting helpers

pub mod api;
pub mod config;
pub mod favorites;
pub mod models;
pub mod offline;
pub mod storage;
pub mod theme;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use favorites::{FavoritesError, FavoritesStore};
pub use models::{Recipe, SearchFilters};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use theme::{Theme, ThemePreference};
