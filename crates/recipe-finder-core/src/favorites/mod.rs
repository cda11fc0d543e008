//! Locally persisted favorite recipes.
//!
//! The `FavoritesStore` keeps an insertion-ordered list of `Recipe`s as one
//! JSON array under the `favorites` key of a `KeyValueStore`. Every mutation
//! is a read-modify-write over that single value, and at most one entry per
//! recipe id is ever stored.
//!
//! Reads never fail: a missing, unreadable or malformed value is treated as
//! an empty collection (and logged). Writes report storage failures to the
//! caller.

pub mod error;
pub mod store;

pub use error::FavoritesError;
pub use store::{FavoritesStore, FAVORITES_KEY};
