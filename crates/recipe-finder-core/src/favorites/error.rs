use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("Failed to save favorites: {0}")]
    Storage(#[from] StorageError),

    #[error("Recipe {id} has non-finite calories and cannot be saved")]
    InvalidCalories { id: String },

    #[error("Failed to serialize favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}
