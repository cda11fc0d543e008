//! Data models for recipes.
//!
//! - `Recipe`: the display-ready record persisted in favorites
//! - `SearchResponse`, `Hit`, `ApiRecipe`: payloads of the recipe search API
//! - `SearchFilters` and the filter option lists offered by the search form

pub mod recipe;
pub mod search;

pub use recipe::Recipe;
pub use search::{
    ApiRecipe, FilterKind, Hit, SearchFilters, SearchResponse, CUISINE_OPTIONS, DIET_OPTIONS,
    MEAL_OPTIONS,
};
