//! HTTP client for the Edamam recipe search API (served through RapidAPI).
//!
//! The client turns a free-text query plus optional diet/meal/cuisine
//! filters into a list of display-ready `Recipe`s. Requests authenticate
//! with the `X-RapidAPI-Key` and `X-RapidAPI-Host` headers.

pub mod client;
pub mod error;

pub use client::RecipeSearchClient;
pub use error::ApiError;
