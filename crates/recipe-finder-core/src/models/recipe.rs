use serde::{Deserialize, Serialize};

use super::search::ApiRecipe;

/// Marker preceding the recipe id in an Edamam recipe uri
/// (`http://www.edamam.com/ontologies/edamam.owl#recipe_<id>`).
const RECIPE_URI_MARKER: &str = "#recipe_";

/// Display value used when the API reports no total time.
pub const COOK_TIME_UNKNOWN: &str = "N/A";

/// A display-ready recipe, exactly as persisted in the favorites collection.
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub label: String,
    pub image: String,
    pub url: String,
    #[serde(rename = "ingredientLines")]
    pub ingredient_lines: Vec<String>,
    /// Calories per serving, already normalized.
    pub calories: f64,
    #[serde(rename = "cookTime")]
    pub cook_time: String,
}

impl Recipe {
    /// Build the persisted shape from an API record.
    ///
    /// Calories are divided by the yield once here so every consumer sees
    /// per-serving values.
    pub fn from_api(api: &ApiRecipe) -> Self {
        Self {
            id: recipe_id_from_uri(&api.uri),
            label: api.label.clone(),
            image: api.image.clone(),
            url: api.url.clone(),
            ingredient_lines: api.ingredient_lines.clone(),
            calories: calories_per_serving(api.calories, api.servings),
            cook_time: format_cook_time(api.total_time),
        }
    }

    pub fn calories_display(&self) -> String {
        format!("{:.0} kcal", self.calories)
    }
}

/// Extract a stable id from the API's recipe uri.
/// Falls back to the whole uri when it has no `#recipe_` fragment.
pub fn recipe_id_from_uri(uri: &str) -> String {
    match uri.rfind(RECIPE_URI_MARKER) {
        Some(pos) => uri[pos + RECIPE_URI_MARKER.len()..].to_string(),
        None => uri.to_string(),
    }
}

/// Total calories divided by servings, rounded to a whole number.
///
/// Always finite: a yield too small to divide by keeps the total, and a
/// non-finite total reads as zero.
pub fn calories_per_serving(total: f64, servings: f64) -> f64 {
    if !total.is_finite() {
        return 0.0;
    }
    let per_serving = total / servings;
    if servings > 0.0 && per_serving.is_finite() {
        per_serving.round()
    } else {
        total.round()
    }
}

pub fn format_cook_time(total_minutes: f64) -> String {
    if total_minutes > 0.0 {
        format!("{:.0} min", total_minutes)
    } else {
        COOK_TIME_UNKNOWN.to_string()
    }
}
