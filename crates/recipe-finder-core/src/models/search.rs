// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Health labels accepted by the `health` query parameter.
pub const DIET_OPTIONS: &[&str] = &[
    "vegetarian",
    "vegan",
    "gluten-free",
    "dairy-free",
    "keto-friendly",
    "paleo",
    "low-sugar",
];

/// Meal types accepted by the `mealType` query parameter.
pub const MEAL_OPTIONS: &[&str] = &["Breakfast", "Lunch", "Dinner", "Snack", "Teatime"];

/// Cuisines accepted by the `cuisineType` query parameter.
pub const CUISINE_OPTIONS: &[&str] = &[
    "American",
    "Asian",
    "British",
    "Chinese",
    "French",
    "Indian",
    "Italian",
    "Japanese",
    "Mediterranean",
    "Mexican",
    "Middle Eastern",
];

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// One search result record, wrapping the recipe payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    pub recipe: ApiRecipe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRecipe {
    #[serde(default)]
    pub uri: String,
    pub label: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(rename = "yield", default)]
    pub servings: f64,
    #[serde(rename = "totalTime", default)]
    pub total_time: f64,
    #[serde(rename = "ingredientLines", default)]
    pub ingredient_lines: Vec<String>,
}

/// Which of the optional search filters a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Diet,
    Meal,
    Cuisine,
}

impl FilterKind {
    /// Query parameter name understood by the search API.
    pub fn param(&self) -> &'static str {
        match self {
            FilterKind::Diet => "health",
            FilterKind::Meal => "mealType",
            FilterKind::Cuisine => "cuisineType",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FilterKind::Diet => "Diet",
            FilterKind::Meal => "Meal",
            FilterKind::Cuisine => "Cuisine",
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FilterKind::Diet => DIET_OPTIONS,
            FilterKind::Meal => MEAL_OPTIONS,
            FilterKind::Cuisine => CUISINE_OPTIONS,
        }
    }
}

/// Optional narrowing of a search. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub diet: Option<String>,
    pub meal: Option<String>,
    pub cuisine: Option<String>,
}

impl SearchFilters {
    pub fn get(&self, kind: FilterKind) -> Option<&str> {
        match kind {
            FilterKind::Diet => self.diet.as_deref(),
            FilterKind::Meal => self.meal.as_deref(),
            FilterKind::Cuisine => self.cuisine.as_deref(),
        }
    }

    fn slot(&mut self, kind: FilterKind) -> &mut Option<String> {
        match kind {
            FilterKind::Diet => &mut self.diet,
            FilterKind::Meal => &mut self.meal,
            FilterKind::Cuisine => &mut self.cuisine,
        }
    }

    /// Step a filter through "any" followed by each option, wrapping around.
    pub fn cycle(&mut self, kind: FilterKind, forward: bool) {
        let options = kind.options();
        let current = self
            .get(kind)
            .and_then(|value| options.iter().position(|o| *o == value));

        // Position 0 is "any", options start at 1
        let len = options.len() + 1;
        let pos = current.map(|i| i + 1).unwrap_or(0);
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };

        *self.slot(kind) = if next == 0 {
            None
        } else {
            Some(options[next - 1].to_string())
        };
    }

    /// Query pairs for the filters that are set, in API order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [FilterKind::Diet, FilterKind::Meal, FilterKind::Cuisine]
            .into_iter()
            .filter_map(|kind| {
                self.get(kind)
                    .filter(|v| !v.is_empty())
                    .map(|v| (kind.param(), v.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "count": 1,
            "hits": [{
                "recipe": {
                    "uri": "http://www.edamam.com/ontologies/edamam.owl#recipe_1",
                    "label": "Chicken Curry",
                    "image": "https://img.example/curry.jpg",
                    "url": "https://example.com/curry",
                    "yield": 4.0,
                    "calories": 2400.5,
                    "totalTime": 40.0,
                    "ingredientLines": ["1 chicken", "2 tbsp curry paste"],
                    "cuisineType": ["indian"]
                }
            }]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.hits.len(), 1);
        let recipe = &response.hits[0].recipe;
        assert_eq!(recipe.label, "Chicken Curry");
        assert_eq!(recipe.servings, 4.0);
        assert_eq!(recipe.total_time, 40.0);
        assert_eq!(recipe.ingredient_lines.len(), 2);
    }

    #[test]
    fn test_parse_response_without_hits() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.hits.is_empty());
    }

    #[test]
    fn test_filter_cycle_forward_wraps_to_any() {
        let mut filters = SearchFilters::default();
        filters.cycle(FilterKind::Meal, true);
        assert_eq!(filters.meal.as_deref(), Some("Breakfast"));

        for _ in 0..MEAL_OPTIONS.len() - 1 {
            filters.cycle(FilterKind::Meal, true);
        }
        assert_eq!(filters.meal.as_deref(), Some("Teatime"));

        filters.cycle(FilterKind::Meal, true);
        assert_eq!(filters.meal, None);
    }

    #[test]
    fn test_filter_cycle_backward_from_any() {
        let mut filters = SearchFilters::default();
        filters.cycle(FilterKind::Cuisine, false);
        assert_eq!(filters.cuisine.as_deref(), Some("Middle Eastern"));
    }

    #[test]
    fn test_query_pairs_only_set_filters() {
        let filters = SearchFilters {
            diet: Some("vegan".to_string()),
            meal: None,
            cuisine: Some("Italian".to_string()),
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("health", "vegan".to_string()),
                ("cuisineType", "Italian".to_string())
            ]
        );
        assert!(SearchFilters::default().query_pairs().is_empty());
    }
}
